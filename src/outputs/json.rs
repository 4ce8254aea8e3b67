//! JSON Feed 1.0 rendering.
//!
//! # Output Structure
//!
//! ```json
//! {
//!   "version": "https://jsonfeed.org/version/1",
//!   "title": "Bankier.pl – Najnowsze wiadomości",
//!   "home_page_url": "https://www.bankier.pl/wiadomosc/",
//!   "feed_url": "https://example.github.io/bankier-feed.json",
//!   "description": "Automatyczny kanał JSON z Bankier.pl (ostatnie 48 godzin)",
//!   "items": [
//!     {
//!       "id": "https://www.bankier.pl/wiadomosc/...",
//!       "url": "https://www.bankier.pl/wiadomosc/...",
//!       "title": "...",
//!       "content_html": "...",
//!       "date_published": "2025-12-29T21:09:00+01:00"
//!     }
//!   ]
//! }
//! ```
//!
//! `feed_url` is present only when configured. Polish characters are written
//! as-is rather than `\u` escapes.

use super::FeedMeta;
use crate::models::Article;
use serde::Serialize;
use std::error::Error;
use tracing::{info, instrument};

pub const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1";

/// Top-level JSON Feed document.
#[derive(Debug, Serialize)]
pub struct JsonFeed<'a> {
    pub version: &'static str,
    pub title: &'a str,
    pub home_page_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<&'a str>,
    pub description: &'a str,
    pub items: Vec<JsonFeedItem<'a>>,
}

/// One entry of [`JsonFeed::items`].
#[derive(Debug, Serialize)]
pub struct JsonFeedItem<'a> {
    pub id: &'a str,
    pub url: &'a str,
    pub title: &'a str,
    /// The teaser exactly as scraped; empty when there is none.
    pub content_html: &'a str,
    /// RFC 3339 with the article's UTC offset.
    pub date_published: String,
}

impl<'a> From<&'a Article> for JsonFeedItem<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            id: article.link(),
            url: article.link(),
            title: article.title(),
            content_html: article.teaser(),
            date_published: article.published_at().to_rfc3339(),
        }
    }
}

/// Render the articles as a pretty-printed JSON Feed document.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub fn render(articles: &[Article], meta: &FeedMeta) -> Result<String, Box<dyn Error>> {
    let feed = JsonFeed {
        version: JSON_FEED_VERSION,
        title: &meta.title,
        home_page_url: &meta.home_page_url,
        feed_url: meta.feed_url.as_deref(),
        description: &meta.description,
        items: articles.iter().map(JsonFeedItem::from).collect(),
    };

    let mut out = serde_json::to_string_pretty(&feed)?;
    out.push('\n');
    info!(bytes = out.len(), "Rendered JSON feed");
    Ok(out)
}
