//! Parser for the general news listing (`https://www.bankier.pl/wiadomosc/`).
//!
//! # Layout
//!
//! ```html
//! <section id="articleList">
//!   <div class="article">
//!     <div class="entry-content">
//!       <span class="entry-title"><a href="/wiadomosc/...">Title</a></span>
//!       <div class="entry-meta">
//!         <time class="entry-date" datetime="2025-12-29T20:15:00+01:00">...</time>
//!         <time class="entry-date" datetime="2025-12-29T21:09:00+01:00">...</time>
//!       </div>
//!       <p>Teaser text <a class="more-link" href="...">Czytaj dalej</a></p>
//!     </div>
//!   </div>
//! </section>
//! ```
//!
//! An updated article lists both its original and its update timestamp; the
//! last `time.entry-date` in the meta block is taken as the publication time.

use crate::html::{Node, Query};
use crate::models::Article;
use crate::utils::parse_timestamp;
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

const LISTING: Query = Query::tag("section").id("articleList");
const ENTRY: Query = Query::tag("div").class("article");
const CONTENT: Query = Query::tag("div").class("entry-content");
const TITLE: Query = Query::tag("span").class("entry-title");
const LINK: Query = Query::tag("a");
const META: Query = Query::tag("div").class("entry-meta");
const DATE: Query = Query::tag("time").class("entry-date");
const TEASER: Query = Query::tag("p");
const READ_MORE: Query = Query::tag("a").class("more-link");

/// Why a single entry was skipped.
#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("entry has no div.entry-content")]
    MissingContent,
    #[error("entry has no title link")]
    MissingTitle,
    #[error("title link has no usable href")]
    MissingLink,
    #[error("entry has no time.entry-date")]
    MissingTimestamp,
    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
}

/// Parse every `div.article` directly under `section#articleList`.
///
/// Returns an empty list when the container is missing.
pub fn parse_listing<'a, N: Node<'a>>(root: N, base: &Url, tz: Tz) -> Vec<Article> {
    let Some(listing) = root.find_first(&LISTING) else {
        warn!("No section#articleList on page");
        return Vec::new();
    };

    let mut articles = Vec::new();
    for (index, entry) in listing.find_children(&ENTRY).into_iter().enumerate() {
        match parse_entry(entry, base, tz) {
            Ok(article) => articles.push(article),
            Err(e) => warn!(index, error = %e, "Skipping malformed article entry"),
        }
    }

    info!(count = articles.len(), "Parsed news listing page");
    articles
}

/// Extract one article from a `div.article` block.
pub fn parse_entry<'a, N: Node<'a>>(entry: N, base: &Url, tz: Tz) -> Result<Article, EntryError> {
    let content = entry.find_first(&CONTENT).ok_or(EntryError::MissingContent)?;

    let anchor = content
        .find_first(&TITLE)
        .and_then(|title| title.find_first(&LINK))
        .ok_or(EntryError::MissingTitle)?;
    let link = anchor.resolve_href(base).ok_or(EntryError::MissingLink)?;
    let title = anchor.text_joined();
    if title.is_empty() {
        return Err(EntryError::MissingTitle);
    }

    let stamp = content
        .find_first(&META)
        .and_then(|meta| meta.find_all(&DATE).pop())
        .ok_or(EntryError::MissingTimestamp)?;
    let raw = stamp
        .attribute("datetime")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| stamp.text_content());
    if raw.is_empty() {
        return Err(EntryError::MissingTimestamp);
    }
    let published_at = parse_timestamp(&raw, tz).ok_or_else(|| EntryError::BadTimestamp(raw.clone()))?;

    let teaser = content
        .find_first(&TEASER)
        .map(|p| p.text_excluding(&READ_MORE))
        .unwrap_or_default();

    debug!(%link, %published_at, "Parsed news entry");
    Article::new(title, link.as_str(), published_at, teaser).ok_or(EntryError::MissingTitle)
}
