//! Feed renderers.
//!
//! Both renderers take the collected articles (already ordered newest first)
//! plus a [`FeedMeta`] describing the section, and return the complete
//! document as a string:
//!
//! - [`rss`]: RSS 2.0 with an `atom:link rel="self"`
//! - [`json`]: JSON Feed 1.0
//!
//! Neither renderer reorders or filters articles.

pub mod json;
pub mod rss;

use crate::config::{SectionDescriptor, Settings};
use crate::models::Article;
use clap::ValueEnum;
use std::error::Error;

/// Output document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FeedFormat {
    #[default]
    Rss,
    Json,
}

impl FeedFormat {
    fn label(self) -> &'static str {
        match self {
            FeedFormat::Rss => "RSS",
            FeedFormat::Json => "JSON",
        }
    }
}

/// Channel-level metadata shared by both formats.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedMeta {
    pub title: String,
    /// The section's listing page; RSS channel link and JSON `home_page_url`.
    pub home_page_url: String,
    /// Where the JSON feed itself is published, if anywhere.
    pub feed_url: Option<String>,
    pub description: String,
    pub language: String,
}

impl FeedMeta {
    pub fn for_section(section: &SectionDescriptor, settings: &Settings, format: FeedFormat) -> Self {
        Self {
            title: section.feed_title.clone(),
            home_page_url: section.listing_url.clone(),
            feed_url: section.feed_url.clone(),
            description: format!(
                "Automatyczny kanał {} z Bankier.pl (ostatnie {} godzin)",
                format.label(),
                settings.hours_back
            ),
            language: settings.language.clone(),
        }
    }
}

/// Render `articles` in the requested format.
pub fn render(format: FeedFormat, articles: &[Article], meta: &FeedMeta) -> Result<String, Box<dyn Error>> {
    match format {
        FeedFormat::Rss => rss::render(articles, meta),
        FeedFormat::Json => json::render(articles, meta),
    }
}
