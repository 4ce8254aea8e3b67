//! Listing-page parsers, one per section layout.
//!
//! Bankier.pl renders its sections with two unrelated layouts, so each gets
//! its own parser. Both produce the same [`Article`] records.
//!
//! | Section | Module | Layout |
//! |---------|--------|--------|
//! | Wiadomości | [`news`] | `section#articleList` with one `div.article` block per entry |
//! | Giełda | [`gielda`] | bare links whose text starts with `YYYY-MM-DD HH:MM` |
//!
//! Parsers are written against [`crate::html::Node`] only; [`SectionKind::parse_page`]
//! is the one place that picks the HTML backend and dispatches on the layout.
//!
//! Neither parser fails as a whole. A page without the expected structure
//! yields an empty list, and a single malformed entry is skipped.

pub mod gielda;
pub mod news;

use crate::html::HtmlPage;
use crate::models::Article;
use chrono_tz::Tz;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Which listing layout a section uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// General news, `/wiadomosc/`.
    News,
    /// Stock-market news.
    Gielda,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::News => "news",
            SectionKind::Gielda => "gielda",
        }
    }

    /// Parse one listing page into candidate articles in document order.
    ///
    /// Relative links are resolved against `base`; timestamps end up in `tz`.
    pub fn parse_page(self, markup: &str, base: &Url, tz: Tz) -> Vec<Article> {
        let page = HtmlPage::parse(markup);
        let root = page.root();
        match self {
            SectionKind::News => news::parse_listing(root, base, tz),
            SectionKind::Gielda => gielda::parse_listing(root, base, tz),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
