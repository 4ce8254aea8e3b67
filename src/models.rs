//! Data model for scraped listing entries.
//!
//! An [`Article`] is the uniform record both section parsers produce, whatever
//! the page layout looked like. Its fields are private: once the parser has
//! normalized the title and attached a timezone to the timestamp, nothing
//! downstream may change them.

use chrono::DateTime;
use chrono_tz::Tz;

/// One article summary from a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    title: String,
    link: String,
    published_at: DateTime<Tz>,
    teaser: String,
}

impl Article {
    /// Build an article from already-normalized parts.
    ///
    /// Returns `None` when the title or link is blank; such entries cannot be
    /// published and are dropped by the caller.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Tz>,
        teaser: impl Into<String>,
    ) -> Option<Self> {
        let title = title.into();
        let link = link.into();
        if title.trim().is_empty() || link.trim().is_empty() {
            return None;
        }
        Some(Self {
            title,
            link,
            published_at,
            teaser: teaser.into(),
        })
    }

    /// Whitespace-collapsed headline.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Absolute URL; identity key for deduplication.
    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn published_at(&self) -> DateTime<Tz> {
        self.published_at
    }

    /// Plain-text excerpt, possibly empty.
    pub fn teaser(&self) -> &str {
        &self.teaser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Warsaw;

    fn ts() -> DateTime<Tz> {
        Warsaw.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_article_creation() {
        let article = Article::new("Tytuł", "https://www.bankier.pl/a/1", ts(), "").unwrap();
        assert_eq!(article.title(), "Tytuł");
        assert_eq!(article.link(), "https://www.bankier.pl/a/1");
        assert_eq!(article.published_at(), ts());
        assert!(article.teaser().is_empty());
    }

    #[test]
    fn test_article_rejects_blank_title() {
        assert!(Article::new("   ", "https://www.bankier.pl/a/1", ts(), "x").is_none());
    }

    #[test]
    fn test_article_rejects_blank_link() {
        assert!(Article::new("Tytuł", "", ts(), "x").is_none());
    }
}
