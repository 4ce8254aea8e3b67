//! Parser for the stock-market listing.
//!
//! This layout has no per-article container. Entries are plain links whose
//! visible text starts with the publication time:
//!
//! ```html
//! <a href="/wiadomosc/Spolka-X-wyniki-123.html">2025-06-01 09:30 Spółka X ogłasza wyniki</a>
//! ```
//!
//! Every other link on the page (navigation, footers, quotes) fails the
//! pattern and is ignored without comment. There is no teaser.

use crate::html::{Node, Query};
use crate::models::Article;
use crate::utils::localize;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use url::Url;

const LINK: Query = Query::tag("a");

static STAMPED_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2})\s+(\S.*)$").expect("static regex is valid")
});

/// Parse every link on the page whose text has a leading `YYYY-MM-DD HH:MM`.
pub fn parse_listing<'a, N: Node<'a>>(root: N, base: &Url, tz: Tz) -> Vec<Article> {
    let articles: Vec<Article> = root
        .find_all(&LINK)
        .into_iter()
        .filter_map(|anchor| parse_link(anchor, base, tz))
        .collect();

    info!(count = articles.len(), "Parsed gielda listing page");
    articles
}

/// Turn one link into an article, or `None` if it is not an article link.
pub fn parse_link<'a, N: Node<'a>>(anchor: N, base: &Url, tz: Tz) -> Option<Article> {
    let text = anchor.text_joined();
    let (published_at, title) = split_stamped_title(&text, tz)?;
    let Some(link) = anchor.resolve_href(base) else {
        debug!(%text, "Stamped link has no usable href");
        return None;
    };
    Article::new(title, link.as_str(), published_at, "")
}

/// Split `"2025-06-01 09:30 Title"` into a localized timestamp and the title.
pub fn split_stamped_title(text: &str, tz: Tz) -> Option<(chrono::DateTime<Tz>, &str)> {
    let caps = STAMPED_TITLE.captures(text)?;
    let stamp = caps.get(1)?.as_str();
    let title = caps.get(2)?.as_str();
    match NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M") {
        Ok(naive) => Some((localize(naive, tz), title)),
        Err(e) => {
            debug!(stamp, error = %e, "Stamp matched pattern but is not a valid date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::HtmlPage;
    use chrono::TimeZone;
    use chrono_tz::Europe::Warsaw;

    fn base() -> Url {
        Url::parse("https://www.bankier.pl").unwrap()
    }

    fn parse(markup: &str) -> Vec<Article> {
        let doc = HtmlPage::parse(markup);
        parse_listing(doc.root(), &base(), Warsaw)
    }

    #[test]
    fn test_stamped_link_becomes_article() {
        let articles =
            parse(r#"<html><body><a href="/artykul/123">2025-06-01 09:30 Spółka X ogłasza wyniki</a></body></html>"#);

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.title(), "Spółka X ogłasza wyniki");
        assert_eq!(article.link(), "https://www.bankier.pl/artykul/123");
        assert_eq!(
            article.published_at(),
            Warsaw.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(article.published_at().to_rfc3339(), "2025-06-01T09:30:00+02:00");
        assert_eq!(article.teaser(), "");
    }

    #[test]
    fn test_navigation_links_ignored() {
        let articles = parse(
            r#"<nav><a href="/">Strona główna</a><a href="/gielda">Giełda</a></nav>
               <a href="/notowania">WIG20 2025-06-01 09:30</a>
               <a href="/a/1">2025-06-01 09:30 Pierwszy</a>
               <a href="/a/2">2025-06-01 08:15 Drugi</a>"#,
        );
        let titles: Vec<&str> = articles.iter().map(|a| a.title()).collect();
        assert_eq!(titles, vec!["Pierwszy", "Drugi"]);
    }

    #[test]
    fn test_text_spread_over_markup_is_collapsed() {
        let articles = parse(
            r#"<a href="/a/3">
                 <span class="date">2025-06-01 10:05</span>
                 <span class="title">Kurs   <b>WIG20</b> w górę</span>
               </a>"#,
        );
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title(), "Kurs WIG20 w górę");
    }

    #[test]
    fn test_invalid_calendar_date_skipped() {
        assert!(parse(r#"<a href="/a/4">2025-02-30 10:00 Nie istnieje</a>"#).is_empty());
    }

    #[test]
    fn test_link_without_href_skipped() {
        assert!(parse(r#"<a>2025-06-01 09:30 Bez linku</a>"#).is_empty());
    }

    #[test]
    fn test_split_stamped_title() {
        let (stamp, title) = split_stamped_title("2025-01-10 23:59 Koniec sesji", Warsaw).unwrap();
        assert_eq!(title, "Koniec sesji");
        assert_eq!(stamp.to_rfc3339(), "2025-01-10T23:59:00+01:00");
        assert!(split_stamped_title("2025-01-10 23:59", Warsaw).is_none());
        assert!(split_stamped_title("2025-01-10 23:59:00 Z sekundami", Warsaw).is_none());
    }
}
