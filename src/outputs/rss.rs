//! RSS 2.0 rendering.
//!
//! # Output Structure
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
//!   <channel>
//!     <title/> <link/> <description/> <atom:link rel="self"/>
//!     <docs/> <generator/> <language/> [<lastBuildDate/>]
//!     <item> <title/> <link/> [<description/>] <guid isPermaLink="true"/> <pubDate/> </item>
//!     ...
//!   </channel>
//! </rss>
//! ```
//!
//! `lastBuildDate` is the newest article's publication time and is left out
//! of an empty feed. Dates use RFC 2822 with the article's UTC offset.

use super::FeedMeta;
use crate::models::Article;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::error::Error;
use std::io::Write;
use tracing::{info, instrument};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const RSS_DOCS: &str = "https://www.rssboard.org/rss-specification";

/// Render the articles as an indented RSS 2.0 document.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub fn render(articles: &[Article], meta: &FeedMeta) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &meta.title)?;
    write_text_element(&mut writer, "link", &meta.home_page_url)?;
    write_text_element(&mut writer, "description", &meta.description)?;

    let mut self_link = BytesStart::new("atom:link");
    self_link.push_attribute(("href", meta.home_page_url.as_str()));
    self_link.push_attribute(("rel", "self"));
    self_link.push_attribute(("type", "application/rss+xml"));
    writer.write_event(Event::Empty(self_link))?;

    write_text_element(&mut writer, "docs", RSS_DOCS)?;
    write_text_element(
        &mut writer,
        "generator",
        concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
    )?;
    write_text_element(&mut writer, "language", &meta.language)?;

    if let Some(newest) = articles.iter().map(Article::published_at).max() {
        write_text_element(&mut writer, "lastBuildDate", &newest.to_rfc2822())?;
    }

    for article in articles {
        write_item(&mut writer, article)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut out = String::from_utf8(writer.into_inner())?;
    out.push('\n');
    info!(bytes = out.len(), "Rendered RSS feed");
    Ok(out)
}

fn write_item<W: Write>(writer: &mut Writer<W>, article: &Article) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(writer, "title", article.title())?;
    write_text_element(writer, "link", article.link())?;
    if !article.teaser().is_empty() {
        write_text_element(writer, "description", article.teaser())?;
    }

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "true"));
    writer.write_event(Event::Start(guid))?;
    writer.write_event(Event::Text(BytesText::new(article.link())))?;
    writer.write_event(Event::End(BytesEnd::new("guid")))?;

    write_text_element(writer, "pubDate", &article.published_at().to_rfc2822())?;
    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Warsaw;
    use quick_xml::Reader;

    fn meta() -> FeedMeta {
        FeedMeta {
            title: "Bankier.pl – Najnowsze wiadomości".to_string(),
            home_page_url: "https://www.bankier.pl/wiadomosc/".to_string(),
            feed_url: None,
            description: "Automatyczny kanał RSS z Bankier.pl (ostatnie 48 godzin)".to_string(),
            language: "pl".to_string(),
        }
    }

    fn articles() -> Vec<Article> {
        vec![
            Article::new(
                "Stopy procentowe bez zmian",
                "https://www.bankier.pl/wiadomosc/stopy-1.html",
                Warsaw.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap(),
                "RPP & rynek: <bez niespodzianek>",
            )
            .unwrap(),
            Article::new(
                "Spółka X ogłasza wyniki",
                "https://www.bankier.pl/artykul/123",
                Warsaw.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
                "",
            )
            .unwrap(),
        ]
    }

    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML at {}: {e}", reader.buffer_position()),
            }
        }
    }

    #[test]
    fn test_round_trip_recovers_link_title_and_date() {
        let articles = articles();
        let xml = render(&articles, &meta()).unwrap();
        assert_well_formed(&xml);

        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        assert_eq!(feed.entries.len(), 2);
        for (entry, article) in feed.entries.iter().zip(&articles) {
            assert_eq!(entry.id, article.link());
            assert_eq!(entry.links[0].href, article.link());
            assert_eq!(entry.title.as_ref().unwrap().content, article.title());
            assert_eq!(entry.published, Some(article.published_at().with_timezone(&Utc)));
        }
    }

    #[test]
    fn test_channel_elements() {
        let xml = render(&articles(), &meta()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">"));
        assert!(xml.contains("<title>Bankier.pl – Najnowsze wiadomości</title>"));
        assert!(xml.contains("<link>https://www.bankier.pl/wiadomosc/</link>"));
        assert!(xml.contains(
            "<atom:link href=\"https://www.bankier.pl/wiadomosc/\" rel=\"self\" type=\"application/rss+xml\"/>"
        ));
        assert!(xml.contains("<language>pl</language>"));
        // newest article, not the first in the slice
        assert!(xml.contains("<lastBuildDate>Sun, 1 Jun 2025 09:30:00 +0200</lastBuildDate>"));
    }

    #[test]
    fn test_item_fields() {
        let xml = render(&articles(), &meta()).unwrap();
        assert!(xml.contains(
            "<guid isPermaLink=\"true\">https://www.bankier.pl/wiadomosc/stopy-1.html</guid>"
        ));
        assert!(xml.contains("<pubDate>Fri, 10 Jan 2025 10:00:00 +0100</pubDate>"));
        assert!(xml.contains("<description>RPP &amp; rynek: &lt;bez niespodzianek&gt;</description>"));
        // the second article has no teaser
        assert_eq!(xml.matches("<description>").count(), 2);
    }

    #[test]
    fn test_empty_feed_is_valid_without_last_build_date() {
        let xml = render(&[], &meta()).unwrap();
        assert_well_formed(&xml);
        assert!(!xml.contains("lastBuildDate"));
        assert!(!xml.contains("<item>"));

        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        assert!(feed.entries.is_empty());
        assert_eq!(feed.title.unwrap().content, "Bankier.pl – Najnowsze wiadomości");
    }

    #[test]
    fn test_output_is_indented() {
        let xml = render(&articles(), &meta()).unwrap();
        assert!(xml.contains("\n  <channel>"));
        assert!(xml.contains("\n    <item>"));
        assert!(xml.ends_with("</rss>\n"));
    }
}
