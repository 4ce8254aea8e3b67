//! Command-line interface definitions.
//!
//! Two positional arguments choose what to produce; the options override the
//! settings loaded from the optional YAML file.

use crate::outputs::FeedFormat;
use crate::scrapers::SectionKind;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # RSS for the news section (both defaults)
/// bankier_feed > docs/bankier-rss.xml
///
/// # JSON Feed for the stock-market section
/// bankier_feed json gielda --feed-url https://example.github.io/gielda-feed.json
///
/// # Shorter window, settings from a file
/// bankier_feed rss news --config bankier.yaml --hours-back 12
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output format
    #[arg(value_enum, ignore_case = true, default_value_t = FeedFormat::Rss)]
    pub format: FeedFormat,

    /// Section to scrape
    #[arg(value_enum, ignore_case = true, default_value_t = SectionKind::News)]
    pub section: SectionKind,

    /// Optional path to a YAML settings file
    #[arg(short, long, env = "BANKIER_FEED_CONFIG")]
    pub config: Option<String>,

    /// Only keep articles published within this many hours
    #[arg(long)]
    pub hours_back: Option<i64>,

    /// Number of listing pages to scan
    #[arg(long)]
    pub pages: Option<u32>,

    /// Public URL of the published JSON feed (emitted as `feed_url`)
    #[arg(long, env = "FEED_JSON_URL")]
    pub feed_url: Option<String>,
}
