//! # Bankier Feed
//!
//! Builds an RSS 2.0 or JSON Feed document from the latest Bankier.pl
//! listings, for sources that do not publish a usable feed of their own.
//!
//! ## Usage
//!
//! ```sh
//! bankier_feed rss  news   > docs/bankier-rss.xml
//! bankier_feed json gielda > docs/gielda-feed.json
//! ```
//!
//! ## Architecture
//!
//! One sequential pipeline per invocation:
//! 1. **Fetching**: download listing pages 1..N of the section, pausing after each request
//! 2. **Parsing**: turn each page into articles with the section's layout parser
//! 3. **Collecting**: drop duplicate links and articles older than the window, newest first
//! 4. **Output**: render RSS or JSON Feed to stdout
//!
//! Logs go to stderr so stdout carries nothing but the feed.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::io::Write;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collector;
mod config;
mod fetch;
mod html;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::{ConfigError, Settings};
use fetch::HttpFetcher;
use outputs::FeedMeta;

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    // Invalid positional values exit here, before anything is fetched
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = settings_from_cli(&args)?;
    let tz = settings.reference_timezone()?;
    let section = settings.section(args.section);
    info!(
        section = %args.section,
        format = ?args.format,
        pages = section.page_count,
        hours_back = settings.hours_back,
        "bankier_feed starting up"
    );

    let fetcher = HttpFetcher::throttled(&settings.fetch)?;
    debug!(delay = ?fetcher.limiter().delay(), "HTTP client ready");
    let now = Utc::now().with_timezone(&tz);
    let articles = collector::collect(&fetcher, section, settings.window(), now).await;

    let meta = FeedMeta::for_section(section, &settings, args.format);
    let document = outputs::render(args.format, &articles, &meta)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(document.as_bytes())?;
    stdout.flush()?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = articles.len(),
        "Execution complete"
    );
    Ok(())
}

/// Load the settings file (if any) and apply CLI overrides on top.
fn settings_from_cli(args: &Cli) -> Result<Settings, ConfigError> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(hours_back) = args.hours_back {
        settings.hours_back = hours_back;
    }
    let section = settings.section_mut(args.section);
    if let Some(pages) = args.pages {
        section.page_count = pages;
    }
    if let Some(feed_url) = &args.feed_url {
        section.feed_url = Some(feed_url.clone());
    }
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapers::SectionKind;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["bankier_feed"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_overrides_apply_to_selected_section_only() {
        let settings = settings_from_cli(&cli(&[
            "json",
            "gielda",
            "--pages",
            "2",
            "--hours-back",
            "6",
            "--feed-url",
            "https://example.github.io/gielda.json",
        ]))
        .unwrap();

        assert_eq!(settings.hours_back, 6);
        let gielda = settings.section(SectionKind::Gielda);
        assert_eq!(gielda.page_count, 2);
        assert_eq!(gielda.feed_url.as_deref(), Some("https://example.github.io/gielda.json"));
        assert_eq!(settings.section(SectionKind::News).page_count, 5);
    }

    #[test]
    fn test_invalid_override_is_fatal() {
        assert!(settings_from_cli(&cli(&["rss", "news", "--pages", "0"])).is_err());
        assert!(settings_from_cli(&cli(&["rss", "news", "--hours-back=-1"])).is_err());
        assert!(settings_from_cli(&cli(&["rss", "news", "--hours-back", "3000000000"])).is_err());
        assert!(settings_from_cli(&cli(&["json", "news", "--feed-url", "::nope"])).is_err());
    }
}
