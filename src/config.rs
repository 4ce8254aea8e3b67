//! Runtime settings: time window, reference timezone, fetch parameters and
//! the per-section descriptors.
//!
//! Everything has a built-in default matching the live Bankier.pl site, so
//! the program runs with no configuration at all. An optional YAML file can
//! override any field; CLI flags are applied on top of that in `main`.
//!
//! ```yaml
//! hours_back: 24
//! timezone: Europe/Warsaw
//! fetch:
//!   delay_ms: 1000
//! news:
//!   listing_url: https://www.bankier.pl/wiadomosc/
//!   site_url: https://www.bankier.pl
//!   page_count: 3
//!   parser: news
//!   feed_title: Bankier.pl – Najnowsze wiadomości
//!   feed_url: https://example.github.io/feeds/bankier-feed.json
//! ```

use crate::scrapers::SectionKind;
use chrono::TimeDelta;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_HOURS_BACK: i64 = 48;
/// Upper bound on `hours_back`: ten years.
pub const MAX_HOURS_BACK: i64 = 24 * 366 * 10;
pub const DEFAULT_PAGE_COUNT: u32 = 5;
pub const DEFAULT_TIMEZONE: &str = "Europe/Warsaw";

/// Failure to load or validate settings. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("invalid URL '{url}' for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Static description of one scraped section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionDescriptor {
    /// First listing page; page `n > 1` is this URL with `n` appended.
    pub listing_url: String,
    /// Base for resolving relative article links.
    pub site_url: String,
    pub page_count: u32,
    pub parser: SectionKind,
    pub feed_title: String,
    /// Public URL of the published JSON feed, if there is one.
    #[serde(default)]
    pub feed_url: Option<String>,
}

impl SectionDescriptor {
    /// The general news listing (`/wiadomosc/`).
    pub fn news() -> Self {
        Self {
            listing_url: "https://www.bankier.pl/wiadomosc/".to_string(),
            site_url: "https://www.bankier.pl".to_string(),
            page_count: DEFAULT_PAGE_COUNT,
            parser: SectionKind::News,
            feed_title: "Bankier.pl – Najnowsze wiadomości".to_string(),
            feed_url: None,
        }
    }

    /// The stock-market listing.
    pub fn gielda() -> Self {
        Self {
            listing_url: "https://www.bankier.pl/gielda/wiadomosci/".to_string(),
            site_url: "https://www.bankier.pl".to_string(),
            page_count: DEFAULT_PAGE_COUNT,
            parser: SectionKind::Gielda,
            feed_title: "Bankier.pl – Giełda".to_string(),
            feed_url: None,
        }
    }

    /// URL of listing page `page` (1-based).
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.listing_url.clone()
        } else {
            format!("{}{}", self.listing_url, page)
        }
    }

    pub fn site_base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.site_url).map_err(|source| ConfigError::InvalidUrl {
            field: "site_url",
            url: self.site_url.clone(),
            source,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.site_base()?;
        Url::parse(&self.listing_url).map_err(|source| ConfigError::InvalidUrl {
            field: "listing_url",
            url: self.listing_url.clone(),
            source,
        })?;
        if let Some(feed_url) = &self.feed_url {
            Url::parse(feed_url).map_err(|source| ConfigError::InvalidUrl {
                field: "feed_url",
                url: feed_url.clone(),
                source,
            })?;
        }
        if self.page_count == 0 {
            return Err(ConfigError::Invalid(format!(
                "page_count for {} must be at least 1",
                self.listing_url
            )));
        }
        Ok(())
    }
}

/// HTTP parameters for the page fetcher.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    /// Pause after every request, successful or not.
    pub delay_ms: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
    pub accept: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            delay_ms: 2500,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/137.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "pl-PL,pl;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            referer: "https://www.bankier.pl/".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Complete settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Lookback window; older articles are dropped.
    pub hours_back: i64,
    /// IANA name of the reference timezone.
    pub timezone: String,
    /// Feed language tag.
    pub language: String,
    pub fetch: FetchSettings,
    pub news: SectionDescriptor,
    pub gielda: SectionDescriptor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hours_back: DEFAULT_HOURS_BACK,
            timezone: DEFAULT_TIMEZONE.to_string(),
            language: "pl".to_string(),
            fetch: FetchSettings::default(),
            news: SectionDescriptor::news(),
            gielda: SectionDescriptor::gielda(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the built-in defaults when `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let settings = Self::from_yaml(&raw)?;
        info!(path, "Loaded configuration");
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_yaml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reference_timezone()?;
        if self.hours_back <= 0 {
            return Err(ConfigError::Invalid(format!(
                "hours_back must be positive, got {}",
                self.hours_back
            )));
        }
        if self.hours_back > MAX_HOURS_BACK {
            return Err(ConfigError::Invalid(format!(
                "hours_back must be at most {MAX_HOURS_BACK}, got {}",
                self.hours_back
            )));
        }
        self.news.validate()?;
        self.gielda.validate()
    }

    pub fn reference_timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn window(&self) -> TimeDelta {
        TimeDelta::hours(self.hours_back)
    }

    pub fn section(&self, kind: SectionKind) -> &SectionDescriptor {
        match kind {
            SectionKind::News => &self.news,
            SectionKind::Gielda => &self.gielda,
        }
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> &mut SectionDescriptor {
        match kind {
            SectionKind::News => &mut self.news,
            SectionKind::Gielda => &mut self.gielda,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.hours_back, 48);
        assert_eq!(settings.reference_timezone().unwrap(), chrono_tz::Europe::Warsaw);
        assert_eq!(settings.fetch.delay(), Duration::from_millis(2500));
        assert_eq!(settings.fetch.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_page_url() {
        let news = SectionDescriptor::news();
        assert_eq!(news.page_url(1), "https://www.bankier.pl/wiadomosc/");
        assert_eq!(news.page_url(2), "https://www.bankier.pl/wiadomosc/2");
        assert_eq!(news.page_url(5), "https://www.bankier.pl/wiadomosc/5");
    }

    #[test]
    fn test_section_lookup() {
        let settings = Settings::default();
        assert_eq!(settings.section(SectionKind::News).parser, SectionKind::News);
        assert_eq!(settings.section(SectionKind::Gielda).parser, SectionKind::Gielda);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml("hours_back: 24\nfetch:\n  delay_ms: 0\n").unwrap();
        assert_eq!(settings.hours_back, 24);
        assert_eq!(settings.fetch.delay_ms, 0);
        assert_eq!(settings.fetch.timeout_secs, 15);
        assert_eq!(settings.news, SectionDescriptor::news());
    }

    #[test]
    fn test_yaml_section_override() {
        let yaml = r#"
news:
  listing_url: https://www.bankier.pl/wiadomosc/
  site_url: https://www.bankier.pl
  page_count: 2
  parser: news
  feed_title: Test
  feed_url: https://example.github.io/bankier-feed.json
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.news.page_count, 2);
        assert_eq!(
            settings.news.feed_url.as_deref(),
            Some("https://example.github.io/bankier-feed.json")
        );
        assert_eq!(settings.gielda, SectionDescriptor::gielda());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let err = Settings::from_yaml("timezone: Mars/Olympus\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimezone(_)));
    }

    #[test]
    fn test_invalid_window_rejected() {
        assert!(Settings::from_yaml("hours_back: 0\n").is_err());
    }

    #[test]
    fn test_oversized_window_rejected() {
        let err = Settings::from_yaml("hours_back: 3000000000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("at most")));

        let mut settings = Settings::default();
        settings.hours_back = MAX_HOURS_BACK;
        assert!(settings.validate().is_ok());
        let now = chrono::Utc::now().with_timezone(&chrono_tz::Europe::Warsaw);
        assert!(crate::collector::cutoff(now, settings.window()) < now);
    }

    #[test]
    fn test_invalid_feed_url_rejected() {
        let mut settings = Settings::default();
        settings.gielda.feed_url = Some("not a url".to_string());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidUrl { field: "feed_url", .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load(Some("/nonexistent/bankier_feed.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
