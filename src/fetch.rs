//! Page fetching with a fixed pause after every request.
//!
//! # Architecture
//!
//! - [`FetchPage`]: core trait, one URL in, markup or [`FetchError`] out
//! - [`HttpFetcher`]: `reqwest` client with the fixed browser-like headers
//! - [`Throttled`]: decorator that owns a [`RateLimiter`] and waits after
//!   every attempt of the wrapped fetcher, whatever the outcome
//!
//! Requests are never retried. A failure is reported to the caller, which
//! treats it as an empty page.

use crate::config::FetchSettings;
use crate::utils::truncate_for_log;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Why a page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, connection failure, or an unreadable body.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Trait for retrieving the markup of one page.
pub trait FetchPage {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// A fixed pause between requests.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    delay: Duration,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A limiter that never waits.
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Block the current task for the configured delay.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            debug!(delay = ?self.delay, "Pausing before next request");
            sleep(self.delay).await;
        }
    }
}

/// Wrapper that waits for the rate limiter after every fetch of `inner`.
///
/// The pause happens after successes and failures alike, so the request rate
/// toward the site is bounded no matter how the previous request ended.
pub struct Throttled<T> {
    inner: T,
    limiter: RateLimiter,
}

impl<T> Throttled<T>
where
    T: FetchPage,
{
    pub fn new(inner: T, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl<T> fmt::Debug for Throttled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl<T> FetchPage for Throttled<T>
where
    T: FetchPage,
{
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let result = self.inner.fetch(url).await;
        self.limiter.pause().await;
        result
    }
}

/// HTTP fetcher with fixed headers and timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the client from the fetch settings.
    ///
    /// Fails only if a header value is not valid ASCII or the TLS backend
    /// cannot be initialized.
    pub fn new(settings: &FetchSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&settings.accept_language)?);
        headers.insert(REFERER, HeaderValue::from_str(&settings.referer)?);
        headers.insert(ACCEPT, HeaderValue::from_str(&settings.accept)?);
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { client })
    }

    /// Convenience: an [`HttpFetcher`] wrapped in [`Throttled`] with the
    /// configured delay.
    pub fn throttled(settings: &FetchSettings) -> Result<Throttled<Self>, Box<dyn std::error::Error>> {
        Ok(Throttled::new(Self::new(settings)?, RateLimiter::new(settings.delay())))
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        info!("Fetching page");

        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "Non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = response.text().await.map_err(transport)?;

        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            preview = %truncate_for_log(&body, 200),
            "Fetched page"
        );
        Ok(body)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory fetcher for collector tests.

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned markup by URL; any other URL is a 404.
    #[derive(Debug, Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, String>,
        pub requested: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn with_page(mut self, url: &str, markup: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), markup.into());
            self
        }
    }

    impl FetchPage for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            })
        }
    }
}
