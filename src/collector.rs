//! Collection of one section: fetch every listing page, parse, deduplicate,
//! filter by the time window, and order newest first.
//!
//! Pages are processed strictly one after another. A page that cannot be
//! fetched contributes nothing and the run moves on; collection as a whole
//! never fails.

use crate::config::SectionDescriptor;
use crate::fetch::FetchPage;
use crate::models::Article;
use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};

/// Earliest publication time still inside the window ending at `now`.
pub fn cutoff(now: DateTime<Tz>, window: TimeDelta) -> DateTime<Tz> {
    now - window
}

/// Outcome of offering one candidate to an [`Accumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Its link was already accepted earlier in the run.
    Duplicate,
    /// Published before the cutoff.
    Stale,
}

/// Accepted articles of one run, in discovery order.
///
/// A link is remembered only once its article is accepted, so a stale copy
/// seen first does not shadow a fresh copy of the same link later on.
#[derive(Debug)]
pub struct Accumulator {
    cutoff: DateTime<Tz>,
    seen: HashSet<String>,
    accepted: Vec<Article>,
    duplicates: usize,
    stale: usize,
}

impl Accumulator {
    pub fn new(cutoff: DateTime<Tz>) -> Self {
        Self {
            cutoff,
            seen: HashSet::new(),
            accepted: Vec::new(),
            duplicates: 0,
            stale: 0,
        }
    }

    pub fn offer(&mut self, article: Article) -> Admission {
        if self.seen.contains(article.link()) {
            self.duplicates += 1;
            return Admission::Duplicate;
        }
        if article.published_at() < self.cutoff {
            self.stale += 1;
            return Admission::Stale;
        }
        self.seen.insert(article.link().to_string());
        self.accepted.push(article);
        Admission::Accepted
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    /// Accepted articles, newest first; equal timestamps keep discovery order.
    pub fn into_sorted(self) -> Vec<Article> {
        let mut articles = self.accepted;
        articles.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
        articles
    }
}

/// Collect recent articles of one section.
///
/// `now` fixes the end of the window; the cutoff is `now - window`.
#[instrument(level = "info", skip_all, fields(section = %section.parser))]
pub async fn collect<F: FetchPage>(
    fetcher: &F,
    section: &SectionDescriptor,
    window: TimeDelta,
    now: DateTime<Tz>,
) -> Vec<Article> {
    let tz = now.timezone();
    let cutoff = cutoff(now, window);
    info!(%cutoff, pages = section.page_count, "Collecting articles");

    let base = match section.site_base() {
        Ok(base) => base,
        Err(e) => {
            error!(error = %e, "Cannot resolve article links; nothing collected");
            return Vec::new();
        }
    };

    let mut acc = Accumulator::new(cutoff);
    let mut failed_pages = 0usize;

    for page in 1..=section.page_count {
        let url = section.page_url(page);
        let markup = match fetcher.fetch(&url).await {
            Ok(markup) => markup,
            Err(e) => {
                failed_pages += 1;
                warn!(page, %url, error = %e, "Page fetch failed; skipping");
                continue;
            }
        };

        let candidates = section.parser.parse_page(&markup, &base, tz);
        let found = candidates.len();
        let before = acc.len();
        for article in candidates {
            acc.offer(article);
        }
        info!(page, found, accepted = acc.len() - before, "Processed listing page");
    }

    info!(
        accepted = acc.len(),
        duplicates = acc.duplicates,
        stale = acc.stale,
        failed_pages,
        "Collection finished"
    );
    acc.into_sorted()
}
