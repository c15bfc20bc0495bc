//! Cache-aware rendered-page fetcher.
//!
//! Downloads each post's rendered page at most once. Presence of the cache
//! file is the only durability signal: a re-run skips everything already on
//! disk, so an interrupted pass resumes where it left off without touching
//! the network for cached pages.

mod cache;
mod throttle;

pub use cache::page_path;
pub use throttle::RequestThrottle;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::export::Post;

/// Per-request network timeout, bounding the worst-case stall per post.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response status: {0}")]
    BadStatus(StatusCode),
    #[error("content-type is not an HTML payload: {0:?}")]
    NotHtml(Option<String>),
    #[error("response body is empty")]
    EmptyBody,
    #[error("failed to store page: {0:#}")]
    CacheWrite(anyhow::Error),
}

impl FetchError {
    /// Cache-write failures are faults of the local environment rather than
    /// of the remote site, and are tallied apart from ordinary skips.
    #[must_use]
    pub fn is_local_fault(&self) -> bool {
        matches!(self, Self::CacheWrite(_))
    }
}

/// Outcome of one post's fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was downloaded and cached during this call.
    Fetched,
    /// The cache file already existed; no request was made.
    AlreadyCached,
}

/// Tallies from one fetch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: usize,
    pub already_cached: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Downloads rendered pages into the on-disk cache.
pub struct PageFetcher {
    client: reqwest::Client,
    throttle: RequestThrottle,
    cache_dir: PathBuf,
}

impl PageFetcher {
    /// Build a fetcher from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            throttle: RequestThrottle::new(config.politeness_delay),
            cache_dir: config.cache_dir.clone(),
        })
    }

    /// Ensure every post in the sequence has a cached rendered page.
    ///
    /// Per-post failures are logged and counted, never propagated; a single
    /// unreachable page must not abort the pass.
    pub async fn fetch_all(&self, posts: &[Post]) -> FetchSummary {
        let mut summary = FetchSummary::default();
        for (index, post) in posts.iter().enumerate() {
            match self.fetch_post(index, post).await {
                Ok(FetchOutcome::Fetched) => summary.fetched += 1,
                Ok(FetchOutcome::AlreadyCached) => summary.already_cached += 1,
                Err(e) if e.is_local_fault() => {
                    error!(url = %post.url, "Failed to store page: {e}");
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!(url = %post.url, "Skipping page: {e}");
                    summary.skipped += 1;
                }
            }
        }
        info!(
            fetched = summary.fetched,
            cached = summary.already_cached,
            skipped = summary.skipped,
            failed = summary.failed,
            "Fetch pass complete"
        );
        summary
    }

    /// Fetch one post's rendered page unless it is already cached.
    ///
    /// # Errors
    ///
    /// Transport errors, timeouts, and content-validation failures mean the
    /// page stays absent from the cache; cache-write failures are local
    /// faults. Neither aborts the surrounding pass.
    pub async fn fetch_post(&self, index: usize, post: &Post) -> Result<FetchOutcome, FetchError> {
        let path = cache::page_path(&self.cache_dir, &post.author, index, &post.title);
        if path.exists() {
            debug!(path = %path.display(), "Already cached");
            return Ok(FetchOutcome::AlreadyCached);
        }

        self.throttle.acquire().await;
        debug!(url = %post.url, "Fetching");

        let response = self.client.get(&post.url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::BadStatus(response.status()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        match content_type.as_deref() {
            Some(ct) if ct.to_ascii_lowercase().contains("html") => {}
            _ => return Err(FetchError::NotHtml(content_type)),
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        cache::write_page(&path, &body)
            .await
            .map_err(FetchError::CacheWrite)?;
        info!(path = %path.display(), "Cached new page");
        Ok(FetchOutcome::Fetched)
    }
}
