//! Unsplash image provider
//!
//! Fetches random photos from the Unsplash API and tracks the advisory
//! rate-limit counter reported by the API.

mod client;
mod http_utils;
mod types;

pub use client::UnsplashClient;
pub use types::{Author, ImageRecord, ImageUrls};

use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

use crate::config::PROVIDER_MAX_IMAGES;

/// Errors that can occur while fetching images
#[derive(Debug, Error)]
pub enum UnsplashError {
    /// The hourly request quota is exhausted
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from the server
        message: String,
    },
    /// Error during network communication
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success status returned by the API
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Cleaned response body
        message: String,
    },
    /// Body is not a JSON array of photos
    #[error("JSON error: {0}")]
    Json(String),
}

impl UnsplashError {
    /// True for failures of the transport itself (network, status, body parsing)
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::RateLimitExceeded { .. })
    }
}

/// Remaining-requests counter reported by the API.
///
/// Concurrent fetches overwrite it without coordination; the last writer wins.
#[derive(Debug)]
pub struct RateLimitState {
    requests_remaining: AtomicI64,
}

impl RateLimitState {
    /// Create a counter starting at the configured request limit
    #[must_use]
    pub const fn new(initial: i64) -> Self {
        Self {
            requests_remaining: AtomicI64::new(initial),
        }
    }

    /// Last observed number of remaining requests
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.requests_remaining.load(Ordering::Relaxed)
    }

    /// Store a freshly observed value
    pub fn record(&self, remaining: i64) {
        self.requests_remaining.store(remaining, Ordering::Relaxed);
    }

    /// Whether the last observed value says the quota is used up
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() <= 0
    }
}

/// Clamp a requested image count to what the random endpoint accepts.
///
/// # Examples
///
/// ```
/// use unsplash_relay_bot::unsplash::clamp_provider_count;
/// assert_eq!(clamp_provider_count(0), 1);
/// assert_eq!(clamp_provider_count(12), 12);
/// assert_eq!(clamp_provider_count(100), 30);
/// ```
#[must_use]
pub fn clamp_provider_count(count: usize) -> usize {
    count.clamp(1, PROVIDER_MAX_IMAGES)
}

/// Source of random images
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Fetch up to `count` random images (clamped to the provider maximum).
    ///
    /// The API may return fewer records than requested.
    async fn fetch_random(&self, count: usize) -> Result<Vec<ImageRecord>, UnsplashError>;
}
