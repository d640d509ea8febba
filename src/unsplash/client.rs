use super::http_utils::{classify_failure, create_http_client, parse_remaining_header};
use super::types::PhotoWire;
use super::{clamp_provider_count, ImageProvider, ImageRecord, RateLimitState, UnsplashError};
use crate::config::ProviderConfig;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Unsplash REST client for the random-photo endpoint
pub struct UnsplashClient {
    http: HttpClient,
    config: Arc<ProviderConfig>,
    rate_limit: Arc<RateLimitState>,
}

impl UnsplashClient {
    /// Create a client; the rate-limit counter starts at `request_limit`.
    #[must_use]
    pub fn new(config: Arc<ProviderConfig>) -> Self {
        let rate_limit = Arc::new(RateLimitState::new(config.request_limit));
        info!(
            "Unsplash client created (base_url: {}, request_limit: {})",
            config.base_url, config.request_limit
        );
        Self {
            http: create_http_client(),
            config,
            rate_limit,
        }
    }

    /// Shared handle to the advisory rate-limit counter
    #[must_use]
    pub fn rate_limit(&self) -> Arc<RateLimitState> {
        Arc::clone(&self.rate_limit)
    }

    fn random_photos_url(&self) -> String {
        format!("{}/photos/random/", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl ImageProvider for UnsplashClient {
    #[instrument(skip(self))]
    async fn fetch_random(&self, count: usize) -> Result<Vec<ImageRecord>, UnsplashError> {
        let count = clamp_provider_count(count);

        // Advisory only: a stale zero would otherwise block us forever
        if self.rate_limit.is_exhausted() {
            warn!(
                "Last observed Unsplash quota is {}, requesting anyway",
                self.rate_limit.remaining()
            );
        }

        let url = self.random_photos_url();
        let count_param = count.to_string();
        info!("Requesting {count} random photos from {url}");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("client_id", self.config.access_key.as_str()),
                ("count", count_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| UnsplashError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let remaining = parse_remaining_header(response.headers());
        match remaining {
            Some(value) => {
                self.rate_limit.record(value);
                debug!("Unsplash requests remaining: {value}");
            }
            None => debug!("Response carried no rate-limit header"),
        }

        let body = response
            .text()
            .await
            .map_err(|e| UnsplashError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, remaining, &body));
        }

        let photos: Vec<PhotoWire> =
            serde_json::from_str(&body).map_err(|e| UnsplashError::Json(e.to_string()))?;
        let images: Vec<ImageRecord> = photos.into_iter().map(ImageRecord::from).collect();

        info!("Received {} images from API.", images.len());
        Ok(images)
    }
}
