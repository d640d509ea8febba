//! HTTP helpers for the Unsplash client
//!
//! Client construction, rate-limit header parsing and mapping of non-success
//! responses onto [`UnsplashError`].

use super::UnsplashError;
use crate::config::get_unsplash_connect_timeout_secs;
use crate::utils::truncate_str;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;

/// Header carrying the number of requests left in the current window
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

const MAX_ERROR_BODY_CHARS: usize = 500;

/// Creates an HTTP client with the configured connect timeout.
///
/// Uses `UNSPLASH_CONNECT_TIMEOUT_SECS` environment variable or 5s default.
#[must_use]
pub fn create_http_client() -> HttpClient {
    let mut headers = HeaderMap::new();
    headers.insert("accept-version", HeaderValue::from_static("v1"));

    HttpClient::builder()
        .connect_timeout(Duration::from_secs(get_unsplash_connect_timeout_secs()))
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Reads the remaining-requests header; `None` if absent or not an integer.
#[must_use]
pub fn parse_remaining_header(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(RATE_LIMIT_REMAINING_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
}

/// Strips proxy HTML pages and truncates long bodies for logging.
fn clean_error_body(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        format!("{status} (Server returned HTML error page)")
    } else if body.chars().count() > MAX_ERROR_BODY_CHARS {
        format!("{}... (truncated)", truncate_str(body, MAX_ERROR_BODY_CHARS))
    } else {
        body.to_string()
    }
}

/// Maps a non-success response onto an error.
///
/// Unsplash answers an exhausted quota with `403` and a zero remaining
/// header; `429` is treated the same way.
pub fn classify_failure(status: StatusCode, remaining: Option<i64>, body: &str) -> UnsplashError {
    let message = clean_error_body(status, body);

    let exhausted = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && remaining == Some(0));

    if exhausted {
        UnsplashError::RateLimitExceeded { message }
    } else {
        UnsplashError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
