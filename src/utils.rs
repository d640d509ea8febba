//! Utility functions shared by the provider and the Telegram layer.

use anyhow::Result;
use std::time::Duration;
use teloxide::RequestError;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

/// Safely truncates a string to a maximum character length (not bytes).
///
/// This is UTF-8 safe and will not panic on multi-byte characters.
///
/// # Examples
///
/// ```
/// use unsplash_relay_bot::utils::truncate_str;
/// let s = "Привет, мир!";
/// assert_eq!(truncate_str(s, 6), "Привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Retry a Telegram API operation with exponential backoff.
///
/// Used for outbound Telegram calls that may fail on transient network
/// errors. Errors rejected by [`is_retryable_telegram_error`] are returned
/// after the first attempt. The retry strategy uses exponential backoff with jitter:
/// - Initial delay: 500ms
/// - Max delay: 4s
/// - Max attempts: 3 (constants in `config.rs`)
///
/// Returns the result of the operation if it succeeds within the allowed
/// attempts, or the last error otherwise.
///
/// # Examples
///
/// ```no_run
/// use unsplash_relay_bot::utils::retry_telegram_operation;
/// use anyhow::Result;
///
/// async fn notify() -> Result<()> {
///     Ok(())
/// }
///
/// # async fn example() -> Result<()> {
/// retry_telegram_operation(|| async { notify().await }).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the last error once all attempts are exhausted, or the first
/// non-retryable error.
pub async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    use crate::config::{
        TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
    };

    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    RetryIf::start(retry_strategy, operation, is_retryable_telegram_error)
        .await
        .map_err(|e| {
            warn!("Telegram API operation failed: {e}");
            e
        })
}

/// Whether a failed Telegram call is worth repeating.
///
/// API rejections (bad markup, blocked bot, missing chat) and chat migrations
/// fail the same way on every attempt. Network failures, flood control and
/// errors that are not a [`RequestError`] are retried.
#[must_use]
pub fn is_retryable_telegram_error(err: &anyhow::Error) -> bool {
    !matches!(
        err.downcast_ref::<RequestError>(),
        Some(RequestError::Api(_) | RequestError::MigrateToChatId(_))
    )
}
