//! Fetch-and-relay pipeline for one `/random` command.
//!
//! A [`DeliveryWorker`] clamps the requested count, asks the image provider
//! for photos and sends one paced message per photo. Failures never reach
//! the caller: they become a single apology message in the chat.

use crate::bot::formatter::format_image_message;
use crate::config::{DELIVERY_PACING_MS, USER_MAX_IMAGES};
use crate::unsplash::{ImageProvider, UnsplashError};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::ChatId;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Sent instead of photos when the provider call fails
pub const APOLOGY_TEXT: &str = "Unfortunately the limit to Unsplash API has been exhausted :/\n\
                                Please come back in about an hour or so.";

/// Fixed pause after every photo message
pub const PACING_DELAY: Duration = Duration::from_millis(DELIVERY_PACING_MS);

/// Outbound side of the chat platform
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MessageSink: Send + Sync {
    /// Send an HTML message with link previews enabled
    async fn send_html(&self, chat_id: ChatId, text: String) -> Result<()>;

    /// Send a plain-text message
    async fn send_plain(&self, chat_id: ChatId, text: String) -> Result<()>;
}

/// One incoming fetch command
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Chat to deliver into
    pub chat_id: ChatId,
    /// Raw command argument, if any
    pub requested_count: Option<String>,
}

impl FetchRequest {
    /// Build a request from a chat and the raw command argument
    #[must_use]
    pub fn new(chat_id: ChatId, requested_count: impl Into<String>) -> Self {
        let raw = requested_count.into();
        Self {
            chat_id,
            requested_count: (!raw.trim().is_empty()).then_some(raw),
        }
    }
}

/// Turn the raw command argument into an image count in `1..=USER_MAX_IMAGES`.
///
/// Only the first word is considered. Missing or non-numeric input means one
/// image; integers too large for `i64` saturate.
///
/// # Examples
///
/// ```
/// use unsplash_relay_bot::bot::delivery::parse_requested_count;
/// assert_eq!(parse_requested_count(None), 1);
/// assert_eq!(parse_requested_count(Some("3")), 3);
/// assert_eq!(parse_requested_count(Some("99")), 5);
/// assert_eq!(parse_requested_count(Some("abc")), 1);
/// ```
#[must_use]
pub fn parse_requested_count(raw: Option<&str>) -> usize {
    let Some(token) = raw.and_then(|s| s.split_whitespace().next()) else {
        return 1;
    };

    let value = match token.parse::<i64>() {
        Ok(value) => value,
        Err(_) if is_integer_literal(token) => {
            if token.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }
        Err(_) => 1,
    };

    // Lossless: the clamped value is within 1..=USER_MAX_IMAGES
    usize::try_from(value.clamp(1, USER_MAX_IMAGES as i64)).unwrap_or(1)
}

fn is_integer_literal(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Runs fetch requests against a provider and relays the results
#[derive(Clone)]
pub struct DeliveryWorker {
    provider: Arc<dyn ImageProvider>,
    sink: Arc<dyn MessageSink>,
}

impl DeliveryWorker {
    /// Create a worker from a provider and a messaging sink
    #[must_use]
    pub fn new(provider: Arc<dyn ImageProvider>, sink: Arc<dyn MessageSink>) -> Self {
        Self { provider, sink }
    }

    /// Run `handle` on its own task; the dispatcher does not wait for it.
    pub fn spawn(&self, request: FetchRequest) -> JoinHandle<()> {
        let worker = self.clone();
        tokio::spawn(async move { worker.handle(request).await })
    }

    /// Fetch and deliver the photos for one request.
    pub async fn handle(&self, request: FetchRequest) {
        let FetchRequest {
            chat_id,
            requested_count,
        } = request;
        let count = parse_requested_count(requested_count.as_deref());
        info!("Fetching {count} image(s) for chat {chat_id}");

        let images = match self.provider.fetch_random(count).await {
            Ok(images) => images,
            Err(e) => {
                log_fetch_failure(chat_id, &e);
                if let Err(send_err) = self.sink.send_plain(chat_id, APOLOGY_TEXT.to_string()).await
                {
                    error!("Failed to send apology to chat {chat_id}: {send_err}");
                }
                return;
            }
        };

        let total = images.len();
        for (index, image) in images.into_iter().enumerate() {
            let text = format_image_message(&image);
            if let Err(e) = self.sink.send_html(chat_id, text).await {
                warn!(
                    "Failed to send image {} ({}/{total}) to chat {chat_id}: {e}",
                    image.id,
                    index + 1
                );
            }
            tokio::time::sleep(PACING_DELAY).await;
        }

        info!("Delivered {total} image(s) to chat {chat_id}");
    }
}

fn log_fetch_failure(chat_id: ChatId, err: &UnsplashError) {
    if err.is_transport() {
        error!("Unsplash request for chat {chat_id} failed: {err}");
    } else {
        warn!("Unsplash quota exhausted for chat {chat_id}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unsplash::{Author, ImageRecord, ImageUrls, MockImageProvider};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use proptest::prelude::*;

    fn image(id: &str) -> ImageRecord {
        ImageRecord {
            id: id.to_string(),
            description: Some(format!("photo {id}")),
            alt_description: None,
            views: 10,
            likes: 5,
            downloads: 1,
            author: Author {
                name: "Ann".to_string(),
                profile_url: "https://unsplash.com/@ann".to_string(),
            },
            urls: ImageUrls {
                preview: format!("https://images.unsplash.com/{id}/regular"),
                full: format!("https://images.unsplash.com/{id}/full"),
            },
            page_url: format!("https://unsplash.com/photos/{id}"),
        }
    }

    #[test]
    fn test_parse_requested_count() {
        assert_eq!(parse_requested_count(None), 1);
        assert_eq!(parse_requested_count(Some("")), 1);
        assert_eq!(parse_requested_count(Some("abc")), 1);
        assert_eq!(parse_requested_count(Some("0")), 1);
        assert_eq!(parse_requested_count(Some("-4")), 1);
        assert_eq!(parse_requested_count(Some("4")), 4);
        assert_eq!(parse_requested_count(Some(" 2 extra words")), 2);
        assert_eq!(parse_requested_count(Some("99")), 5);
        assert_eq!(parse_requested_count(Some("+3")), 3);
        assert_eq!(parse_requested_count(Some("2.5")), 1);
        assert_eq!(parse_requested_count(Some("99999999999999999999999")), 5);
        assert_eq!(parse_requested_count(Some("-99999999999999999999999")), 1);
    }

    #[test]
    fn test_fetch_request_blank_argument() {
        let request = FetchRequest::new(ChatId(1), "   ");
        assert!(request.requested_count.is_none());
        let request = FetchRequest::new(ChatId(1), "3");
        assert_eq!(request.requested_count.as_deref(), Some("3"));
    }

    proptest! {
        #[test]
        fn effective_count_is_bounded(raw in "\\PC*") {
            let count = parse_requested_count(Some(&raw));
            prop_assert!((1..=USER_MAX_IMAGES).contains(&count));
        }

        #[test]
        fn numeric_input_is_clamped(n in any::<i64>()) {
            let count = parse_requested_count(Some(&n.to_string()));
            let expected = usize::try_from(n.clamp(1, 5)).unwrap_or(1);
            prop_assert_eq!(count, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_clamps_before_calling_provider() {
        let mut provider = MockImageProvider::new();
        provider
            .expect_fetch_random()
            .with(eq(5))
            .times(1)
            .returning(|_| Ok(vec![image("a")]));

        let mut sink = MockMessageSink::new();
        sink.expect_send_html().times(1).returning(|_, _| Ok(()));
        sink.expect_send_plain().never();

        let worker = DeliveryWorker::new(Arc::new(provider), Arc::new(sink));
        worker.handle(FetchRequest::new(ChatId(7), "99")).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sends_in_order() {
        let mut provider = MockImageProvider::new();
        provider
            .expect_fetch_random()
            .with(eq(3))
            .returning(|_| Ok(vec![image("a"), image("b"), image("c")]));

        let mut seq = Sequence::new();
        let mut sink = MockMessageSink::new();
        for id in ["a", "b", "c"] {
            let needle = format!("https://images.unsplash.com/{id}/full");
            sink.expect_send_html()
                .withf(move |chat, text| *chat == ChatId(42) && text.contains(&needle))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
        sink.expect_send_plain().never();

        let worker = DeliveryWorker::new(Arc::new(provider), Arc::new(sink));
        worker.handle(FetchRequest::new(ChatId(42), "3")).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_sends_single_apology() {
        let mut provider = MockImageProvider::new();
        provider.expect_fetch_random().times(1).returning(|_| {
            Err(UnsplashError::RateLimitExceeded {
                message: "Rate Limit Exceeded".to_string(),
            })
        });

        let mut sink = MockMessageSink::new();
        sink.expect_send_html().never();
        sink.expect_send_plain()
            .withf(|chat, text| *chat == ChatId(9) && text == APOLOGY_TEXT)
            .times(1)
            .returning(|_, _| Ok(()));

        let worker = DeliveryWorker::new(Arc::new(provider), Arc::new(sink));
        worker.handle(FetchRequest::new(ChatId(9), "2")).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_does_not_stop_delivery() {
        let mut provider = MockImageProvider::new();
        provider
            .expect_fetch_random()
            .returning(|_| Ok(vec![image("a"), image("b")]));

        let mut seq = Sequence::new();
        let mut sink = MockMessageSink::new();
        sink.expect_send_html()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(anyhow::anyhow!("Bad Request: chat not found")));
        sink.expect_send_html()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let worker = DeliveryWorker::new(Arc::new(provider), Arc::new(sink));
        worker.handle(FetchRequest::new(ChatId(3), "2")).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_apology_send_failure_is_absorbed() {
        let mut provider = MockImageProvider::new();
        provider
            .expect_fetch_random()
            .returning(|_| Err(UnsplashError::Network("connection refused".to_string())));

        let mut sink = MockMessageSink::new();
        sink.expect_send_plain()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("network down")));

        let worker = DeliveryWorker::new(Arc::new(provider), Arc::new(sink));
        worker.handle(FetchRequest::new(ChatId(3), "")).await;
    }
}
