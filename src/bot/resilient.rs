//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Wraps `sendMessage` so transient network failures are retried with
//! exponential backoff and jitter, and exposes it to the delivery pipeline as
//! a [`MessageSink`]. Flood-control replies are waited out for the delay
//! Telegram asks for before the next attempt.
//!
//! # Usage
//!
//! ```ignore
//! use unsplash_relay_bot::bot::resilient::send_message_resilient;
//!
//! let msg = send_message_resilient(&bot, chat_id, "Hello!", Some(ParseMode::Html)).await?;
//! ```

use crate::bot::delivery::MessageSink;
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Message, ParseMode};
use teloxide::RequestError;
use tracing::warn;

/// Send a message with automatic retry on network failures.
///
/// Uses [`crate::utils::retry_telegram_operation`] with exponential backoff
/// to handle transient network errors.
///
/// # Arguments
///
/// * `bot` - The Telegram bot instance
/// * `chat_id` - Target chat ID
/// * `text` - Message text to send
/// * `parse_mode` - Optional parse mode (HTML, Markdown, etc.)
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    parse_mode: Option<ParseMode>,
) -> Result<Message> {
    let text = text.into();
    crate::utils::retry_telegram_operation(|| async {
        let mut req = bot.send_message(chat_id, text.clone());
        if let Some(pm) = parse_mode {
            req = req.parse_mode(pm);
        }
        match req.await {
            Ok(message) => Ok(message),
            Err(e) => Err(wait_out_flood_control(e).await),
        }
    })
    .await
}

/// Sleep for the delay a `RetryAfter` reply asks for; other errors pass through.
///
/// The original [`RequestError`] stays reachable via `downcast_ref`.
async fn wait_out_flood_control(err: RequestError) -> anyhow::Error {
    if let RequestError::RetryAfter(delay) = &err {
        warn!("Telegram flood control hit, waiting {delay} before retrying");
        tokio::time::sleep(delay.duration()).await;
    }
    anyhow::Error::from(err)
}

/// [`MessageSink`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    /// Wrap a bot handle
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait::async_trait]
impl MessageSink for TelegramSink {
    async fn send_html(&self, chat_id: ChatId, text: String) -> Result<()> {
        send_message_resilient(&self.bot, chat_id, text, Some(ParseMode::Html)).await?;
        Ok(())
    }

    async fn send_plain(&self, chat_id: ChatId, text: String) -> Result<()> {
        send_message_resilient(&self.bot, chat_id, text, None).await?;
        Ok(())
    }
}
