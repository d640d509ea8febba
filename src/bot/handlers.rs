use crate::bot::delivery::{DeliveryWorker, FetchRequest};
use crate::config::USER_MAX_IMAGES;
use anyhow::Result;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;

// Helper function to get user name from Message
fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Greet the user
    #[command(description = "Start the bot.")]
    Start,
    /// Explain how to use the bot
    #[command(description = "Show usage help.")]
    Help,
    /// Fetch random photos, optional count argument
    #[command(description = "Get random photos: /random or /random n (max 5).")]
    Random(String),
    /// Alias of `/random`
    #[command(description = "Same as /random.")]
    Fetch(String),
}

/// Usage text for `/help`
#[must_use]
pub fn help_text() -> String {
    format!(
        "I am designed to send amazing pictures from Unsplash to you.\n\
         Hit /random to get one or /random n to get n images.\n\
         Keep in mind that the maximum is {USER_MAX_IMAGES}.\n\
         Please be patient and do not exhaust the bot :)."
    )
}

/// Greeting for `/start`
#[must_use]
pub fn start_text(first_name: &str) -> String {
    format!("Hey {first_name}. Welcome onboard.\nTo begin, type /help.")
}

/// Reply to text that is not a command
pub const CATCH_ALL_TEXT: &str = "I only understand commands. Type /help to see what I can do.";

/// Start handler
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let first_name = msg
        .from
        .as_ref()
        .map_or_else(|| "there".to_string(), |u| u.first_name.clone());

    info!("User {user_id} ({}) initiated /start command.", get_user_name(&msg));
    bot.send_message(msg.chat.id, start_text(&first_name))
        .await?;
    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the help message cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, help_text()).await?;
    Ok(())
}

/// Fetch command handler: hands the request to a background delivery task.
///
/// # Errors
///
/// Never fails; delivery errors are reported in the chat by the worker.
pub async fn random(worker: Arc<DeliveryWorker>, msg: Message, argument: String) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    info!(
        "User {user_id} ({}) requested images with argument {argument:?}",
        get_user_name(&msg)
    );

    // Fire and forget: the dispatcher moves on while photos are paced out
    drop(worker.spawn(FetchRequest::new(msg.chat.id, argument)));
    Ok(())
}

/// Reply to any non-command text with a pointer to `/help`
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn catch_all(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, CATCH_ALL_TEXT).await?;
    Ok(())
}
