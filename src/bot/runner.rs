use crate::bot::delivery::DeliveryWorker;
use crate::bot::handlers::{self, Command};
use crate::bot::inline;
use crate::bot::instrument::logged;
use crate::bot::resilient::TelegramSink;
use crate::config::{ProviderConfig, Settings, TransportMode};
use crate::unsplash::UnsplashClient;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::InlineQuery;
use teloxide::update_listeners::webhooks;
use tracing::{info, warn};

/// Run the Telegram bot until Ctrl-C.
///
/// # Errors
///
/// Returns an error if webhook mode is misconfigured or the webhook
/// listener cannot be set up.
pub async fn run_bot(settings: Arc<Settings>, provider_config: Arc<ProviderConfig>) -> Result<()> {
    let bot = Bot::new(settings.telegram_token.clone());

    let provider = Arc::new(UnsplashClient::new(provider_config));
    let sink = Arc::new(TelegramSink::new(bot.clone()));
    let worker = Arc::new(DeliveryWorker::new(provider, sink));

    match bot.get_me().await {
        Ok(me) => info!("Bot {} is live now", me.user.first_name),
        Err(e) => warn!("Could not fetch bot identity: {e}"),
    }

    let handler = setup_handler(&settings);
    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![worker])
        .enable_ctrlc_handler()
        .build();

    info!(
        "Bot is running ({:?} mode, inline: {}, catch-all: {})...",
        settings.transport_mode, settings.inline_mode, settings.catch_all_reply
    );

    match settings.transport_mode {
        TransportMode::Polling => dispatcher.dispatch().await,
        TransportMode::Webhook => {
            let (address, url) = settings
                .webhook_endpoint()
                .map_err(|e| anyhow!("Invalid webhook configuration: {e}"))?;
            info!("Listening for webhook updates on {address}");

            let listener = webhooks::axum(bot, webhooks::Options::new(address, url))
                .await
                .map_err(|e| anyhow!("Failed to set up webhook: {e}"))?;

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    info!("Done, quitting");
    Ok(())
}

/// Build the update handler tree; optional branches follow the settings.
#[must_use]
pub fn setup_handler(settings: &Settings) -> UpdateHandler<teloxide::RequestError> {
    let mut messages = Update::filter_message().branch(
        dptree::entry()
            .filter_command::<Command>()
            .endpoint(handle_command),
    );

    if settings.catch_all_reply {
        messages = messages.branch(
            dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_catch_all),
        );
    }

    let mut handler = dptree::entry().branch(messages);

    if settings.inline_mode {
        handler = handler.branch(Update::filter_inline_query().endpoint(handle_inline_query));
    }

    handler
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    worker: Arc<DeliveryWorker>,
) -> Result<(), teloxide::RequestError> {
    match cmd {
        Command::Start => logged("start", handlers::start(bot, msg)).await,
        Command::Help => logged("help", handlers::help(bot, msg)).await,
        Command::Random(argument) | Command::Fetch(argument) => {
            logged("random", handlers::random(worker, msg, argument)).await
        }
    }
}

async fn handle_catch_all(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    logged("catch_all", handlers::catch_all(bot, msg)).await
}

async fn handle_inline_query(bot: Bot, query: InlineQuery) -> Result<(), teloxide::RequestError> {
    logged("inline_query", inline::answer_inline_query(bot, query)).await
}
