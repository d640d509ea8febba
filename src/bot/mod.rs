/// Fetch-and-relay pipeline for image commands
pub mod delivery;
/// HTML message body for relayed photos
pub mod formatter;
/// Command handlers
pub mod handlers;
/// Inline-query text transforms
pub mod inline;
/// Entry/exit logging for dispatcher endpoints
pub mod instrument;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// Dispatcher setup and transport selection
pub mod runner;
