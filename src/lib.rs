#![deny(missing_docs)]
//! Unsplash relay bot
//!
//! A Telegram bot that fetches random photos from Unsplash and relays them,
//! with attribution and stats, to the requesting chat.

/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// Unsplash API client
pub mod unsplash;
/// Utility functions
pub mod utils;
