//! Photo action bot
//!
//! A Telegram webhook bot that offers background removal (remove.bg) and
//! quality enhancement (Replicate) for photos users send to it.

/// Telegram bot: handlers, messenger, photo cache, views
pub mod bot;
/// Configuration management
pub mod config;
/// Processing connectors and provider clients
pub mod processing;
/// Testing helpers
pub mod testing;
/// Shared helpers
pub mod utils;
/// Webhook HTTP entry point
pub mod webhook;
