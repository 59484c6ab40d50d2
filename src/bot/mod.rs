/// Update handlers and the action dispatcher
pub mod handlers;
/// Outbound Telegram operations
pub mod messenger;
/// Per-user photo reference cache
pub mod photo_cache;
/// Keyboards and user-facing texts
pub mod views;

pub use handlers::ActionDispatcher;
pub use messenger::{Messenger, TelegramMessenger};
pub use photo_cache::{PhotoCache, PhotoRef};
