//! Bot UI components
//!
//! Contains the action keyboard, callback payloads, and user-facing texts.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// ─────────────────────────────────────────────────────────────────────────────
// Callback constants
// ─────────────────────────────────────────────────────────────────────────────

/// Callback data for background removal
pub const CALLBACK_REMOVE_BG: &str = "remove_bg";
/// Callback data for quality enhancement
pub const CALLBACK_ENHANCE_PHOTO: &str = "enhance_photo";

// ─────────────────────────────────────────────────────────────────────────────
// Texts
// ─────────────────────────────────────────────────────────────────────────────

/// Reply to `/start`
pub const GREETING: &str = "Привет! Отправь мне фото, и я предложу, что с ним можно сделать.";
/// Prompt shown under a freshly received photo
pub const ACTION_PROMPT: &str = "Отлично! Что сделать с этим фото?";
/// Shown when the button press refers to a photo that is no longer cached
pub const PHOTO_LOST: &str = "Кажется, я потерял ваше фото. Пожалуйста, отправьте его снова.";

/// Status while background removal is running
pub const REMOVE_BG_IN_PROGRESS: &str = "Принято! Удаляю фон...";
/// Status while enhancement is running
pub const ENHANCE_IN_PROGRESS: &str =
    "Принято! Улучшаю качество (это может занять до 30 секунд)...";

/// File name of the background-removed result
pub const REMOVE_BG_FILE_NAME: &str = "photo_no_bg.png";
/// Caption of the background-removed result
pub const REMOVE_BG_CAPTION: &str = "Фон удален!";
/// Caption of the enhanced photo
pub const ENHANCE_CAPTION: &str = "Качество улучшено!";

/// Generic background removal failure
pub const REMOVE_BG_FAILED: &str = "Ошибка при удалении фона.";
/// Generic enhancement failure
pub const ENHANCE_FAILED: &str = "Ошибка при улучшении качества.";

// ─────────────────────────────────────────────────────────────────────────────
// Keyboards
// ─────────────────────────────────────────────────────────────────────────────

/// Inline keyboard offering both actions for a photo
///
/// # Examples
///
/// ```
/// use photo_action_bot::bot::views::action_keyboard;
/// let keyboard = action_keyboard();
/// assert_eq!(keyboard.inline_keyboard[0].len(), 2);
/// ```
#[must_use]
pub fn action_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Удалить фон 🗑️", CALLBACK_REMOVE_BG),
        InlineKeyboardButton::callback("Улучшить качество ✨", CALLBACK_ENHANCE_PHOTO),
    ]])
}
