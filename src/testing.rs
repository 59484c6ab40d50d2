//! Testing helpers.
//!
//! Builders for Telegram updates, decoded from the same JSON shape the Bot API
//! delivers to the webhook.

use anyhow::{bail, Result};
use serde_json::{json, Value};
use teloxide::types::{Update, UpdateKind};

/// Unix time used for all generated messages
const DATE: i64 = 1_700_000_000;
/// Id of the bot account in generated messages
const BOT_ID: u64 = 777_000;

fn user(user_id: u64) -> Value {
    json!({ "id": user_id, "is_bot": false, "first_name": "Tester", "username": "tester" })
}

fn private_chat(user_id: u64) -> Value {
    json!({ "id": user_id, "type": "private", "first_name": "Tester" })
}

/// Decodes through the serialized text, as the webhook does.
///
/// `Update` does not deserialize from an in-memory `Value`: teloxide falls
/// back to `UpdateKind::Error` instead of failing.
fn decode(value: &Value) -> Result<Update> {
    let update: Update = serde_json::from_str(&value.to_string())?;
    if let UpdateKind::Error(raw) = &update.kind {
        bail!("update {} did not decode: {raw}", update.id.0);
    }
    Ok(update)
}

/// Raw JSON of a photo message; the photo sizes are ordered smallest to largest
#[must_use]
pub fn photo_update_json(update_id: u32, user_id: u64, largest_file_id: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": 100 + update_id,
            "date": DATE,
            "chat": private_chat(user_id),
            "from": user(user_id),
            "photo": [
                { "file_id": format!("{largest_file_id}-thumb"), "file_unique_id": "t", "width": 90, "height": 90, "file_size": 1_200 },
                { "file_id": format!("{largest_file_id}-medium"), "file_unique_id": "m", "width": 320, "height": 320, "file_size": 15_000 },
                { "file_id": largest_file_id, "file_unique_id": "l", "width": 1280, "height": 1280, "file_size": 120_000 }
            ]
        }
    })
}

/// Photo message from `user_id` whose largest size has `largest_file_id`
///
/// # Errors
///
/// Returns an error if the generated JSON is not a valid message update.
pub fn photo_update(update_id: u32, user_id: u64, largest_file_id: &str) -> Result<Update> {
    decode(&photo_update_json(update_id, user_id, largest_file_id))
}

/// Text message from `user_id`; `/commands` get a `bot_command` entity
///
/// # Errors
///
/// Returns an error if the generated JSON is not a valid message update.
pub fn text_update(update_id: u32, user_id: u64, text: &str) -> Result<Update> {
    let mut message = json!({
        "message_id": 100 + update_id,
        "date": DATE,
        "chat": private_chat(user_id),
        "from": user(user_id),
        "text": text
    });

    if text.starts_with('/') {
        let length = text.split_whitespace().next().map_or(0, |cmd| cmd.encode_utf16().count());
        message["entities"] = json!([{ "type": "bot_command", "offset": 0, "length": length }]);
    }

    decode(&json!({ "update_id": update_id, "message": message }))
}

/// Button press by `user_id` on the prompt message `prompt_message_id`
///
/// # Errors
///
/// Returns an error if the generated JSON is not a valid callback update.
pub fn callback_update(
    update_id: u32,
    user_id: u64,
    prompt_message_id: i32,
    data: Option<&str>,
) -> Result<Update> {
    let mut query = json!({
        "id": format!("cbq-{update_id}"),
        "from": user(user_id),
        "chat_instance": "ci-1",
        "message": {
            "message_id": prompt_message_id,
            "date": DATE,
            "chat": private_chat(user_id),
            "from": { "id": BOT_ID, "is_bot": true, "first_name": "PhotoBot", "username": "photo_bot" },
            "text": crate::bot::views::ACTION_PROMPT
        }
    });

    if let Some(data) = data {
        query["data"] = json!(data);
    }

    decode(&json!({ "update_id": update_id, "callback_query": query }))
}
