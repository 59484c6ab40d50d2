//! Update handlers: `/start`, incoming photos, and action buttons.
//!
//! [`ActionDispatcher`] owns every Photo Cache access. It performs the
//! cache-affecting part of an update inline and hands slow provider work back
//! to the caller as a [`ProcessingJob`].

use crate::bot::photo_cache::PhotoCache;
use crate::bot::views::{action_keyboard, ACTION_PROMPT, GREETING, PHOTO_LOST};
use crate::bot::Messenger;
use crate::processing::{ActionChoice, ProcessingJob};
use anyhow::Result;
use std::sync::Arc;
use teloxide::types::{CallbackQuery, ChatId, Message, MessageId, Update, UpdateKind};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

// Supported bot commands. `/start` carries an optional deep-link payload.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды:")]
pub enum Command {
    #[command(description = "Начать работу.")]
    Start(String),
}

/// Routes decoded updates to the start / photo / button handlers
pub struct ActionDispatcher {
    messenger: Arc<dyn Messenger>,
    cache: PhotoCache,
    bot_username: String,
}

impl ActionDispatcher {
    /// Create a dispatcher.
    ///
    /// `bot_username` is used to accept `/start@bot_username`; pass an empty
    /// string when unknown.
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, cache: PhotoCache, bot_username: impl Into<String>) -> Self {
        Self {
            messenger,
            cache,
            bot_username: bot_username.into(),
        }
    }

    /// The cache this dispatcher reads and writes
    #[must_use]
    pub const fn photo_cache(&self) -> &PhotoCache {
        &self.cache
    }

    /// Handle one update.
    ///
    /// Returns the job to run when a button press selected an action for a
    /// cached photo.
    ///
    /// # Errors
    ///
    /// Returns an error if a reply to a command or photo cannot be sent.
    pub async fn handle_update(&self, update: Update) -> Result<Option<ProcessingJob>> {
        match update.kind {
            UpdateKind::Message(msg) => {
                self.handle_message(&msg).await?;
                Ok(None)
            }
            UpdateKind::CallbackQuery(q) => self.handle_callback(&q).await,
            _ => {
                debug!("Ignoring unsupported update kind");
                Ok(None)
            }
        }
    }

    async fn handle_message(&self, msg: &Message) -> Result<()> {
        if let Some(text) = msg.text() {
            match Command::parse(text, &self.bot_username) {
                Ok(Command::Start(_)) => return self.start(msg).await,
                Err(e) => debug!("Not a supported command: {e}"),
            }
        }

        if msg.photo().is_some() {
            return self.handle_photo(msg).await;
        }

        debug!(chat_id = msg.chat.id.0, "Ignoring message without photo");
        Ok(())
    }

    /// Reply to `/start` with the greeting
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be sent.
    pub async fn start(&self, msg: &Message) -> Result<()> {
        self.messenger.send_text(msg.chat.id, GREETING).await
    }

    /// Remember the largest size of the photo and offer the two actions
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be sent. The photo is cached
    /// before the prompt is sent.
    pub async fn handle_photo(&self, msg: &Message) -> Result<()> {
        let Some(user) = msg.from.as_ref().map(|u| u.id) else {
            debug!(chat_id = msg.chat.id.0, "Photo without sender, ignoring");
            return Ok(());
        };
        let Some(photo) = msg.photo().and_then(<[_]>::last) else {
            return Ok(());
        };

        info!(user_id = user.0, width = photo.width, height = photo.height, "Photo received");
        self.cache.put(user, photo.file.id.clone()).await;

        self.messenger
            .send_with_keyboard(msg.chat.id, ACTION_PROMPT, action_keyboard())
            .await
    }

    /// Handle a button press.
    ///
    /// The query is always answered first. Returns a job only when the
    /// sender has a cached photo and the payload names a known action.
    ///
    /// # Errors
    ///
    /// Currently never fails: Telegram errors while answering or editing are
    /// logged.
    pub async fn handle_callback(&self, q: &CallbackQuery) -> Result<Option<ProcessingJob>> {
        if let Err(e) = self.messenger.answer_callback(q).await {
            warn!(error = %e, "Failed to answer callback query");
        }

        let user = q.from.id;
        let Some(data) = q.data.as_deref() else {
            debug!(user_id = user.0, "Callback query without data");
            return Ok(None);
        };
        let prompt = q.message.as_ref().map(|m| (m.chat().id, m.id()));

        let Some(photo) = self.cache.get(user).await else {
            info!(user_id = user.0, "No cached photo for button press");
            self.edit_prompt(prompt, PHOTO_LOST).await;
            return Ok(None);
        };

        let Some(action) = ActionChoice::from_callback_data(data) else {
            debug!(user_id = user.0, data, "Ignoring unknown callback payload");
            return Ok(None);
        };

        info!(user_id = user.0, action = ?action, "Action selected");
        self.edit_prompt(prompt, action.in_progress_text()).await;

        Ok(Some(ProcessingJob {
            user,
            photo,
            action,
        }))
    }

    async fn edit_prompt(&self, prompt: Option<(ChatId, MessageId)>, text: &str) {
        let Some((chat_id, message_id)) = prompt else {
            debug!("Prompt message is inaccessible, skipping status edit");
            return;
        };

        if let Err(e) = self.messenger.edit_text(chat_id, message_id, text).await {
            warn!(error = %e, "Failed to update prompt message");
        }
    }
}
