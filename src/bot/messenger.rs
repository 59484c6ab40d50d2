//! Outbound Telegram operations used by the bot.
//!
//! Handlers and connectors talk to Telegram only through the [`Messenger`]
//! trait. [`TelegramMessenger`] is the production implementation on top of
//! a teloxide [`Bot`]. Only file lookups and downloads, which are safe to
//! repeat, go through [`crate::utils::retry_telegram_operation`]; a repeated
//! send could deliver the same message twice.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, FileId, InlineKeyboardMarkup, InputFile, MessageId};
use tracing::{debug, info};

/// Telegram operations the bot needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Send a text message with an inline keyboard attached
    async fn send_with_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()>;

    /// Replace the text of a message previously sent by the bot
    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()>;

    /// Acknowledge a button press so the client stops showing a spinner
    async fn answer_callback(&self, query: &CallbackQuery) -> Result<()>;

    /// Send an in-memory file as a document
    async fn send_document(
        &self,
        chat_id: ChatId,
        content: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<()>;

    /// Send a photo that Telegram fetches from `url`
    async fn send_photo_url(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<()>;

    /// Download the content of an uploaded file
    async fn download_file(&self, file_id: &FileId) -> Result<Vec<u8>>;

    /// Resolve an uploaded file to a URL third parties can fetch
    async fn file_url(&self, file_id: &FileId) -> Result<String>;
}

/// [`Messenger`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    /// Wrap a teloxide bot
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(chat_id, text)
            .await
            .map_err(|e| anyhow!("Telegram send error: {e}"))?;
        Ok(())
    }

    async fn send_with_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        self.bot
            .send_message(chat_id, text)
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        const ERROR_NOT_MODIFIED: &str = "message is not modified";

        match self.bot.edit_message_text(chat_id, message_id, text).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains(ERROR_NOT_MODIFIED) => {
                debug!("Message update skipped: {e}");
                Ok(())
            }
            Err(e) => Err(anyhow!("Telegram edit error: {e}")),
        }
    }

    async fn answer_callback(&self, query: &CallbackQuery) -> Result<()> {
        self.bot.answer_callback_query(query.id.clone()).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        content: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<()> {
        let input_file = InputFile::memory(content).file_name(file_name.to_string());
        self.bot
            .send_document(chat_id, input_file)
            .caption(caption)
            .await
            .map_err(|e| anyhow!("Telegram document error: {e}"))?;
        Ok(())
    }

    async fn send_photo_url(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<()> {
        let url = reqwest::Url::parse(url).map_err(|e| anyhow!("Invalid photo URL: {e}"))?;
        self.bot
            .send_photo(chat_id, InputFile::url(url))
            .caption(caption)
            .await
            .map_err(|e| anyhow!("Telegram photo error: {e}"))?;
        Ok(())
    }

    async fn download_file(&self, file_id: &FileId) -> Result<Vec<u8>> {
        let buffer = crate::utils::retry_telegram_operation(|| async {
            let file = self.bot.get_file(file_id.clone()).await?;
            let mut buf = Vec::new();
            self.bot.download_file(&file.path, &mut buf).await?;
            Ok::<_, anyhow::Error>(buf)
        })
        .await?;

        info!(size = buffer.len(), "Downloaded photo from Telegram");
        Ok(buffer)
    }

    async fn file_url(&self, file_id: &FileId) -> Result<String> {
        let file = crate::utils::retry_telegram_operation(|| async {
            self.bot
                .get_file(file_id.clone())
                .await
                .map_err(|e| anyhow!("Telegram get_file error: {e}"))
        })
        .await?;

        let url = file_download_url(&self.bot.api_url(), self.bot.token(), &file.path)?;
        Ok(url.to_string())
    }
}

/// Builds `{api_url}/file/bot{token}/{path}`, the URL Telegram serves file content from
///
/// # Errors
///
/// Returns an error if the resulting URL is invalid.
pub fn file_download_url(api_url: &reqwest::Url, token: &str, path: &str) -> Result<reqwest::Url> {
    api_url
        .join(&format!("file/bot{token}/{path}"))
        .map_err(|e| anyhow!("Invalid file URL: {e}"))
}
