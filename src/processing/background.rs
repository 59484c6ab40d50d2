//! Background-removal connector
//!
//! Downloads the photo from Telegram, sends it to the background remover and
//! delivers the PNG back as a document.

use super::{BackgroundRemover, ProcessingError};
use crate::bot::views::{REMOVE_BG_CAPTION, REMOVE_BG_FAILED, REMOVE_BG_FILE_NAME};
use crate::bot::{Messenger, PhotoRef};
use std::sync::Arc;
use teloxide::types::{ChatId, UserId};
use tracing::{error, info};

/// Runs background removal for one photo and reports the outcome to the user
pub struct BackgroundRemovalConnector {
    messenger: Arc<dyn Messenger>,
    remover: Arc<dyn BackgroundRemover>,
}

impl BackgroundRemovalConnector {
    /// Create a connector delivering through `messenger`
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, remover: Arc<dyn BackgroundRemover>) -> Self {
        Self { messenger, remover }
    }

    /// Process `photo` for `user`.
    ///
    /// On failure the user gets a fixed error message; nothing is returned
    /// to the caller.
    pub async fn process(&self, user: UserId, photo: &PhotoRef) {
        let chat_id = ChatId::from(user);

        match self.try_process(chat_id, photo).await {
            Ok(()) => info!(user_id = user.0, "Background removed and delivered"),
            Err(e) => {
                error!(user_id = user.0, error = %e, "Background removal failed");
                if let Err(send_err) = self.messenger.send_text(chat_id, REMOVE_BG_FAILED).await {
                    error!(user_id = user.0, error = %send_err, "Failed to report background removal error");
                }
            }
        }
    }

    async fn try_process(&self, chat_id: ChatId, photo: &PhotoRef) -> Result<(), ProcessingError> {
        let image = self
            .messenger
            .download_file(photo)
            .await
            .map_err(|e| ProcessingError::Telegram(e.to_string()))?;

        let png = self.remover.remove_background(image).await?;

        self.messenger
            .send_document(chat_id, png, REMOVE_BG_FILE_NAME, REMOVE_BG_CAPTION)
            .await
            .map_err(|e| ProcessingError::Telegram(e.to_string()))
    }
}
