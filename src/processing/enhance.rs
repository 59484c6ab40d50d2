//! Enhancement connector
//!
//! Hands the photo's Telegram URL to the enhancer and sends the resulting
//! image back as a photo.

use super::{PhotoEnhancer, ProcessingError};
use crate::bot::views::{ENHANCE_CAPTION, ENHANCE_FAILED};
use crate::bot::{Messenger, PhotoRef};
use std::sync::Arc;
use teloxide::types::{ChatId, UserId};
use tracing::{error, info};

/// Runs quality enhancement for one photo and reports the outcome to the user
pub struct EnhancementConnector {
    messenger: Arc<dyn Messenger>,
    enhancer: Arc<dyn PhotoEnhancer>,
}

impl EnhancementConnector {
    /// Create a connector delivering through `messenger`
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, enhancer: Arc<dyn PhotoEnhancer>) -> Self {
        Self {
            messenger,
            enhancer,
        }
    }

    /// Process `photo` for `user`; failures end in a fixed error message
    pub async fn process(&self, user: UserId, photo: &PhotoRef) {
        let chat_id = ChatId::from(user);

        match self.try_process(chat_id, photo).await {
            Ok(()) => info!(user_id = user.0, "Enhanced photo delivered"),
            Err(e) => {
                error!(user_id = user.0, error = %e, "Photo enhancement failed");
                if let Err(send_err) = self.messenger.send_text(chat_id, ENHANCE_FAILED).await {
                    error!(user_id = user.0, error = %send_err, "Failed to report enhancement error");
                }
            }
        }
    }

    async fn try_process(&self, chat_id: ChatId, photo: &PhotoRef) -> Result<(), ProcessingError> {
        let source_url = self
            .messenger
            .file_url(photo)
            .await
            .map_err(|e| ProcessingError::Telegram(e.to_string()))?;

        let result_url = self.enhancer.enhance(&source_url).await?;

        self.messenger
            .send_photo_url(chat_id, &result_url, ENHANCE_CAPTION)
            .await
            .map_err(|e| ProcessingError::Telegram(e.to_string()))
    }
}
