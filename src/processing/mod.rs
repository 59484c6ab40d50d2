//! Photo processing connectors and provider clients
//!
//! Each connector performs one provider integration end to end: resolve the
//! Telegram photo, call the provider, deliver the result (or a fixed failure
//! message) back to the user.

pub mod background;
pub mod enhance;
mod http_utils;
pub mod removebg;
pub mod replicate;

use crate::bot::PhotoRef;
use async_trait::async_trait;
use teloxide::types::UserId;
use thiserror::Error;

pub use background::BackgroundRemovalConnector;
pub use enhance::EnhancementConnector;
pub use http_utils::create_http_client;
pub use removebg::RemoveBgClient;
pub use replicate::ReplicateClient;

/// Errors that can occur while processing a photo
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Provider credential is not configured
    #[error("Missing API key: {0}")]
    MissingConfig(String),
    /// Error during network communication
    #[error("Network error: {0}")]
    Network(String),
    /// Provider answered with a non-success status
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error description extracted from the body
        message: String,
    },
    /// Asynchronous prediction finished unsuccessfully
    #[error("Prediction {status}: {message}")]
    Prediction {
        /// Terminal prediction status (`failed`, `canceled`)
        status: String,
        /// Error reported by the provider
        message: String,
    },
    /// Provider did not finish in time
    #[error("Timed out after {0}s")]
    Timeout(u64),
    /// Provider returned something other than the expected result
    #[error("Invalid provider output: {0}")]
    InvalidOutput(String),
    /// Telegram file or delivery operation failed
    #[error("Telegram error: {0}")]
    Telegram(String),
}

/// Removes the background of an image
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Returns the processed image (PNG) for the given source image bytes
    async fn remove_background(&self, image: Vec<u8>) -> Result<Vec<u8>, ProcessingError>;
}

/// Upscales / enhances an image available at a public URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoEnhancer: Send + Sync {
    /// Returns a URL of the enhanced image
    async fn enhance(&self, image_url: &str) -> Result<String, ProcessingError>;
}

/// Action selected with an inline button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionChoice {
    /// Remove the photo background
    RemoveBackground,
    /// Improve photo quality
    EnhancePhoto,
}

impl ActionChoice {
    /// Parses a callback payload; unknown payloads yield `None`
    ///
    /// # Examples
    ///
    /// ```
    /// use photo_action_bot::processing::ActionChoice;
    ///
    /// assert_eq!(
    ///     ActionChoice::from_callback_data("remove_bg"),
    ///     Some(ActionChoice::RemoveBackground)
    /// );
    /// assert_eq!(ActionChoice::from_callback_data("rotate"), None);
    /// ```
    #[must_use]
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            crate::bot::views::CALLBACK_REMOVE_BG => Some(Self::RemoveBackground),
            crate::bot::views::CALLBACK_ENHANCE_PHOTO => Some(Self::EnhancePhoto),
            _ => None,
        }
    }

    /// Status text shown while this action runs
    #[must_use]
    pub const fn in_progress_text(self) -> &'static str {
        match self {
            Self::RemoveBackground => crate::bot::views::REMOVE_BG_IN_PROGRESS,
            Self::EnhancePhoto => crate::bot::views::ENHANCE_IN_PROGRESS,
        }
    }
}

/// Work item handed from the dispatcher to a connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingJob {
    /// User who pressed the button; results go to their private chat
    pub user: UserId,
    /// Photo the action applies to
    pub photo: PhotoRef,
    /// Selected action
    pub action: ActionChoice,
}

/// Both connectors, selected by [`ActionChoice`]
pub struct Connectors {
    background: BackgroundRemovalConnector,
    enhance: EnhancementConnector,
}

impl Connectors {
    /// Bundle the two connectors
    #[must_use]
    pub const fn new(background: BackgroundRemovalConnector, enhance: EnhancementConnector) -> Self {
        Self {
            background,
            enhance,
        }
    }

    /// Run the connector matching `job.action`
    ///
    /// Never fails: connector errors are reported to the user and logged.
    pub async fn run(&self, job: ProcessingJob) {
        match job.action {
            ActionChoice::RemoveBackground => self.background.process(job.user, &job.photo).await,
            ActionChoice::EnhancePhoto => self.enhance.process(job.user, &job.photo).await,
        }
    }
}
