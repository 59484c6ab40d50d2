//! remove.bg API client

use super::http_utils::{api_error, network_error};
use super::{BackgroundRemover, ProcessingError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use tracing::{debug, info};

/// Client for `POST /v1.0/removebg`
pub struct RemoveBgClient {
    http_client: HttpClient,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoveBgClient {
    /// Create a new client.
    ///
    /// A missing `api_key` is not an error here: every call then fails with
    /// [`ProcessingError::MissingConfig`].
    #[must_use]
    pub fn new(http_client: HttpClient, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    async fn remove_background(&self, image: Vec<u8>) -> Result<Vec<u8>, ProcessingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProcessingError::MissingConfig("REMOVEBG_API_KEY".to_string()))?;

        debug!(size = image.len(), "Submitting image to remove.bg");

        let form = Form::new()
            .part("image_file", Part::bytes(image).file_name("photo.jpg"))
            .text("size", "auto");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("X-Api-Key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let bytes = response.bytes().await.map_err(|e| network_error(&e))?;
        info!(size = bytes.len(), "remove.bg returned processed image");
        Ok(bytes.to_vec())
    }
}
