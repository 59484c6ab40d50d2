//! Replicate predictions API client
//!
//! Runs a model the way Replicate's own clients do: create a prediction,
//! then poll it until it reaches a terminal status. The API token is owned by
//! the client instance; nothing is read from or written to process env.

use super::http_utils::{api_error, network_error};
use super::{PhotoEnhancer, ProcessingError};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Prediction as returned by `POST /predictions` and `GET /predictions/{id}`
#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }
}

/// Client for the Replicate HTTP API
pub struct ReplicateClient {
    http_client: HttpClient,
    base_url: String,
    api_token: Option<String>,
    model: String,
    poll_interval: Duration,
    max_wait: Duration,
    sync_wait: Duration,
}

impl ReplicateClient {
    /// Create a new client running `model` (`owner/name` or `owner/name:version`).
    ///
    /// A missing `api_token` is not an error here: every call then fails with
    /// [`ProcessingError::MissingConfig`].
    #[must_use]
    pub fn new(
        http_client: HttpClient,
        base_url: impl Into<String>,
        api_token: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
            model: model.into(),
            poll_interval: Duration::from_millis(crate::config::REPLICATE_POLL_INTERVAL_MS),
            max_wait: Duration::from_secs(crate::config::REPLICATE_MAX_WAIT_SECS),
            sync_wait: Duration::from_secs(crate::config::REPLICATE_SYNC_WAIT_SECS),
        }
    }

    /// Override polling cadence and overall deadline
    #[must_use]
    pub fn with_polling(mut self, poll_interval: Duration, max_wait: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.max_wait = max_wait;
        self
    }

    /// How long Replicate may hold the create request before answering with
    /// an unfinished prediction (`Prefer: wait=N`). Must stay below the HTTP
    /// client timeout; zero disables the header and relies on polling alone.
    #[must_use]
    pub fn with_sync_wait(mut self, sync_wait: Duration) -> Self {
        self.sync_wait = sync_wait;
        self
    }

    /// Run the configured model with `input` and return its raw output
    ///
    /// # Errors
    ///
    /// Returns `MissingConfig` without a token, `Api`/`Network` on HTTP
    /// failures, `Prediction` when the prediction fails or is canceled, and
    /// `Timeout` when it does not finish within the deadline.
    pub async fn run(&self, input: Value) -> Result<Value, ProcessingError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or_else(|| ProcessingError::MissingConfig("REPLICATE_API_KEY".to_string()))?;

        let started = Instant::now();
        let mut prediction = self.create_prediction(token, input).await?;
        info!(prediction_id = %prediction.id, status = %prediction.status, "Replicate prediction created");

        while !prediction.is_terminal() {
            if started.elapsed() >= self.max_wait {
                warn!(prediction_id = %prediction.id, "Replicate prediction did not finish in time");
                return Err(ProcessingError::Timeout(self.max_wait.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.get_prediction(token, &prediction).await?;
            debug!(prediction_id = %prediction.id, status = %prediction.status, "Polled prediction");
        }

        match prediction.status.as_str() {
            "succeeded" => Ok(prediction.output),
            status => Err(ProcessingError::Prediction {
                status: status.to_string(),
                message: match prediction.error {
                    Value::String(s) => s,
                    Value::Null => "no error details".to_string(),
                    other => other.to_string(),
                },
            }),
        }
    }

    /// `owner/name:version` runs a pinned version, `owner/name` the model's latest
    fn create_request(&self, input: Value) -> (String, Value) {
        match self.model.split_once(':') {
            Some((_, version)) => (
                format!("{}/predictions", self.base_url),
                json!({ "version": version, "input": input }),
            ),
            None => (
                format!("{}/models/{}/predictions", self.base_url, self.model),
                json!({ "input": input }),
            ),
        }
    }

    async fn create_prediction(&self, token: &str, input: Value) -> Result<Prediction, ProcessingError> {
        let (url, body) = self.create_request(input);

        let mut request = self.http_client.post(&url).bearer_auth(token).json(&body);
        let wait_secs = self.sync_wait.as_secs();
        if wait_secs > 0 {
            request = request.header("Prefer", format!("wait={wait_secs}"));
        }

        let response = request.send().await.map_err(|e| network_error(&e))?;

        Self::parse_prediction(response).await
    }

    async fn get_prediction(
        &self,
        token: &str,
        prediction: &Prediction,
    ) -> Result<Prediction, ProcessingError> {
        let url = prediction
            .urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/predictions/{}", self.base_url, prediction.id));

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        Self::parse_prediction(response).await
    }

    async fn parse_prediction(response: reqwest::Response) -> Result<Prediction, ProcessingError> {
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| ProcessingError::InvalidOutput(e.to_string()))
    }
}

/// Picks the result URL out of a model output: a string, or the first string of an array
fn output_url(output: &Value) -> Option<&str> {
    match output {
        Value::String(url) => Some(url.as_str()),
        Value::Array(items) => items.iter().find_map(Value::as_str),
        _ => None,
    }
}

#[async_trait]
impl PhotoEnhancer for ReplicateClient {
    async fn enhance(&self, image_url: &str) -> Result<String, ProcessingError> {
        let output = self.run(json!({ "image": image_url })).await?;

        output_url(&output)
            .map(ToString::to_string)
            .ok_or_else(|| ProcessingError::InvalidOutput(format!("unexpected output: {output}")))
    }
}
