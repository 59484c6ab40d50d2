//! Webhook HTTP entry point
//!
//! Telegram posts every update to `POST /{bot_token}`. The token in the path
//! is the only authentication: anyone who learns the URL can post fake
//! updates, so the token must be treated as a secret (it is redacted from
//! logs). The endpoint always answers `200 ok`, whatever happened while
//! handling the update, because Telegram redelivers anything else.

use crate::bot::ActionDispatcher;
use crate::processing::Connectors;
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use teloxide::types::Update;
use tracing::{debug, error, warn};

/// Fixed acknowledgment body
pub const WEBHOOK_ACK: &str = "ok";

/// Shared state of the webhook handler
#[derive(Clone)]
pub struct AppState {
    /// Update router owning the photo cache
    pub dispatcher: Arc<ActionDispatcher>,
    /// Connectors that run selected actions
    pub connectors: Arc<Connectors>,
}

/// Creates the router with the secret webhook route and a health probe
///
/// # Examples
///
/// ```ignore
/// let app = create_webhook_router(&settings.bot_token, state);
/// axum::serve(listener, app).await?;
/// ```
pub fn create_webhook_router(bot_token: &str, state: AppState) -> Router {
    Router::new()
        .route(&format!("/{bot_token}"), post(post_webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    WEBHOOK_ACK
}

/// Decodes the update, runs the cache-affecting handlers inline and spawns
/// the provider job, so that a slow provider never delays the acknowledgment.
async fn post_webhook(State(state): State<AppState>, body: Bytes) -> &'static str {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, size = body.len(), "Discarding malformed update");
            return WEBHOOK_ACK;
        }
    };

    match state.dispatcher.handle_update(update).await {
        Ok(Some(job)) => {
            debug!(user_id = job.user.0, action = ?job.action, "Spawning processing job");
            let connectors = state.connectors.clone();
            tokio::spawn(async move {
                connectors.run(job).await;
            });
        }
        Ok(None) => {}
        Err(e) => error!(error = %e, "Update handler error"),
    }

    WEBHOOK_ACK
}
