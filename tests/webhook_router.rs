//! HTTP-level tests of the webhook router

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use photo_action_bot::bot::{ActionDispatcher, Messenger, PhotoCache};
use photo_action_bot::processing::{
    BackgroundRemovalConnector, BackgroundRemover, Connectors, EnhancementConnector,
    PhotoEnhancer, ProcessingError,
};
use photo_action_bot::testing::photo_update_json;
use photo_action_bot::webhook::{create_webhook_router, AppState, WEBHOOK_ACK};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use teloxide::types::{CallbackQuery, ChatId, FileId, InlineKeyboardMarkup, MessageId, UserId};
use tower::ServiceExt;

const TOKEN: &str = "123456:TEST-token";

/// Counts outbound calls, succeeds at everything
#[derive(Default)]
struct CountingMessenger {
    calls: AtomicUsize,
}

impl CountingMessenger {
    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Messenger for CountingMessenger {
    async fn send_text(&self, _chat_id: ChatId, _text: &str) -> Result<()> {
        self.tick();
        Ok(())
    }

    async fn send_with_keyboard(
        &self,
        _chat_id: ChatId,
        _text: &str,
        _keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        self.tick();
        Ok(())
    }

    async fn edit_text(&self, _chat_id: ChatId, _message_id: MessageId, _text: &str) -> Result<()> {
        self.tick();
        Ok(())
    }

    async fn answer_callback(&self, _query: &CallbackQuery) -> Result<()> {
        self.tick();
        Ok(())
    }

    async fn send_document(
        &self,
        _chat_id: ChatId,
        _content: Vec<u8>,
        _file_name: &str,
        _caption: &str,
    ) -> Result<()> {
        self.tick();
        Ok(())
    }

    async fn send_photo_url(&self, _chat_id: ChatId, _url: &str, _caption: &str) -> Result<()> {
        self.tick();
        Ok(())
    }

    async fn download_file(&self, _file_id: &FileId) -> Result<Vec<u8>> {
        Ok(b"A".to_vec())
    }

    async fn file_url(&self, file_id: &FileId) -> Result<String> {
        Ok(format!("https://files.test/{}", file_id.0))
    }
}

struct Identity;

#[async_trait]
impl BackgroundRemover for Identity {
    async fn remove_background(&self, image: Vec<u8>) -> Result<Vec<u8>, ProcessingError> {
        Ok(image)
    }
}

#[async_trait]
impl PhotoEnhancer for Identity {
    async fn enhance(&self, image_url: &str) -> Result<String, ProcessingError> {
        Ok(image_url.to_string())
    }
}

fn app() -> (axum::Router, Arc<ActionDispatcher>, Arc<CountingMessenger>) {
    let messenger = Arc::new(CountingMessenger::default());
    let shared: Arc<dyn Messenger> = messenger.clone();
    let dispatcher = Arc::new(ActionDispatcher::new(
        shared.clone(),
        PhotoCache::new(60, 100),
        "photo_bot",
    ));
    let connectors = Arc::new(Connectors::new(
        BackgroundRemovalConnector::new(shared.clone(), Arc::new(Identity)),
        EnhancementConnector::new(shared, Arc::new(Identity)),
    ));

    let router = create_webhook_router(
        TOKEN,
        AppState {
            dispatcher: dispatcher.clone(),
            connectors,
        },
    );
    (router, dispatcher, messenger)
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_photo_update_is_acknowledged_and_cached() {
    let (router, dispatcher, messenger) = app();
    let update = photo_update_json(10, 42, "P1").to_string();

    let response = router.oneshot(post(&format!("/{TOKEN}"), update)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, WEBHOOK_ACK);
    assert_eq!(
        dispatcher.photo_cache().get(UserId(42)).await,
        Some(FileId("P1".to_string()))
    );
    assert_eq!(messenger.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_update_is_acknowledged() {
    let (router, _dispatcher, messenger) = app();

    let response = router
        .oneshot(post(&format!("/{TOKEN}"), "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, WEBHOOK_ACK);
    assert_eq!(messenger.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wrong_token_path_is_not_found() {
    let (router, dispatcher, _messenger) = app();
    let update = photo_update_json(10, 42, "P1").to_string();

    let response = router.oneshot(post("/654321:other", update)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(dispatcher.photo_cache().get(UserId(42)).await, None);
}

#[tokio::test]
async fn test_health_probe() {
    let (router, _dispatcher, _messenger) = app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
