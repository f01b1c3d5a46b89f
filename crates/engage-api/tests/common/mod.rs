//! Shared test fixtures for the HTTP surface.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use engage_api::state::AppState;
use engage_captions::{CaptionError, CaptionGenerator, ChatCompletionClient};
use engage_core::Config;
use engage_db::MemoryPostStore;
use engage_storage::LocalStorage;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "test-boundary-7f3a";

pub fn test_config() -> Config {
    Config {
        server_port: 3000,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        database_url: "postgres://localhost/engage_test".to_string(),
        local_storage_path: "./data/media".to_string(),
        local_storage_base_url: "http://localhost:3000/media".to_string(),
        max_file_size_bytes: 25 * 1024 * 1024,
        allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "video/mp4".to_string(),
        ],
        chat_completion_api_key: None,
        chat_completion_url: "https://api.openai.com/v1/chat/completions".to_string(),
        chat_completion_model: "gpt-4o-mini".to_string(),
        vision_api_key: None,
    }
}

/// A chat client with a canned completion, or a canned failure.
pub struct ScriptedChat {
    pub completion: Result<String, ()>,
}

#[async_trait::async_trait]
impl ChatCompletionClient for ScriptedChat {
    async fn complete(&self, _prompt: &str) -> Result<String, CaptionError> {
        match &self.completion {
            Ok(text) => Ok(text.clone()),
            Err(()) => Err(CaptionError::UpstreamStatus {
                status: 500,
                body: "provider error".to_string(),
            }),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub posts: Arc<MemoryPostStore>,
    pub storage: Arc<LocalStorage>,
    _dir: TempDir,
}

/// Build a full router backed by a tempdir and an in-memory post store.
pub async fn test_app(chat: Option<ScriptedChat>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(
        LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap(),
    );
    let posts = Arc::new(MemoryPostStore::new());
    let captions =
        chat.map(|client| CaptionGenerator::new(Arc::new(client) as Arc<dyn ChatCompletionClient>));

    let state = AppState::assemble(test_config(), storage.clone(), posts.clone(), captions);
    TestApp {
        router: engage_api::build_router(state),
        posts,
        storage,
        _dir: dir,
    }
}

pub fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 60, 30]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .unwrap();
    buffer
}

/// Build a multipart body with a single `file` field.
pub fn multipart_body(filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn send_json(router: &Router, method: &str, uri: &str, body: Value) -> (u16, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = send(router, request).await;
    let status = response.status().as_u16();
    (status, read_json(response).await)
}

pub async fn send_empty(router: &Router, method: &str, uri: &str) -> (u16, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = send(router, request).await;
    let status = response.status().as_u16();
    (status, read_json(response).await)
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}
