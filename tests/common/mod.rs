#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use storefront::config::Config;
use storefront::router::create_router;
use storefront::services::AppState;

pub const BOUNDARY: &str = "storefront-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    // Held so the directory outlives the test.
    pub upload_dir: TempDir,
}

pub fn app() -> TestApp {
    app_with(Config::default())
}

pub fn app_with(config: Config) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("temp dir");
    let config = Config {
        upload_dir: upload_dir.path().to_path_buf(),
        ..config
    };
    let state = Arc::new(AppState::in_memory(config));
    TestApp {
        router: create_router(state.clone()),
        state,
        upload_dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }

    pub fn stored_files(&self) -> usize {
        files_in(self.upload_dir.path())
    }
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: Method, uri: &str) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(self.bytes))
            .expect("request")
    }
}

pub fn product_form(name: &str, category: &str, price: &str) -> MultipartBody {
    MultipartBody::new()
        .text("name", name)
        .text("category", category)
        .text("price", price)
}

pub async fn add_category(app: &TestApp, name: &str, parent: Option<&str>) -> String {
    let body = match parent {
        Some(parent) => serde_json::json!({ "name": name, "parent": parent }),
        None => serde_json::json!({ "name": name }),
    };
    let (status, value) = app
        .send(json_request(Method::POST, "/user/add_category", body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "add_category failed: {}", value);
    value["category"]["id"].as_str().expect("category id").to_string()
}
