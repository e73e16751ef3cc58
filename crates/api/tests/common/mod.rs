#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use folio_core::gallery::GalleryService;
use folio_core::memory::{MemoryObjectStore, MemoryPhotoRecords};
use folio_core::photo::Photo;
use http_body_util::BodyExt;
use tower::ServiceExt;

use folio_api::config::ServerConfig;
use folio_api::router::build_app_router;
use folio_api::state::AppState;

pub const PUBLIC_DOMAIN: &str = "https://assets.example.com";
const BOUNDARY: &str = "folio-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 64 * 1024,
        in_memory: true,
    }
}

/// Application wired to in-memory gateways, with handles to inspect them.
pub struct TestApp {
    pub records: Arc<MemoryPhotoRecords>,
    pub objects: Arc<MemoryObjectStore>,
    config: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_photos(Vec::new())
    }

    pub fn with_photos(photos: Vec<Photo>) -> Self {
        Self {
            records: Arc::new(MemoryPhotoRecords::with_photos(photos)),
            objects: Arc::new(MemoryObjectStore::new(PUBLIC_DOMAIN)),
            config: test_config(),
        }
    }

    /// A fresh router over the shared gateways.
    ///
    /// `oneshot` consumes the router, so each request builds a new one; state
    /// persists through the gateway handles.
    pub fn router(&self) -> Router {
        let gallery = GalleryService::new(self.records.clone(), self.objects.clone());
        let state = AppState { gallery };
        build_app_router(state, &self.config)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn put_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::put(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a multipart form with one `file` part and optional extra text parts.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
        extra: &[(&str, &str)],
    ) -> Response<Body> {
        let body = multipart_body(Some((file_name, content_type, bytes)), extra);
        self.post_multipart(body).await
    }

    pub async fn post_multipart(&self, body: Vec<u8>) -> Response<Body> {
        self.send(
            Request::post("/api/v1/photos")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

/// Encode a `multipart/form-data` body.
pub fn multipart_body(file: Option<(&str, &str, &[u8])>, extra: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in extra {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Ids of a `{ "data": [Photo] }` payload, in order.
pub fn data_ids(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}
