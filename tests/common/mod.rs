//! Shared helpers for the in-process API tests.
//!
//! Requests go through `tower::ServiceExt::oneshot`; no sockets are opened.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use storage_gateway::{
    config::ApiVersion,
    models::object::ObjectSummary,
    routes::routes::app,
    services::{
        backend::{BackendError, BackendResult, ObjectBackend, ObjectDownload},
        gateway_service::GatewayService,
        keys::KeyLayout,
        memory_backend::MemoryBackend,
    },
};

pub const BOUNDARY: &str = "gateway-test-boundary";

pub fn app_with(backend: Arc<dyn ObjectBackend>, version: ApiVersion) -> Router {
    let service = GatewayService::new(
        backend,
        KeyLayout::new("original/", "resized/"),
        Duration::from_secs(3600),
    );
    app(service, version, 10 * 1024 * 1024)
}

/// App over a fresh in-memory bucket; the backend handle lets tests seed objects.
pub fn memory_app(version: ApiVersion) -> (Router, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new("test-bucket"));
    (app_with(backend.clone(), version), backend)
}

pub fn failing_app(version: ApiVersion) -> Router {
    app_with(Arc::new(FailingBackend), version)
}

/// One part of a multipart body.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some(file_name),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/s3/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn object_uri(key: &str) -> String {
    format!("/api/s3/get-object/{}", urlencoding::encode(key))
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Backend whose every call fails, for the error paths.
pub struct FailingBackend;

fn unavailable() -> BackendError {
    BackendError::Service("service unavailable: connection refused".into())
}

#[async_trait]
impl ObjectBackend for FailingBackend {
    async fn list(&self, _prefix: Option<&str>) -> BackendResult<Vec<ObjectSummary>> {
        Err(unavailable())
    }

    async fn put(&self, _key: &str, _content_type: &str, _body: Bytes) -> BackendResult<()> {
        Err(unavailable())
    }

    async fn get(&self, _key: &str) -> BackendResult<ObjectDownload> {
        Err(unavailable())
    }

    async fn presign_get(&self, _key: &str, _expires_in: Duration) -> BackendResult<String> {
        Err(unavailable())
    }

    async fn check(&self) -> BackendResult<()> {
        Err(unavailable())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
