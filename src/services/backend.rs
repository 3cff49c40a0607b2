//! The seam between the gateway and object storage.
//!
//! Every gateway operation is a single call on [`ObjectBackend`]. The S3
//! implementation talks to a real bucket; the in-memory one backs local runs
//! and tests.

use crate::models::object::ObjectSummary;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::{io, pin::Pin, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("object `{key}` not found")]
    NotFound { key: String },
    #[error("{0}")]
    Service(String),
    #[error("failed to pre-sign `{key}`: {reason}")]
    Presign { key: String, reason: String },
    #[error("backend misconfigured: {0}")]
    Config(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Object body as an incremental byte stream.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// A fetched object: metadata plus a body that has not been read yet.
pub struct ObjectDownload {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub body: ByteStream,
}

impl std::fmt::Debug for ObjectDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDownload")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("etag", &self.etag)
            .field("last_modified", &self.last_modified)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// List every object whose key starts with `prefix` (all objects when `None`).
    async fn list(&self, prefix: Option<&str>) -> BackendResult<Vec<ObjectSummary>>;

    /// Store `body` under `key` in a single write, replacing any existing object.
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> BackendResult<()>;

    /// Open `key` for reading. Fails with [`BackendError::NotFound`] if absent.
    async fn get(&self, key: &str) -> BackendResult<ObjectDownload>;

    /// Mint a URL that grants read access to `key` for `expires_in`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> BackendResult<String>;

    /// Verify the configured bucket is reachable.
    async fn check(&self) -> BackendResult<()>;

    /// Short backend name used in logs and readiness output.
    fn name(&self) -> &'static str;
}
