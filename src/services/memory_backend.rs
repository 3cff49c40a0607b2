//! In-process `ObjectBackend`.
//!
//! Keeps objects in a sorted map so listings come back in key order like S3.
//! Pre-signed URLs use a `memory://` scheme and carry a random signature, so
//! they are unique per call but cannot be fetched by anything else.

use crate::{
    models::object::ObjectSummary,
    services::backend::{BackendError, BackendResult, ObjectBackend, ObjectDownload},
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream;
use std::{collections::BTreeMap, io, time::Duration};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Bodies are handed out in chunks of this size to mimic a network stream.
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Debug)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    etag: String,
    last_modified: DateTime<Utc>,
}

pub struct MemoryBackend {
    bucket: String,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryBackend {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn list(&self, prefix: Option<&str>) -> BackendResult<Vec<ObjectSummary>> {
        let objects = self.objects.read().await;
        let prefix = prefix.unwrap_or("");

        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, obj)| ObjectSummary {
                key: key.clone(),
                size: obj.body.len() as u64,
                last_modified: Some(obj.last_modified),
                etag: Some(obj.etag.clone()),
            })
            .collect())
    }

    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> BackendResult<()> {
        if key.is_empty() {
            return Err(BackendError::Service("object key must not be empty".into()));
        }

        let stored = StoredObject {
            // Quoted, as S3 reports it.
            etag: format!("\"{:x}\"", md5::compute(&body)),
            body,
            content_type: content_type.to_string(),
            last_modified: Utc::now(),
        };

        self.objects.write().await.insert(key.to_string(), stored);
        tracing::debug!(bucket = %self.bucket, key = %key, "stored object in memory");
        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<ObjectDownload> {
        let stored = self
            .objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                key: key.to_string(),
            })?;

        let len = stored.body.len();
        let chunks: Vec<io::Result<Bytes>> = (0..len)
            .step_by(CHUNK_SIZE)
            .map(|offset| Ok(stored.body.slice(offset..(offset + CHUNK_SIZE).min(len))))
            .collect();

        Ok(ObjectDownload {
            content_type: Some(stored.content_type),
            content_length: Some(len as u64),
            etag: Some(stored.etag),
            last_modified: Some(stored.last_modified),
            body: Box::pin(stream::iter(chunks)),
        })
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> BackendResult<String> {
        let lifetime = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);
        let expires_at = Utc::now().timestamp().saturating_add(lifetime);
        Ok(format!(
            "memory://{}/{}?expires={}&signature={}",
            self.bucket,
            urlencoding::encode(key),
            expires_at,
            Uuid::new_v4().simple()
        ))
    }

    async fn check(&self) -> BackendResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
