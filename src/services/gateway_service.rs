//! GatewayService — one method per gateway operation.
//!
//! Holds the single long-lived backend client shared by every request plus the
//! naming settings. Each method issues exactly one kind of backend call and
//! returns backend errors untouched so handlers can pick the status code.

use crate::{
    models::{image::ImageEntry, object::ObjectSummary, upload::UploadedFile},
    services::{
        backend::{BackendResult, ObjectBackend, ObjectDownload},
        keys::KeyLayout,
    },
};
use chrono::Utc;
use futures::future::try_join_all;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Clone)]
pub struct GatewayService {
    backend: Arc<dyn ObjectBackend>,
    layout: KeyLayout,
    presign_ttl: Duration,
}

impl GatewayService {
    pub fn new(backend: Arc<dyn ObjectBackend>, layout: KeyLayout, presign_ttl: Duration) -> Self {
        Self {
            backend,
            layout,
            presign_ttl,
        }
    }

    pub fn backend(&self) -> &dyn ObjectBackend {
        self.backend.as_ref()
    }

    /// Every object in the bucket, as the backend reports it.
    pub async fn list_objects(&self) -> BackendResult<Vec<ObjectSummary>> {
        let objects = self.backend.list(None).await?;
        debug!(count = objects.len(), "listed bucket");
        Ok(objects)
    }

    /// Resized images with fresh pre-signed URLs for them and their originals.
    ///
    /// Zero-byte placeholders are skipped. The original URL is derived from the
    /// file name and may point at a missing object.
    pub async fn list_images(&self) -> BackendResult<Vec<ImageEntry>> {
        let resized = self
            .backend
            .list(Some(self.layout.resized_prefix()))
            .await?;

        let pending = resized
            .into_iter()
            .filter(|obj| !obj.is_placeholder())
            .filter_map(|obj| {
                let file_name = self.layout.file_name(&obj.key)?.to_string();
                Some(self.describe_image(obj, file_name))
            });

        let images = try_join_all(pending).await?;
        debug!(count = images.len(), "listed resized images");
        Ok(images)
    }

    async fn describe_image(
        &self,
        obj: ObjectSummary,
        file_name: String,
    ) -> BackendResult<ImageEntry> {
        let original_key = self.layout.paired_original(&file_name);
        let thumbnail_url = self.backend.presign_get(&obj.key, self.presign_ttl).await?;
        let original_url = self
            .backend
            .presign_get(&original_key, self.presign_ttl)
            .await?;

        Ok(ImageEntry {
            file_name,
            thumbnail_url,
            original_url,
            last_modified: obj.last_modified,
        })
    }

    /// Store a file under its own name, replacing any object with that key.
    pub async fn upload_verbatim(&self, file: UploadedFile) -> BackendResult<String> {
        let key = file.file_name.clone();
        self.store(key, file).await
    }

    /// Store a file under a timestamped key in the original namespace.
    pub async fn upload_original(&self, file: UploadedFile) -> BackendResult<String> {
        let key = self
            .layout
            .original_key(&file.file_name, Utc::now().timestamp_millis());
        self.store(key, file).await
    }

    async fn store(&self, key: String, file: UploadedFile) -> BackendResult<String> {
        let size = file.data.len();
        self.backend.put(&key, &file.content_type, file.data).await?;
        info!(
            backend = self.backend.name(),
            key = %key,
            size_bytes = size,
            content_type = %file.content_type,
            "stored upload"
        );
        Ok(key)
    }

    /// Open an object for streaming.
    pub async fn get_object(&self, key: &str) -> BackendResult<ObjectDownload> {
        self.backend.get(key).await
    }
}
