//! HTTP gateway that proxies list, upload and download calls to one object
//! storage bucket.
//!
//! Two API generations are served from the same binary: v1 exposes the bucket
//! as a flat namespace, v2 splits it into original and resized images and hands
//! out pre-signed download links.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use crate::{
    config::{AppConfig, BackendKind},
    services::{
        backend::ObjectBackend, gateway_service::GatewayService, keys::KeyLayout,
        memory_backend::MemoryBackend, s3_backend::S3Backend,
    },
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Construct the backend selected by `cfg`. Called once at startup.
pub async fn build_backend(cfg: &AppConfig) -> Result<Arc<dyn ObjectBackend>> {
    let backend: Arc<dyn ObjectBackend> = match cfg.backend {
        BackendKind::S3 => Arc::new(
            S3Backend::connect(&cfg.bucket, &cfg.region, cfg.endpoint_url.clone())
                .await
                .context("configuring S3 client")?,
        ),
        BackendKind::Memory => {
            tracing::warn!("using in-memory backend; objects are lost on restart");
            Arc::new(MemoryBackend::new(&cfg.bucket))
        }
    };
    Ok(backend)
}

/// Wire a backend and the config into the gateway service.
pub fn build_service(cfg: &AppConfig, backend: Arc<dyn ObjectBackend>) -> GatewayService {
    let layout = KeyLayout::new(&cfg.original_prefix, &cfg.resized_prefix);
    GatewayService::new(backend, layout, cfg.presign_ttl)
}
