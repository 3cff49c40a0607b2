//! Defines the gateway routes for both API generations.
//!
//! ## Structure
//! - **v1**
//!   - `GET  /api/s3/list-objects`      — every object in the bucket
//!   - `POST /api/s3/upload`            — store the `file` part under its own name
//!   - `GET  /api/s3/get-object/{*key}` — stream an object
//!
//! - **v2**
//!   - `GET  /api/s3/list-images`       — resized images with pre-signed URLs
//!   - `POST /api/s3/upload`            — store the `file` part under the original prefix
//!   - `GET  /api/s3/get-object/{*key}` — stream an object as an attachment
//!
//! The wildcard `*key` accepts both `original%2F1-f.png` and `original/1-f.png`.

use crate::{
    config::ApiVersion,
    handlers::{
        health_handlers::{healthz, readyz},
        image_handlers::{get_image_object, list_images, upload_image},
        object_handlers::{get_object, list_objects, upload_object},
    },
    services::gateway_service::GatewayService,
};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build and return the router for the selected API version.
///
/// The router carries shared state (`GatewayService`) to all handlers.
pub fn routes(version: ApiVersion) -> Router<GatewayService> {
    let api = match version {
        ApiVersion::V1 => Router::new()
            .route("/api/s3/list-objects", get(list_objects))
            .route("/api/s3/upload", post(upload_object))
            .route("/api/s3/get-object/{*key}", get(get_object)),
        ApiVersion::V2 => Router::new()
            .route("/api/s3/list-images", get(list_images))
            .route("/api/s3/upload", post(upload_image))
            .route("/api/s3/get-object/{*key}", get(get_image_object)),
    };

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(api)
}

/// Full application: routes, state and the cross-cutting layers.
pub fn app(service: GatewayService, version: ApiVersion, max_upload_bytes: usize) -> Router {
    routes(version)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn log_request(req: Request, next: Next) -> Response {
    tracing::info!(method = %req.method(), path = %req.uri().path(), "incoming request");
    next.run(req).await
}
