//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the bucket is reachable

use crate::services::{backend::ObjectBackend as _, gateway_service::GatewayService};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Asks the backend whether the bucket is reachable. HTTP 200 when it is,
/// HTTP 503 with the backend error otherwise.
pub async fn readyz(State(service): State<GatewayService>) -> impl IntoResponse {
    let backend = service.backend();
    let (status, error) = match backend.check().await {
        Ok(()) => (StatusCode::OK, None),
        Err(err) => {
            tracing::warn!(backend = backend.name(), error = %err, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Some(err.to_string()))
        }
    };

    let body = ReadyResponse {
        status: if status == StatusCode::OK {
            "ok".into()
        } else {
            "error".into()
        },
        backend: backend.name(),
        error,
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}
