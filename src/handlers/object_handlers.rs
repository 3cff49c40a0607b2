//! HTTP handlers for the v1 API: flat bucket, objects named after their files.
//! Streams object bodies to avoid buffering in memory and delegates storage
//! concerns to `GatewayService`.

use crate::{
    errors::AppError,
    handlers::multipart::take_file_field,
    models::{
        object::ObjectListResponse,
        upload::{DEFAULT_CONTENT_TYPE, UploadResponse},
    },
    services::{backend::ObjectDownload, gateway_service::GatewayService},
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use chrono::{DateTime, Utc};

/// `GET /api/s3/list-objects` — every object in the bucket.
pub async fn list_objects(
    State(service): State<GatewayService>,
) -> Result<Json<ObjectListResponse>, AppError> {
    let objects = service
        .list_objects()
        .await
        .map_err(|err| AppError::internal("Failed to list objects").with_error(err))?;

    Ok(Json(ObjectListResponse {
        success: true,
        objects,
    }))
}

/// `POST /api/s3/upload` — store the `file` part under its own name.
pub async fn upload_object(
    State(service): State<GatewayService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let file = take_file_field(multipart).await?;
    let key = service
        .upload_verbatim(file)
        .await
        .map_err(|err| AppError::internal("Failed to upload file").with_error(err))?;

    Ok(Json(UploadResponse::stored(key)))
}

/// `GET /api/s3/get-object/{*key}` — stream the object body.
///
/// Every backend failure, a missing key included, is a 500 in v1.
pub async fn get_object(
    State(service): State<GatewayService>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let download = service
        .get_object(&key)
        .await
        .map_err(|err| AppError::internal("Failed to retrieve object").with_error(err))?;

    Ok(stream_object(download, None))
}

/// Build a streaming response from a backend download.
pub(crate) fn stream_object(
    download: ObjectDownload,
    disposition: Option<HeaderValue>,
) -> Response {
    let mut headers = HeaderMap::new();
    set_object_headers(&mut headers, &download);
    if let Some(value) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    let mut response = Response::new(Body::from_stream(download.body));
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = headers;
    response
}

fn set_object_headers(headers: &mut HeaderMap, download: &ObjectDownload) {
    let content_type = download
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );

    if let Some(length) = download.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    if let Some(etag) = download.etag.as_deref() {
        let quoted = if etag.starts_with('"') {
            etag.to_string()
        } else {
            format!("\"{}\"", etag)
        };
        if let Ok(value) = HeaderValue::from_str(&quoted) {
            headers.insert(header::ETAG, value);
        }
    }

    if let Some(modified) = download.last_modified {
        if let Ok(value) = HeaderValue::from_str(&http_date(&modified)) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }
}

fn http_date(value: &DateTime<Utc>) -> String {
    value.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
