//! HTTP handlers for the v2 API: original/resized layout with pre-signed links.

use crate::{
    errors::AppError,
    handlers::{multipart::take_file_field, object_handlers::stream_object},
    models::{image::ImageListResponse, upload::UploadResponse},
    services::{gateway_service::GatewayService, keys::download_name},
};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::HeaderValue,
    response::Response,
};

/// `GET /api/s3/list-images` — resized images with signed thumbnail and original URLs.
pub async fn list_images(
    State(service): State<GatewayService>,
) -> Result<Json<ImageListResponse>, AppError> {
    let images = service
        .list_images()
        .await
        .map_err(|err| AppError::internal("Failed to list images").with_error(err))?;

    Ok(Json(ImageListResponse {
        success: true,
        images,
    }))
}

/// `POST /api/s3/upload` — store the `file` part as a new original.
pub async fn upload_image(
    State(service): State<GatewayService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let file = take_file_field(multipart).await?;
    let key = service
        .upload_original(file)
        .await
        .map_err(|err| AppError::internal("Failed to upload file").with_error(err))?;

    Ok(Json(UploadResponse::stored(key)))
}

/// `GET /api/s3/get-object/{*key}` — stream the object as a download.
pub async fn get_image_object(
    State(service): State<GatewayService>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let download = service.get_object(&key).await.map_err(|err| {
        if err.is_not_found() {
            AppError::not_found(format!("Object not found: {}", key))
        } else {
            AppError::internal("Failed to retrieve object").with_error(err)
        }
    })?;

    let disposition = attachment_disposition(download_name(&key));
    Ok(stream_object(download, Some(disposition)))
}

fn is_plain_filename_char(c: char) -> bool {
    (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\'
}

/// `attachment; filename="..."`, adding an RFC 5987 `filename*` when the name
/// cannot be sent as a plain quoted string.
pub fn attachment_disposition(file_name: &str) -> HeaderValue {
    let value = if file_name.chars().all(is_plain_filename_char) {
        format!("attachment; filename=\"{}\"", file_name)
    } else {
        let fallback: String = file_name
            .chars()
            .map(|c| if is_plain_filename_char(c) { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(file_name)
        )
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
