//! Extraction of the single `file` part of an upload request.

use crate::{
    errors::AppError,
    models::upload::{DEFAULT_CONTENT_TYPE, UploadedFile},
};
use axum::extract::{Multipart, multipart::MultipartRejection};
use tracing::warn;

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

pub const NO_FILES_MESSAGE: &str = "No files were uploaded.";
pub const NO_FILE_FIELD_MESSAGE: &str = "No file found in the \"file\" field.";

/// Buffer the first file sent in the `file` field.
///
/// Only parts with a non-empty filename count as files; text fields are
/// skipped. A request that is not multipart at all is treated like one that
/// carries no files.
pub async fn take_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        AppError::bad_request(NO_FILES_MESSAGE).with_error(rejection.body_text())
    })?;

    let mut saw_file = false;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| {
            AppError::new(err.status(), "Failed to read upload").with_error(err.body_text())
        })?
    {
        let Some(file_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        saw_file = true;

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if upload.is_some() {
            warn!(file_name = %file_name, "ignoring extra file in the `file` field");
            continue;
        }

        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await.map_err(|err| {
            AppError::new(err.status(), "Failed to read upload").with_error(err.body_text())
        })?;

        upload = Some(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    match upload {
        Some(file) => Ok(file),
        None if saw_file => Err(AppError::bad_request(NO_FILE_FIELD_MESSAGE)),
        None => Err(AppError::bad_request(NO_FILES_MESSAGE)),
    }
}
