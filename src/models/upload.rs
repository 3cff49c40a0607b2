//! Upload payloads.

use bytes::Bytes;
use serde::Serialize;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file taken from a multipart request, fully buffered.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub file_name: String,

    /// Declared MIME type of the part.
    pub content_type: String,

    pub data: Bytes,
}

/// Body of a successful `POST /api/s3/upload`.
#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// Key the file was stored under.
    pub key: String,
}

impl UploadResponse {
    pub fn stored(key: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "File uploaded successfully.".into(),
            key: key.into(),
        }
    }
}
