//! Image listing entries served by the v2 API.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A resized image paired with the original it was derived from.
///
/// Both URLs are pre-signed and expire; `original_url` is derived from the
/// file name and may point at an object that does not exist.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub file_name: String,
    pub thumbnail_url: String,
    pub original_url: String,
    #[serde(
        serialize_with = "super::timestamp::serialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Body of `GET /api/s3/list-images`.
#[derive(Serialize, Debug)]
pub struct ImageListResponse {
    pub success: bool,
    pub images: Vec<ImageEntry>,
}
