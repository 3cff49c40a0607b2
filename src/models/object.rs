//! Represents an object (file) stored in the bucket.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry of a bucket listing.
///
/// Serialized as-is in v1 `list-objects` responses, hence the PascalCase
/// field names borrowed from the S3 listing format.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Size in bytes.
    pub size: u64,

    /// Timestamp when object was last modified.
    #[serde(
        serialize_with = "super::timestamp::serialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,

    /// Entity tag reported by the backend, quotes included.
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl ObjectSummary {
    /// Zero-byte keys are directory placeholders, not real objects.
    pub fn is_placeholder(&self) -> bool {
        self.size == 0
    }
}

/// Body of `GET /api/s3/list-objects`.
#[derive(Serialize, Debug)]
pub struct ObjectListResponse {
    pub success: bool,
    pub objects: Vec<ObjectSummary>,
}
