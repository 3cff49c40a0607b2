//! Wire types exchanged with gateway clients.
//!
//! Field names follow the JSON shapes existing clients already consume, which
//! is why v1 listings are PascalCase and v2 listings are camelCase.

pub mod image;
pub mod object;
pub mod upload;

/// RFC 3339 UTC timestamps with millisecond precision (`2024-05-01T10:00:00.000Z`).
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize_option<S>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&format(ts)),
            None => serializer.serialize_none(),
        }
    }
}
