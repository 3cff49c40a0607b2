//! Key naming for the original/resized image layout.
//!
//! Uploads land under the original prefix; an external resizer writes the
//! derived image under the resized prefix with the same file name. The pairing
//! exists only in the names and is never checked against the bucket.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    original_prefix: String,
    resized_prefix: String,
}

impl KeyLayout {
    pub fn new(original_prefix: impl Into<String>, resized_prefix: impl Into<String>) -> Self {
        Self {
            original_prefix: original_prefix.into(),
            resized_prefix: resized_prefix.into(),
        }
    }

    pub fn original_prefix(&self) -> &str {
        &self.original_prefix
    }

    pub fn resized_prefix(&self) -> &str {
        &self.resized_prefix
    }

    /// `{original_prefix}{millis}-{file_name}`.
    pub fn original_key(&self, file_name: &str, timestamp_millis: i64) -> String {
        format!("{}{}-{}", self.original_prefix, timestamp_millis, file_name)
    }

    /// File name of a resized key, or `None` if the key lies outside the prefix.
    pub fn file_name<'a>(&self, resized_key: &'a str) -> Option<&'a str> {
        resized_key.strip_prefix(self.resized_prefix.as_str())
    }

    /// Key of the original a resized image was presumably derived from.
    pub fn paired_original(&self, file_name: &str) -> String {
        format!("{}{}", self.original_prefix, file_name)
    }
}

/// Trailing path segment of a key, used as the download file name.
pub fn download_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> KeyLayout {
        KeyLayout::new("original/", "resized/")
    }

    #[test]
    fn original_key_is_timestamped_under_prefix() {
        assert_eq!(
            layout().original_key("f.png", 1_714_557_600_123),
            "original/1714557600123-f.png"
        );
    }

    #[test]
    fn file_name_strips_resized_prefix() {
        let layout = layout();
        assert_eq!(layout.file_name("resized/1-f.png"), Some("1-f.png"));
        assert_eq!(layout.file_name("resized/"), Some(""));
        assert_eq!(layout.file_name("original/1-f.png"), None);
    }

    #[test]
    fn paired_original_swaps_prefix() {
        let layout = layout();
        let name = layout.file_name("resized/1-f.png").unwrap();
        assert_eq!(layout.paired_original(name), "original/1-f.png");
    }

    #[test]
    fn download_name_takes_last_segment() {
        assert_eq!(download_name("original/123-f.png"), "123-f.png");
        assert_eq!(download_name("f.png"), "f.png");
        assert_eq!(download_name("dir/"), "");
    }
}
