//! Common type definitions.
//!
//! - [`IdiomId`]: surrogate key of a persisted idiom card
//! - [`StorageKey`]: validated name of an uploaded image in the blob store

use serde::Serialize;
use std::fmt;

/// Store-assigned, monotonically increasing idiom record identifier
pub type IdiomId = i64;

/// Name an uploaded image is stored under.
///
/// Keys are single flat path segments: whatever directory part a client sends with its filename
/// is dropped, and names that would escape or alias the upload directory are refused. Two uploads
/// with the same name map to the same key and the later one overwrites the earlier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive a key from a client-supplied filename
    pub fn from_filename(filename: &str) -> Option<Self> {
        let base = filename.rsplit(['/', '\\']).next().unwrap_or_default().trim();
        Self::parse(base)
    }

    /// Accept `key` only if it is already a valid flat key
    pub fn parse(key: &str) -> Option<Self> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key.trim() == key
            && !key.contains(['/', '\\'])
            && !key.chars().any(char::is_control);

        valid.then(|| Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_filenames_are_kept() {
        assert_eq!(StorageKey::from_filename("論語.png").unwrap().as_str(), "論語.png");
        assert_eq!(StorageKey::from_filename("scan 01.jpg").unwrap().as_str(), "scan 01.jpg");
    }

    #[test]
    fn test_directories_are_stripped() {
        assert_eq!(StorageKey::from_filename("../../etc/passwd").unwrap().as_str(), "passwd");
        assert_eq!(StorageKey::from_filename("C:\\Users\\me\\idiom.png").unwrap().as_str(), "idiom.png");
    }

    #[test]
    fn test_unusable_names_are_rejected() {
        for name in ["", "   ", ".", "..", "uploads/", "../..", "a\u{0}b", "line\nbreak"] {
            assert!(StorageKey::from_filename(name).is_none(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_requires_flat_key() {
        assert!(StorageKey::parse("photo.png").is_some());
        assert!(StorageKey::parse("dir/photo.png").is_none());
        assert!(StorageKey::parse(" photo.png").is_none());
        assert!(StorageKey::parse("..").is_none());
    }
}
