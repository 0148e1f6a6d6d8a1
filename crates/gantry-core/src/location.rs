//! Object-store coordinates.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Scheme used when rendering locations as URIs.
pub const STORE_SCHEME: &str = "store";

/// A bucket + key-prefix pair in the platform object store.
///
/// Prefixes are stored without a leading slash; a trailing slash is preserved
/// so that directory-like locations render as `store://bucket/path/to/dir/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub bucket: String,
    pub prefix: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            bucket: bucket.into(),
            prefix: prefix.trim_start_matches('/').to_string(),
        }
    }

    /// Full object key for `name` under this location's prefix.
    pub fn key(&self, name: &str) -> String {
        let name = name.trim_start_matches('/');
        if self.prefix.is_empty() {
            return name.to_string();
        }
        if self.prefix.ends_with('/') {
            format!("{}{}", self.prefix, name)
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    /// Location one path segment up, or `None` at the bucket root.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        let parent = match trimmed.rfind('/') {
            Some(idx) => &trimmed[..idx],
            None => "",
        };
        Some(Self::new(self.bucket.clone(), parent))
    }

    /// Render as a `store://bucket/prefix` URI.
    pub fn uri(&self) -> String {
        format!("{STORE_SCHEME}://{}/{}", self.bucket, self.prefix)
    }

    /// Parse a `store://bucket/prefix` URI back into a location.
    pub fn parse(uri: &str) -> CoreResult<Self> {
        let rest = uri
            .strip_prefix("store://")
            .ok_or_else(|| CoreError::InvalidLocation(uri.to_string()))?;
        let (bucket, prefix) = match rest.split_once('/') {
            Some((bucket, prefix)) => (bucket, prefix),
            None => (rest, ""),
        };
        if bucket.is_empty() {
            return Err(CoreError::InvalidLocation(uri.to_string()));
        }
        Ok(Self::new(bucket, prefix))
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_keeps_trailing_slash() {
        let loc = StorageLocation::new("bucket", "proj/data/");
        assert_eq!(loc.uri(), "store://bucket/proj/data/");
    }

    #[test]
    fn test_key_joins_with_single_slash() {
        assert_eq!(StorageLocation::new("b", "proj/data/").key("a/1.jpg"), "proj/data/a/1.jpg");
        assert_eq!(StorageLocation::new("b", "proj/data").key("a/1.jpg"), "proj/data/a/1.jpg");
        assert_eq!(StorageLocation::new("b", "").key("1.jpg"), "1.jpg");
    }

    #[test]
    fn test_parse_round_trip() {
        let loc = StorageLocation::parse("store://bucket/proj/output/model.tar.gz").unwrap();
        assert_eq!(loc.bucket, "bucket");
        assert_eq!(loc.prefix, "proj/output/model.tar.gz");
        assert_eq!(loc.uri(), "store://bucket/proj/output/model.tar.gz");
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(StorageLocation::parse("s3://bucket/key").is_err());
        assert!(StorageLocation::parse("store://").is_err());
    }

    #[test]
    fn test_parent_strips_last_segment() {
        let artifact = StorageLocation::parse("store://b/out/job-1/model.tar.gz").unwrap();
        let parent = artifact.parent().unwrap();
        assert_eq!(parent.uri(), "store://b/out/job-1");

        let top = StorageLocation::new("b", "out");
        assert_eq!(top.parent().unwrap().prefix, "");
        assert!(StorageLocation::new("b", "").parent().is_none());
    }

    #[test]
    fn test_leading_slash_normalized() {
        let loc = StorageLocation::new("b", "/proj/data/");
        assert_eq!(loc.uri(), "store://b/proj/data/");
    }
}
