//! Platform object-store access.

use crate::client::PlatformClient;
use crate::error::CloudResult;
use async_trait::async_trait;
use gantry_core::StorageLocation;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// One stored object under a listed prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    #[serde(default)]
    pub size: u64,
}

/// Bucket/key object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects whose keys start with `prefix`.
    async fn list_prefix(&self, bucket: &str, prefix: &str) -> CloudResult<Vec<ObjectSummary>>;

    /// Store one object.
    async fn put_object(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> CloudResult<()>;
}

/// Upload every file under `root` to `location`, keyed by relative path.
///
/// Path separators are normalized to `/` so keys look the same regardless of
/// the local platform. Returns the number of uploaded objects.
pub async fn upload_tree(
    store: &dyn ObjectStore,
    root: &Path,
    location: &StorageLocation,
) -> CloudResult<u64> {
    let mut uploaded = 0u64;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else { continue };
        let rel_key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let bytes = std::fs::read(entry.path())?;
        store.put_object(&location.bucket, &location.key(&rel_key), bytes).await?;
        uploaded += 1;
    }
    debug!(root = %root.display(), location = %location, uploaded, "uploaded tree");
    Ok(uploaded)
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    objects: Vec<ObjectSummary>,
}

/// Object storage backed by the platform API.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: PlatformClient,
}

impl HttpObjectStore {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn list_prefix(&self, bucket: &str, prefix: &str) -> CloudResult<Vec<ObjectSummary>> {
        let path = format!("/v1/storage/{bucket}/objects?prefix={prefix}");
        let response: ListResponse = self.client.get_json(&path).await?;
        Ok(response.objects)
    }

    async fn put_object(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> CloudResult<()> {
        let path = format!("/v1/storage/{bucket}/objects/{key}");
        self.client.put_bytes(&path, bytes).await
    }
}
