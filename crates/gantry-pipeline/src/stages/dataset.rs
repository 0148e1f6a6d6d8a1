//! Dataset staging: local download/extract, remote upload-or-reuse.

use crate::error::PipelineResult;
use crate::services::CloudServices;
use flate2::read::GzDecoder;
use gantry_cloud::{download, upload_tree};
use gantry_core::{DatasetConfig, DatasetOutputs, SessionIdentity, StorageLocation, Workspace};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Stages the dataset locally and remotely.
///
/// The local side is idempotent by directory presence: an existing dataset
/// directory skips download and extraction entirely. The remote side is
/// idempotent by prefix presence: one object or more under the prefix reuses
/// the location without uploading anything. Neither side compares content.
pub async fn stage_dataset(
    identity: &SessionIdentity,
    services: &CloudServices,
    config: &DatasetConfig,
    workspace: &Workspace,
) -> PipelineResult<DatasetOutputs> {
    let local_dir = workspace.data_dir().join(&config.name);
    if local_dir.exists() {
        debug!(dir = %local_dir.display(), "Local dataset already present");
    } else {
        std::fs::create_dir_all(&local_dir)?;
        let archive_path = workspace.data_dir().join(format!("{}.tar.gz", config.name));
        info!(url = %config.archive_url, "Downloading dataset archive");
        download(&config.archive_url, &archive_path).await?;
        extract_archive(&archive_path, &local_dir)?;
        std::fs::remove_file(&archive_path)?;
        info!(dir = %local_dir.display(), "Extracted dataset");
    }

    let bucket = config.bucket.clone().unwrap_or_else(|| identity.default_bucket.clone());
    let location = StorageLocation::new(&bucket, &config.prefix);

    let existing = services.storage.list_prefix(&location.bucket, &location.prefix).await?;
    let (uploaded_objects, reused) = if existing.is_empty() {
        info!(location = %location, "Uploading dataset tree");
        let count = upload_tree(services.storage.as_ref(), &local_dir, &location).await?;
        (count, false)
    } else {
        info!(
            location = %location,
            objects = existing.len(),
            "Remote prefix already populated, skipping upload"
        );
        (0, true)
    };

    Ok(DatasetOutputs {
        location: location.uri(),
        uploaded_objects,
        tree_digest: tree_digest(&local_dir)?,
        reused,
    })
}

fn extract_archive(archive: &Path, dest: &Path) -> PipelineResult<()> {
    let file = std::fs::File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(dest)?;
    Ok(())
}

/// SHA-256 over relative path and content of every file under `root`, in
/// sorted walk order. Recorded in the ledger for operator inspection; never
/// consulted when deciding whether to re-upload.
fn tree_digest(root: &Path) -> PipelineResult<String> {
    let mut hasher = Sha256::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else { continue };
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update(std::fs::read(entry.path())?);
    }
    Ok(hex::encode(hasher.finalize()))
}
