//! Plain HTTP fetches: build descriptors and dataset archives.

use crate::error::{CloudError, CloudResult};
use std::path::Path;
use tracing::debug;

async fn checked_get(url: &str) -> CloudResult<reqwest::Response> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(CloudError::Api { status: status.as_u16(), message });
    }
    Ok(response)
}

/// Fetch a small text document, such as a build descriptor.
pub async fn fetch_text(url: &str) -> CloudResult<String> {
    debug!(url = %url, "fetching text");
    Ok(checked_get(url).await?.text().await?)
}

/// Fetch a document as raw bytes, such as a sample image.
pub async fn fetch_bytes(url: &str) -> CloudResult<Vec<u8>> {
    debug!(url = %url, "fetching bytes");
    Ok(checked_get(url).await?.bytes().await?.to_vec())
}

/// Download `url` to `dest`, creating parent directories. Returns bytes written.
pub async fn download(url: &str, dest: &Path) -> CloudResult<u64> {
    debug!(url = %url, dest = %dest.display(), "downloading");
    let bytes = checked_get(url).await?.bytes().await?;
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, &bytes)?;
    Ok(bytes.len() as u64)
}
