//! Environment preparation: drop stale local credentials, resolve identity.

use crate::error::PipelineResult;
use crate::services::CloudServices;
use gantry_core::PrepareOutputs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Clears the cached credential file and resolves the session identity.
///
/// A missing credential file is the normal case and not an error; any other
/// filesystem failure aborts the run. The identity call is made only after
/// the stale file is gone, so later stages never see pre-refresh credentials.
pub async fn prepare_environment(
    services: &CloudServices,
    credentials_path: &Path,
) -> PipelineResult<PrepareOutputs> {
    let removed_credentials = match std::fs::remove_file(credentials_path) {
        Ok(()) => {
            info!(path = %credentials_path.display(), "Removed stale credential cache");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %credentials_path.display(), "No credential cache present");
            false
        }
        Err(e) => return Err(e.into()),
    };

    let identity = services.identity.resolve().await?;
    info!(
        account = %identity.account_id,
        region = %identity.region,
        bucket = %identity.default_bucket,
        "Resolved platform identity"
    );

    Ok(PrepareOutputs { identity, removed_credentials })
}
