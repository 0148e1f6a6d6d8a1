//! Subcommand implementations.

pub mod build_images;
pub mod compile;
pub mod deploy;
pub mod init;
pub mod metrics;
pub mod predict;
pub mod prepare;
pub mod run;
pub mod stage_data;
pub mod status;
pub mod teardown;
pub mod train;

use anyhow::Context;
use gantry_core::{GantryConfig, RunLedger, SessionIdentity, Workspace};
use gantry_pipeline::CloudServices;
use std::path::PathBuf;

/// Workspace and manifest for one command invocation.
pub(crate) struct CommandContext {
    pub workspace: Workspace,
    pub config: GantryConfig,
}

impl CommandContext {
    /// Resolve from `--config` or by walking up from the current directory.
    pub fn resolve(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let workspace = match &config_path {
            Some(path) => {
                let manifest = path.canonicalize().with_context(|| {
                    format!("Cannot find config file '{}'", path.display())
                })?;
                let root =
                    manifest.parent().context("Config file has no parent directory")?;
                Workspace::new(root)
            }
            None => {
                let cwd =
                    std::env::current_dir().context("Cannot determine current directory")?;
                Workspace::discover(&cwd).context(
                    "No gantry.toml found here or in any parent directory; run 'gantry init' first",
                )?
            }
        };

        let config = GantryConfig::load_from_file(&workspace.manifest_path())
            .with_context(|| format!("Failed to load {}", workspace.manifest_path().display()))?;
        config.validate().context("Invalid configuration")?;
        Ok(Self { workspace, config })
    }

    pub fn ledger(&self) -> anyhow::Result<RunLedger> {
        RunLedger::load(&self.workspace.ledger_path())
            .context("Failed to read the pipeline ledger")
    }

    pub fn save_ledger(&self, ledger: &RunLedger) -> anyhow::Result<()> {
        ledger
            .save(&self.workspace.ledger_path())
            .context("Failed to write the pipeline ledger")
    }

    /// Wire the platform services and the local docker CLI.
    pub fn services(&self) -> anyhow::Result<CloudServices> {
        CloudServices::from_config(&self.config.platform)
            .context("Failed to set up platform services")
    }
}

/// Identity from the last `prepare` record, or freshly resolved when the
/// ledger has none.
pub(crate) async fn session_identity(
    ctx: &CommandContext,
    services: &CloudServices,
) -> anyhow::Result<SessionIdentity> {
    if let Some(identity) = ctx.ledger()?.identity()? {
        return Ok(identity);
    }
    services
        .identity
        .resolve()
        .await
        .context("Failed to resolve the platform identity")
}
