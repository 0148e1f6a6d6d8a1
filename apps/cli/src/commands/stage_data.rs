//! Stage-data command implementation.

use crate::commands::{session_identity, CommandContext};
use anyhow::Context;
use colored::Colorize;
use gantry_core::StepId;
use gantry_pipeline::stages;
use std::path::PathBuf;

/// Stage the dataset locally and in the object store.
pub async fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    let services = ctx.services()?;
    let identity = session_identity(&ctx, &services).await?;

    ctx.workspace.create_all()?;
    let outputs =
        stages::stage_dataset(&identity, &services, &ctx.config.dataset, &ctx.workspace)
            .await
            .context("Dataset staging failed")?;

    let mut ledger = ctx.ledger()?;
    ledger.record(StepId::StageDataset, &outputs)?;
    ctx.save_ledger(&ledger)?;

    if outputs.reused {
        println!("{} {}", "Already staged at".yellow(), outputs.location);
    } else {
        println!(
            "{} {} objects to {}",
            "Uploaded".green(),
            outputs.uploaded_objects,
            outputs.location
        );
    }
    println!("  Tree digest: {}", outputs.tree_digest.dimmed());
    Ok(())
}
