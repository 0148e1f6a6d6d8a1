//! Train command implementation.

use crate::commands::{session_identity, CommandContext};
use anyhow::Context;
use colored::Colorize;
use gantry_core::StepId;
use gantry_pipeline::stages;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Submit a training job and block until it reaches a terminal state.
pub async fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    let services = ctx.services()?;
    let identity = session_identity(&ctx, &services).await?;

    let mut ledger = ctx.ledger()?;
    let arch = ctx.config.training.arch;
    let image = ledger
        .image(arch)?
        .with_context(|| format!("No {arch} image is recorded; run 'gantry build-images' first"))?;
    let dataset = ledger
        .dataset()?
        .context("No staged dataset is recorded; run 'gantry stage-data' first")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Waiting for the training job...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = stages::run_training(
        &identity,
        &services,
        &ctx.config.training,
        &ctx.config.image.name,
        &image.remote_tag,
        &dataset.location,
    )
    .await;
    spinner.finish_and_clear();
    let outputs = result.context("Training failed")?;

    ledger.record(StepId::Train, &outputs)?;
    ctx.save_ledger(&ledger)?;

    println!("{} {}", "Training complete:".bold().green(), outputs.job_name);
    println!("  Artifact: {}", outputs.artifact_location);
    Ok(())
}
