//! Compile command implementation.

use crate::commands::{session_identity, CommandContext};
use anyhow::Context;
use colored::Colorize;
use gantry_core::StepId;
use gantry_pipeline::stages;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Compile the last trained model for the configured hardware family.
///
/// Requires a successful training run in the ledger; the compiler is never
/// invoked without one.
pub async fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    let services = ctx.services()?;
    let identity = session_identity(&ctx, &services).await?;

    let mut ledger = ctx.ledger()?;
    let training = stages::require_training(&ledger)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Waiting for the compilation job...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result =
        stages::compile_model(&identity, &services, &ctx.config.compilation, &training).await;
    spinner.finish_and_clear();
    let outputs = result.context("Compilation failed")?;

    ledger.record(StepId::Compile, &outputs)?;
    ctx.save_ledger(&ledger)?;

    println!("{} {}", "Compiled model:".bold().green(), outputs.model_name);
    println!("  Output: {}", outputs.output_location);
    Ok(())
}
