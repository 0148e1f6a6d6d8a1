//! Deploy command implementation.

use crate::commands::CommandContext;
use anyhow::Context;
use colored::Colorize;
use gantry_core::StepId;
use gantry_pipeline::stages;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Deploy the compiled model to an endpoint and wait until it serves.
pub async fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    let services = ctx.services()?;

    let mut ledger = ctx.ledger()?;
    let compiled = ledger
        .compiled()?
        .context("No compiled model is recorded; run 'gantry compile' first")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Deploying '{}'...", ctx.config.serving.endpoint_name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result =
        stages::deploy_endpoint(&services, &ctx.config.serving, &compiled.model_name).await;
    spinner.finish_and_clear();
    let outputs = result.context("Deployment failed")?;

    ledger.record(StepId::Deploy, &outputs)?;
    ctx.save_ledger(&ledger)?;

    println!("{} {}", "Endpoint in service:".bold().green(), outputs.endpoint_name);
    println!("  Try it: {}", "gantry predict --file <image>".cyan());
    Ok(())
}
