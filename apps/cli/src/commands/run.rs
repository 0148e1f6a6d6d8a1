//! Run command implementation.

use crate::commands::CommandContext;
use anyhow::{bail, Context};
use colored::Colorize;
use gantry_core::{global_credentials_path, StepId};
use gantry_pipeline::{run_pipeline, ProgressSink, RunOptions, StepEvent};
use std::path::PathBuf;

/// Prints each pipeline step to the terminal as it starts and finishes.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_event(&self, event: StepEvent) {
        match event {
            StepEvent::Started { step } => {
                println!("{} {}...", "▸".cyan(), step.title());
            }
            StepEvent::Skipped { step } => {
                println!("{} {} {}", "∙".dimmed(), step.title(), "(recorded)".dimmed());
            }
            StepEvent::Completed { step } => {
                println!("{} {}", "✓".green(), step.title());
            }
        }
    }
}

/// Execute the full pipeline, optionally resuming from the recorded ledger.
pub async fn execute(config_path: Option<PathBuf>, resume: bool) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;

    let ledger = ctx.ledger()?;
    if !resume && StepId::pipeline().iter().all(|&step| ledger.is_complete(step)) {
        bail!(
            "A completed run is already recorded at '{}'.\n\
             Use 'gantry run --resume' to confirm it, 'gantry status' to inspect it,\n\
             or delete the ledger file to start over.",
            ctx.workspace.ledger_path().display()
        );
    }

    let services = ctx.services()?;
    let options = RunOptions {
        resume,
        credentials_path: global_credentials_path(),
    };

    let ledger = run_pipeline(&ctx.workspace, &ctx.config, &services, &options, &ConsoleSink)
        .await
        .context("Pipeline failed")?;

    println!();
    println!("{}", "Pipeline complete".bold().green());
    if let Some(deployed) = ledger.endpoint()? {
        println!("Endpoint in service: {}", deployed.endpoint_name.bold());
        println!("Try it: {}", "gantry predict --file <image>".cyan());
    }
    Ok(())
}
