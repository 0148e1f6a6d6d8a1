//! Build-images command implementation.

use crate::commands::{session_identity, CommandContext};
use anyhow::Context;
use colored::Colorize;
use gantry_core::{Arch, StepId};
use gantry_pipeline::stages;
use std::path::PathBuf;

/// Build, tag, and push both architecture variants.
///
/// Each pushed variant is recorded immediately, so a failure on the second
/// build leaves the first one's record in place.
pub async fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    let services = ctx.services()?;
    let identity = session_identity(&ctx, &services).await?;

    ctx.workspace.create_all()?;
    let mut ledger = ctx.ledger()?;
    let prepared = stages::prepare_build(&identity, &services, &ctx.config.image, &ctx.workspace)
        .await
        .context("Build preparation failed")?;
    println!("Repository: {}", prepared.repository.uri);

    for arch in Arch::ALL {
        println!("{} {} variant...", "Building".cyan(), arch);
        let outputs = stages::publish_variant(&services, &ctx.config.image, &prepared, arch)
            .await
            .with_context(|| format!("Build failed for the {arch} variant"))?;
        ledger.record(StepId::BuildImage(arch), &outputs)?;
        ctx.save_ledger(&ledger)?;
        println!("  {} {}", "Pushed".green(), outputs.remote_tag);
    }
    Ok(())
}
