//! Teardown command implementation.

use crate::commands::CommandContext;
use anyhow::Context;
use colored::Colorize;
use gantry_core::StepId;
use gantry_pipeline::stages;
use std::path::PathBuf;

/// Delete the serving endpoint and forget the deploy record.
pub async fn execute(config_path: Option<PathBuf>, endpoint: Option<String>) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    let services = ctx.services()?;

    let mut ledger = ctx.ledger()?;
    let name = match endpoint {
        Some(name) => name,
        None => match ledger.endpoint()? {
            Some(deployed) => deployed.endpoint_name,
            None => ctx.config.serving.endpoint_name.clone(),
        },
    };

    stages::delete_endpoint(&services, &name)
        .await
        .with_context(|| format!("Failed to delete endpoint '{name}'"))?;

    ledger.clear(StepId::Deploy);
    ctx.save_ledger(&ledger)?;

    println!("{} endpoint {}", "Deleted".bold().green(), name.bold());
    Ok(())
}
