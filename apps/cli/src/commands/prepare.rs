//! Prepare command implementation.

use crate::commands::CommandContext;
use anyhow::Context;
use colored::Colorize;
use comfy_table::Table;
use gantry_core::{global_credentials_path, StepId};
use gantry_pipeline::stages;
use std::path::PathBuf;

/// Environment preparation: clear the credential cache, resolve identity.
pub async fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    let services = ctx.services()?;

    let outputs = stages::prepare_environment(&services, &global_credentials_path())
        .await
        .context("Environment preparation failed")?;

    ctx.workspace.create_all()?;
    let mut ledger = ctx.ledger()?;
    ledger.record(StepId::Prepare, &outputs)?;
    ctx.save_ledger(&ledger)?;

    if outputs.removed_credentials {
        println!("Removed stale credential cache");
    }
    println!("{}", "Session identity".bold());
    let mut table = Table::new();
    table.set_header(vec!["Account", "Region", "Bucket", "Role"]);
    table.add_row(vec![
        outputs.identity.account_id.clone(),
        outputs.identity.region.clone(),
        outputs.identity.default_bucket.clone(),
        outputs.identity.execution_role.clone(),
    ]);
    println!("{table}");
    Ok(())
}
