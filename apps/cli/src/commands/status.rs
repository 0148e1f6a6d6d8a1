//! Status command implementation.

use crate::commands::CommandContext;
use colored::Colorize;
use comfy_table::Table;
use gantry_core::StepId;
use serde_json::json;
use std::path::PathBuf;

/// Show the workspace, the active configuration, and the recorded pipeline state.
pub fn execute(config_path: Option<PathBuf>, json_output: bool) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;
    if json_output { execute_json(&ctx) } else { execute_human(&ctx) }
}

fn execute_human(ctx: &CommandContext) -> anyhow::Result<()> {
    let ledger = ctx.ledger()?;

    println!("{}", "Gantry Status".bold().cyan());
    println!();

    println!("{}", "Workspace:".bold());
    println!("  Root: {}", ctx.workspace.root().display().to_string().green());
    println!("  Ledger: {}", ctx.workspace.ledger_path().display());
    println!();

    println!("{}", "Configuration:".bold());
    println!("  Platform: {}", ctx.config.platform.base_url);
    println!("  Image: {}:{}", ctx.config.image.name, ctx.config.image.version);
    println!("  Dataset: {}", ctx.config.dataset.name);
    println!("  Endpoint: {}", ctx.config.serving.endpoint_name);
    println!();

    println!("{}", "Pipeline:".bold());
    let mut table = Table::new();
    table.set_header(vec!["Step", "State", "Completed"]);
    let mut done = 0usize;
    for step in StepId::pipeline() {
        match ledger.record_for(step) {
            Some(record) => {
                done += 1;
                table.add_row(vec![
                    step.title(),
                    "complete".to_string(),
                    record.completed_at.to_rfc3339(),
                ]);
            }
            None => {
                table.add_row(vec![step.title(), "pending".to_string(), "-".to_string()]);
            }
        }
    }
    println!("{table}");
    println!();

    if done == StepId::pipeline().len() {
        if let Some(deployed) = ledger.endpoint()? {
            println!("Endpoint in service: {}", deployed.endpoint_name.bold().green());
        }
    } else if done == 0 {
        println!("Start the pipeline with {}", "gantry run".cyan());
    } else {
        println!("Continue with {}", "gantry run --resume".cyan());
    }
    Ok(())
}

fn execute_json(ctx: &CommandContext) -> anyhow::Result<()> {
    let ledger = ctx.ledger()?;

    let steps: Vec<serde_json::Value> = StepId::pipeline()
        .iter()
        .map(|&step| {
            let record = ledger.record_for(step);
            json!({
                "step": step.key(),
                "title": step.title(),
                "complete": record.is_some(),
                "completed_at": record.map(|r| r.completed_at.to_rfc3339()),
            })
        })
        .collect();

    let status = json!({
        "workspace": ctx.workspace.root().display().to_string(),
        "platform": ctx.config.platform.base_url,
        "image": format!("{}:{}", ctx.config.image.name, ctx.config.image.version),
        "dataset": ctx.config.dataset.name,
        "endpoint": ctx.config.serving.endpoint_name,
        "steps": steps,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
