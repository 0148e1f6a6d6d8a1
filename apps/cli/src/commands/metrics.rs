//! Metrics command implementation.

use crate::commands::CommandContext;
use anyhow::Context;
use colored::Colorize;
use comfy_table::Table;
use gantry_cloud::MetricPoint;
use gantry_pipeline::stages;
use std::path::PathBuf;

/// Show metric rows for a training job, fetched from the platform or
/// extracted from a saved log file.
pub async fn execute(
    config_path: Option<PathBuf>,
    job: Option<String>,
    from_logs: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;

    let rows = if let Some(log_path) = from_logs {
        let text = std::fs::read_to_string(&log_path)
            .with_context(|| format!("Cannot read log file '{}'", log_path.display()))?;
        let rules = stages::compile_rules(&ctx.config.training.metric_rules)?;
        stages::extract_series(&rules, &text)
    } else {
        let services = ctx.services()?;
        let job_name = match job {
            Some(name) => name,
            None => ctx
                .ledger()?
                .training()?
                .context("No training run is recorded; pass --job or run 'gantry train' first")?
                .job_name,
        };
        stages::fetch_job_metrics(&services, &ctx.config.training.metric_rules, &job_name)
            .await
            .context("Metric fetch failed")?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("{}", "No metric rows".yellow());
        return Ok(());
    }
    print_table(&rows);
    Ok(())
}

fn print_table(rows: &[MetricPoint]) {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Timestamp", "Value"]);
    for row in rows {
        table.add_row(vec![
            row.metric.clone(),
            row.timestamp.map_or_else(|| "-".to_string(), |t| t.to_rfc3339()),
            row.value.to_string(),
        ]);
    }
    println!("{table}");
}
