//! Predict command implementation.

use crate::commands::CommandContext;
use anyhow::{bail, Context};
use gantry_pipeline::stages;
use std::io::Write;
use std::path::PathBuf;

/// Send one image to the endpoint and write the raw response to stdout.
pub async fn execute(
    config_path: Option<PathBuf>,
    url: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = CommandContext::resolve(config_path)?;

    let body = match (url, file) {
        (Some(url), None) => gantry_cloud::fetch_bytes(&url)
            .await
            .with_context(|| format!("Cannot fetch image from '{url}'"))?,
        (None, Some(path)) => std::fs::read(&path)
            .with_context(|| format!("Cannot read image file '{}'", path.display()))?,
        _ => bail!("Provide exactly one of --url or --file"),
    };

    let services = ctx.services()?;
    let endpoint = match ctx.ledger()?.endpoint()? {
        Some(deployed) => deployed.endpoint_name,
        None => ctx.config.serving.endpoint_name.clone(),
    };

    let response = stages::predict(&services, &ctx.config.serving, &endpoint, body)
        .await
        .context("Prediction failed")?;

    if json {
        let value: serde_json::Value =
            serde_json::from_slice(&response).context("Response is not JSON")?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        // The platform's response body, byte for byte.
        std::io::stdout().write_all(&response)?;
    }
    Ok(())
}
