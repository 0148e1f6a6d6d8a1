//! Init command implementation.

use anyhow::{bail, Context};
use colored::Colorize;
use gantry_core::Workspace;
use std::path::PathBuf;

const MANIFEST_TEMPLATE: &str = r#"# Gantry pipeline manifest.
#
# Every stage reads its settings from this file. The platform API token is
# never stored here; export GANTRY_API_TOKEN instead.

[platform]
# Base URL of the managed ML platform API.
base_url = "https://platform.example.com"
# Seconds between polls while waiting on remote jobs.
poll_interval_secs = 15
# Longest time to wait on any single remote job, in seconds.
wait_timeout_secs = 14400

[image]
# Registry repository the training image is pushed to.
name = "gantry-classifier"
version = "1.0"
# Runtime token appended to every image tag.
runtime = "py3"
# URL the build descriptor (Dockerfile) is fetched from.
descriptor_url = "https://builds.example.com/classifier/Dockerfile"
# Registry host the base image is pulled from.
base_registry = "base-images.example.com"

[dataset]
name = "cats-dogs"
# Archive with one directory per class inside.
archive_url = "https://data.example.com/cats-dogs.tar.gz"
# Bucket defaults to the account staging bucket when omitted.
# bucket = "my-bucket"
prefix = "gantry/data/"

[training]
# Image variant the job runs on: "cpu" or "gpu".
arch = "gpu"
instance_type = "gpu.xlarge"
instance_count = 1
epochs = 6
batch_size = 64
output_prefix = "gantry/output/"

# Named rules the platform applies to training logs. Each pattern must
# capture exactly one group: the numeric value.
[[training.metric_rules]]
name = "valid:accuracy"
pattern = 'accuracy=(\S+)'

[compilation]
model_name = "gantry-classifier-compiled"
target_family = "standard-cpu"
input_name = "data"
input_shape = [1, 3, 224, 224]
framework = "mxnet"
framework_version = "1.8"

[serving]
endpoint_name = "gantry-classifier-endpoint"
instance_type = "cpu.xlarge"
instance_count = 1
content_type = "application/x-image"
"#;

/// Scaffold a workspace: the `.gantry` tree plus a commented manifest.
pub fn execute(path: Option<PathBuf>) -> anyhow::Result<()> {
    let root = match path {
        Some(path) => path,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Cannot create directory '{}'", root.display()))?;

    let workspace = Workspace::new(&root);
    if workspace.manifest_path().exists() {
        bail!(
            "A manifest already exists at '{}'; refusing to overwrite it",
            workspace.manifest_path().display()
        );
    }

    workspace.create_all().context("Failed to create the .gantry directory tree")?;
    std::fs::write(workspace.manifest_path(), MANIFEST_TEMPLATE)
        .context("Failed to write gantry.toml")?;

    println!("{}", "Workspace initialized".bold().green());
    println!("  Manifest: {}", workspace.manifest_path().display());
    println!("  State:    {}", workspace.gantry_dir().display());
    println!();
    println!("Next steps:");
    println!("  1. Edit gantry.toml (platform URL, registries, dataset archive)");
    println!("  2. Export GANTRY_API_TOKEN");
    println!("  3. Run {}", "gantry run".cyan());
    Ok(())
}
