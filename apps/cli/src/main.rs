//! Gantry CLI - dataset to deployed classifier on the managed ML platform
//!
//! Provides a `gantry` command that drives the five pipeline stages, either
//! one at a time or as a single resumable run over the step ledger.

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{
    build_images, compile, deploy, init, metrics, predict, prepare, run, stage_data, status,
    teardown, train,
};

/// Gantry - image-classification pipeline automation
#[derive(Parser, Debug)]
#[command(
    name = "gantry",
    author,
    version,
    about = "Gantry - dataset to deployed classifier in one pipeline",
    long_about = "Gantry automates an image-classification workflow on a managed ML platform:\nbuild and push training images, stage the dataset, train, compile for the target\nhardware, and serve behind an endpoint. Every step is recorded in a ledger so an\ninterrupted run resumes where it stopped."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Path to gantry.toml (defaults to discovery from the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new workspace
    ///
    /// Creates the .gantry state tree and a commented gantry.toml in the
    /// current directory or at the given path. Refuses to overwrite an
    /// existing manifest.
    Init {
        /// Target path (optional, defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Remove stale credentials and resolve the platform identity
    Prepare,

    /// Build and push both image variants (cpu, gpu)
    BuildImages,

    /// Download, extract, and upload the dataset
    ///
    /// Skips the download when the local copy exists and the upload when the
    /// remote prefix already holds objects.
    StageData,

    /// Submit a training job and wait for it to finish
    Train,

    /// Show metric series for a training job
    Metrics {
        /// Job name (defaults to the last recorded training run)
        #[arg(long)]
        job: Option<String>,

        /// Extract metrics from a saved log file instead of the platform
        #[arg(long, value_name = "FILE")]
        from_logs: Option<PathBuf>,

        /// Output rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile the trained model for the target hardware family
    Compile,

    /// Deploy the compiled model to an endpoint
    Deploy,

    /// Send an image to the endpoint and print the raw response
    Predict {
        /// Fetch the image from a URL
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Read the image from a local file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Pretty-print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the deployed endpoint
    Teardown {
        /// Endpoint to delete (defaults to the last recorded deployment)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Run the whole pipeline in order
    Run {
        /// Skip steps already recorded in the ledger
        #[arg(long)]
        resume: bool,
    },

    /// Show workspace configuration and per-step pipeline state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = if let Some(cmd) = args.command {
        cmd
    } else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Init { path } => init::execute(path)?,
        Command::Prepare => prepare::execute(args.config).await?,
        Command::BuildImages => build_images::execute(args.config).await?,
        Command::StageData => stage_data::execute(args.config).await?,
        Command::Train => train::execute(args.config).await?,
        Command::Metrics { job, from_logs, json } => {
            metrics::execute(args.config, job, from_logs, json).await?;
        }
        Command::Compile => compile::execute(args.config).await?,
        Command::Deploy => deploy::execute(args.config).await?,
        Command::Predict { url, file, json } => {
            predict::execute(args.config, url, file, json).await?;
        }
        Command::Teardown { endpoint } => teardown::execute(args.config, endpoint).await?,
        Command::Run { resume } => run::execute(args.config, resume).await?,
        Command::Status { json } => status::execute(args.config, json)?,
    }

    Ok(())
}
