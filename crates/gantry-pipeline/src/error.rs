//! Error types for pipeline stages.

use gantry_cloud::CloudError;
use gantry_core::CoreError;
use thiserror::Error;

/// Errors surfaced while driving the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Workspace, configuration, or ledger errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Remote-service errors, carrying the platform's own diagnostics
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// I/O errors from local staging work
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compilation requires a recorded, successful training run
    #[error("No successful training run is recorded; run 'gantry train' first")]
    TrainingNotComplete,

    /// A stage needs outputs an earlier step has not produced
    #[error("Step '{step}' has no recorded outputs; run '{command}' first")]
    MissingStepOutput { step: String, command: String },

    /// A metric rule failed to compile or has the wrong group count
    #[error("Metric rule '{name}' is invalid: {reason}")]
    InvalidMetricRule { name: String, reason: String },

    /// A completed job reported no artifact
    #[error("Job '{0}' completed without an artifact location")]
    ArtifactMissing(String),

    /// An artifact location that cannot be reduced to an output directory
    #[error("Artifact location '{0}' has no parent path")]
    InvalidArtifactLocation(String),
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
