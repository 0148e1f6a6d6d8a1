//! Gantry Core
//!
//! Local state and configuration for the Gantry pipeline:
//! - Workspace manifest and directory layout (`Workspace`, `GantryConfig`)
//! - Resolved platform identity for a run (`SessionIdentity`)
//! - Object-store coordinates (`StorageLocation`)
//! - The persisted step ledger that makes re-runs resumable (`RunLedger`)

pub mod config;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod location;
pub mod workspace;

pub use config::{
    Arch, CompilationConfig, DatasetConfig, GantryConfig, ImageConfig, MetricRuleConfig,
    PlatformConfig, ServingConfig, TrainingConfig,
};
pub use error::{CoreError, CoreResult};
pub use identity::SessionIdentity;
pub use ledger::{
    BuildOutputs, CompileOutputs, DatasetOutputs, DeployOutputs, MetricsOutputs, PrepareOutputs,
    RunLedger, StepId, StepRecord, TrainOutputs,
};
pub use location::StorageLocation;
pub use workspace::{global_credentials_path, Workspace};
