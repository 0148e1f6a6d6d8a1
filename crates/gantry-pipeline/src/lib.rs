//! Gantry Pipeline
//!
//! The five pipeline stages and the runner that sequences them:
//! - Environment preparation (credential cleanup + identity resolution)
//! - Image build & publish (two hardware variants)
//! - Dataset staging (download, extract, upload-if-absent)
//! - Training and metric retrieval
//! - Compilation and serving
//!
//! Stages are plain async functions over the [`CloudServices`] seams; the
//! runner adds ledger bookkeeping so interrupted runs can resume.

pub mod error;
pub mod runner;
pub mod services;
pub mod stages;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{PipelineError, PipelineResult};
pub use runner::{run_pipeline, ProgressSink, RunOptions, SilentSink, StepEvent};
pub use services::CloudServices;
