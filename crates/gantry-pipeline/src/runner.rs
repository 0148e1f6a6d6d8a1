//! Sequential pipeline execution over the persisted step ledger.

use crate::error::{PipelineError, PipelineResult};
use crate::services::CloudServices;
use crate::stages;
use gantry_core::{
    global_credentials_path, Arch, GantryConfig, MetricsOutputs, RunLedger, StepId, Workspace,
};
use std::path::PathBuf;
use tracing::info;

/// Progress notification for one pipeline step.
#[derive(Debug, Clone, Copy)]
pub enum StepEvent {
    Started { step: StepId },
    /// The ledger already records this step; it will not run again.
    Skipped { step: StepId },
    Completed { step: StepId },
}

/// Receives step progress while the pipeline runs.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: StepEvent);
}

/// Sink that swallows every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ProgressSink for SilentSink {
    fn on_event(&self, _event: StepEvent) {}
}

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Keep existing ledger records and skip the steps they cover. A fresh
    /// run clears the ledger first.
    pub resume: bool,
    /// Credential cache removed during environment preparation.
    pub credentials_path: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { resume: false, credentials_path: global_credentials_path() }
    }
}

fn missing(step: StepId, command: &str) -> PipelineError {
    PipelineError::MissingStepOutput { step: step.key(), command: command.to_string() }
}

/// Runs the pipeline start to finish, stopping at the first failing step.
///
/// Every completed step is recorded and the ledger saved before the next one
/// starts, so an interrupted run resumes from the step that failed. Skipped
/// steps feed their recorded outputs to the steps that follow.
pub async fn run_pipeline(
    workspace: &Workspace,
    config: &GantryConfig,
    services: &CloudServices,
    options: &RunOptions,
    progress: &dyn ProgressSink,
) -> PipelineResult<RunLedger> {
    config.validate()?;
    workspace.create_all()?;

    let ledger_path = workspace.ledger_path();
    let mut ledger = RunLedger::load(&ledger_path)?;
    if !options.resume {
        // Persisted immediately: a failure before the first step completes
        // must not leave the previous run's records on disk.
        ledger.reset();
        ledger.save(&ledger_path)?;
    }

    let identity = if ledger.is_complete(StepId::Prepare) {
        progress.on_event(StepEvent::Skipped { step: StepId::Prepare });
        ledger.identity()?.ok_or_else(|| missing(StepId::Prepare, "gantry prepare"))?
    } else {
        progress.on_event(StepEvent::Started { step: StepId::Prepare });
        let outputs = stages::prepare_environment(services, &options.credentials_path).await?;
        ledger.record(StepId::Prepare, &outputs)?;
        ledger.save(&ledger_path)?;
        progress.on_event(StepEvent::Completed { step: StepId::Prepare });
        outputs.identity
    };

    let needs_build =
        Arch::ALL.into_iter().any(|arch| !ledger.is_complete(StepId::BuildImage(arch)));
    if needs_build {
        let prepared =
            stages::prepare_build(&identity, services, &config.image, workspace).await?;
        for arch in Arch::ALL {
            let step = StepId::BuildImage(arch);
            if ledger.is_complete(step) {
                progress.on_event(StepEvent::Skipped { step });
                continue;
            }
            progress.on_event(StepEvent::Started { step });
            let outputs =
                stages::publish_variant(services, &config.image, &prepared, arch).await?;
            ledger.record(step, &outputs)?;
            ledger.save(&ledger_path)?;
            progress.on_event(StepEvent::Completed { step });
        }
    } else {
        for arch in Arch::ALL {
            progress.on_event(StepEvent::Skipped { step: StepId::BuildImage(arch) });
        }
    }

    let dataset = if ledger.is_complete(StepId::StageDataset) {
        progress.on_event(StepEvent::Skipped { step: StepId::StageDataset });
        ledger.dataset()?.ok_or_else(|| missing(StepId::StageDataset, "gantry stage-data"))?
    } else {
        progress.on_event(StepEvent::Started { step: StepId::StageDataset });
        let outputs = stages::stage_dataset(&identity, services, &config.dataset, workspace).await?;
        ledger.record(StepId::StageDataset, &outputs)?;
        ledger.save(&ledger_path)?;
        progress.on_event(StepEvent::Completed { step: StepId::StageDataset });
        outputs
    };

    let training = if ledger.is_complete(StepId::Train) {
        progress.on_event(StepEvent::Skipped { step: StepId::Train });
        ledger.training()?.ok_or_else(|| missing(StepId::Train, "gantry train"))?
    } else {
        let arch = config.training.arch;
        let image = ledger
            .image(arch)?
            .ok_or_else(|| missing(StepId::BuildImage(arch), "gantry build-images"))?;
        progress.on_event(StepEvent::Started { step: StepId::Train });
        let outputs = stages::run_training(
            &identity,
            services,
            &config.training,
            &config.image.name,
            &image.remote_tag,
            &dataset.location,
        )
        .await?;
        ledger.record(StepId::Train, &outputs)?;
        ledger.save(&ledger_path)?;
        progress.on_event(StepEvent::Completed { step: StepId::Train });
        outputs
    };

    if ledger.is_complete(StepId::FetchMetrics) {
        progress.on_event(StepEvent::Skipped { step: StepId::FetchMetrics });
    } else {
        progress.on_event(StepEvent::Started { step: StepId::FetchMetrics });
        let rows =
            stages::fetch_job_metrics(services, &config.training.metric_rules, &training.job_name)
                .await?;
        let outputs =
            MetricsOutputs { job_name: training.job_name.clone(), rows: rows.len() as u64 };
        ledger.record(StepId::FetchMetrics, &outputs)?;
        ledger.save(&ledger_path)?;
        progress.on_event(StepEvent::Completed { step: StepId::FetchMetrics });
    }

    let compiled = if ledger.is_complete(StepId::Compile) {
        progress.on_event(StepEvent::Skipped { step: StepId::Compile });
        ledger.compiled()?.ok_or_else(|| missing(StepId::Compile, "gantry compile"))?
    } else {
        progress.on_event(StepEvent::Started { step: StepId::Compile });
        let outputs =
            stages::compile_model(&identity, services, &config.compilation, &training).await?;
        ledger.record(StepId::Compile, &outputs)?;
        ledger.save(&ledger_path)?;
        progress.on_event(StepEvent::Completed { step: StepId::Compile });
        outputs
    };

    if ledger.is_complete(StepId::Deploy) {
        progress.on_event(StepEvent::Skipped { step: StepId::Deploy });
    } else {
        progress.on_event(StepEvent::Started { step: StepId::Deploy });
        let outputs =
            stages::deploy_endpoint(services, &config.serving, &compiled.model_name).await?;
        ledger.record(StepId::Deploy, &outputs)?;
        ledger.save(&ledger_path)?;
        progress.on_event(StepEvent::Completed { step: StepId::Deploy });
    }

    info!("Pipeline complete");
    Ok(ledger)
}
