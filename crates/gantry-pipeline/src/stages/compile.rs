//! Model compilation against a target hardware family.

use crate::error::{PipelineError, PipelineResult};
use crate::services::CloudServices;
use crate::stages::timestamped_name;
use gantry_cloud::{CloudError, CompilationRequest};
use gantry_core::{
    CompilationConfig, CompileOutputs, RunLedger, SessionIdentity, StorageLocation, TrainOutputs,
};
use tracing::info;

/// Returns the recorded training outputs, or the gate error when no
/// successful run exists. Compilation never proceeds past a failed or
/// missing training step.
pub fn require_training(ledger: &RunLedger) -> PipelineResult<TrainOutputs> {
    ledger.training()?.ok_or(PipelineError::TrainingNotComplete)
}

/// Compiles the trained artifact for the configured hardware family.
///
/// Output lands in the parent directory of the artifact's own path, and the
/// compiled model carries the fixed name from the configuration.
pub async fn compile_model(
    identity: &SessionIdentity,
    services: &CloudServices,
    config: &CompilationConfig,
    training: &TrainOutputs,
) -> PipelineResult<CompileOutputs> {
    let artifact = StorageLocation::parse(&training.artifact_location)?;
    let output = artifact.parent().ok_or_else(|| {
        PipelineError::InvalidArtifactLocation(training.artifact_location.clone())
    })?;

    let job_name = timestamped_name(&config.model_name);
    let request = CompilationRequest {
        job_name: job_name.clone(),
        model_name: config.model_name.clone(),
        artifact_location: training.artifact_location.clone(),
        output_location: output.uri(),
        role: identity.execution_role.clone(),
        target_family: config.target_family.clone(),
        framework: config.framework.clone(),
        framework_version: config.framework_version.clone(),
        input_name: config.input_name.clone(),
        input_shape: config.input_shape.clone(),
    };
    info!(job = %job_name, target = %config.target_family, "Submitting compilation job");
    services.compiler.submit(&request).await?;

    let status = services.compiler.wait_until_terminal(&job_name).await?;
    if !status.state.is_success() {
        return Err(CloudError::JobFailed {
            name: job_name,
            state: status.state.to_string(),
            reason: status.reason.unwrap_or_else(|| "No reason reported".to_string()),
        }
        .into());
    }

    let output_location = status.output_location.unwrap_or_else(|| output.uri());
    info!(model = %config.model_name, output = %output_location, "Compilation complete");
    Ok(CompileOutputs { model_name: config.model_name.clone(), output_location })
}
