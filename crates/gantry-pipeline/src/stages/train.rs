//! Training orchestration: request construction, submission, blocking wait.

use crate::error::{PipelineError, PipelineResult};
use crate::services::CloudServices;
use crate::stages::timestamped_name;
use gantry_cloud::{CloudError, TrainingJobRequest};
use gantry_core::{SessionIdentity, StorageLocation, TrainOutputs, TrainingConfig};
use std::collections::BTreeMap;
use tracing::info;

/// Builds the submission request.
///
/// The hyperparameter map carries exactly `epochs` and `batch-size`; the
/// training container accepts nothing else.
fn build_request(
    identity: &SessionIdentity,
    config: &TrainingConfig,
    image: &str,
    input_location: &str,
    job_name: String,
) -> TrainingJobRequest {
    let mut hyperparameters = BTreeMap::new();
    hyperparameters.insert("epochs".to_string(), config.epochs.to_string());
    hyperparameters.insert("batch-size".to_string(), config.batch_size.to_string());

    let output_location = StorageLocation::new(&identity.default_bucket, &config.output_prefix);
    TrainingJobRequest {
        job_name,
        image: image.to_string(),
        role: identity.execution_role.clone(),
        input_location: input_location.to_string(),
        output_location: output_location.uri(),
        instance_type: config.instance_type.clone(),
        instance_count: config.instance_count,
        hyperparameters,
        metric_rules: config.metric_rules.clone(),
    }
}

/// Submits a training job under a freshly generated name and blocks until it
/// reaches a terminal state.
///
/// Failed and stopped jobs propagate the platform's reason. A job that
/// completes without reporting an artifact location is malformed; nothing
/// downstream could consume it.
pub async fn run_training(
    identity: &SessionIdentity,
    services: &CloudServices,
    config: &TrainingConfig,
    base_name: &str,
    image: &str,
    input_location: &str,
) -> PipelineResult<TrainOutputs> {
    let job_name = timestamped_name(base_name);
    let request = build_request(identity, config, image, input_location, job_name.clone());
    info!(job = %job_name, image = %image, "Submitting training job");
    services.training.submit(&request).await?;

    let status = services.training.wait_until_terminal(&job_name).await?;
    if !status.state.is_success() {
        return Err(CloudError::JobFailed {
            name: job_name,
            state: status.state.to_string(),
            reason: status.reason.unwrap_or_else(|| "No reason reported".to_string()),
        }
        .into());
    }

    let artifact_location = status
        .artifact_location
        .ok_or_else(|| PipelineError::ArtifactMissing(job_name.clone()))?;
    info!(job = %job_name, artifact = %artifact_location, "Training complete");
    Ok(TrainOutputs { job_name, artifact_location })
}
