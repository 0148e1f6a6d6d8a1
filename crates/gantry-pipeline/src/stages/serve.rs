//! Endpoint deployment, prediction, and teardown.

use crate::error::PipelineResult;
use crate::services::CloudServices;
use gantry_cloud::{CloudError, EndpointSpec, EndpointState};
use gantry_core::{DeployOutputs, ServingConfig};
use tracing::info;

/// Creates the endpoint for a compiled model and blocks until it serves.
///
/// A Failed terminal state propagates the platform's reason. No automatic
/// cleanup happens on failure; the broken endpoint is left for inspection.
pub async fn deploy_endpoint(
    services: &CloudServices,
    config: &ServingConfig,
    model_name: &str,
) -> PipelineResult<DeployOutputs> {
    let spec = EndpointSpec {
        endpoint_name: config.endpoint_name.clone(),
        model_name: model_name.to_string(),
        instance_type: config.instance_type.clone(),
        instance_count: config.instance_count,
    };
    info!(endpoint = %spec.endpoint_name, model = %model_name, "Creating endpoint");
    services.inference.create_endpoint(&spec).await?;

    let status = services.inference.wait_until_in_service(&config.endpoint_name).await?;
    if status.state != EndpointState::InService {
        return Err(CloudError::JobFailed {
            name: config.endpoint_name.clone(),
            state: status.state.to_string(),
            reason: status.reason.unwrap_or_else(|| "No reason reported".to_string()),
        }
        .into());
    }
    info!(endpoint = %config.endpoint_name, "Endpoint in service");
    Ok(DeployOutputs { endpoint_name: config.endpoint_name.clone() })
}

/// Sends raw image bytes to the endpoint and returns the response body
/// unmodified.
pub async fn predict(
    services: &CloudServices,
    config: &ServingConfig,
    endpoint_name: &str,
    body: Vec<u8>,
) -> PipelineResult<Vec<u8>> {
    Ok(services.inference.predict(endpoint_name, &config.content_type, body).await?)
}

/// Deletes the endpoint.
///
/// Deleting an endpoint that does not exist surfaces the platform's
/// not-found condition rather than succeeding silently.
pub async fn delete_endpoint(services: &CloudServices, endpoint_name: &str) -> PipelineResult<()> {
    services.inference.delete_endpoint(endpoint_name).await?;
    info!(endpoint = %endpoint_name, "Endpoint deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::testing::{self, TestPlatform};

    #[tokio::test]
    async fn deploy_records_spec_and_returns_name() {
        let platform = TestPlatform::new();
        let outputs = deploy_endpoint(
            &platform.services(),
            &testing::config().serving,
            "gantry-classifier-compiled",
        )
        .await
        .unwrap();

        assert_eq!(outputs.endpoint_name, "gantry-classifier-endpoint");
        let endpoints = platform.inference.endpoints.lock().unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].model_name, "gantry-classifier-compiled");
        assert_eq!(endpoints[0].instance_type, "cpu.xlarge");
        assert_eq!(endpoints[0].instance_count, 1);
    }

    #[tokio::test]
    async fn failed_endpoint_propagates_reason() {
        let platform = TestPlatform::new();
        *platform.inference.state.lock().unwrap() = EndpointState::Failed;
        *platform.inference.reason.lock().unwrap() = Some("insufficient capacity".to_string());

        let err = deploy_endpoint(
            &platform.services(),
            &testing::config().serving,
            "gantry-classifier-compiled",
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("insufficient capacity"));
    }

    #[tokio::test]
    async fn predict_passes_bytes_through_unmodified() {
        let platform = TestPlatform::new();
        *platform.inference.response.lock().unwrap() = vec![0xff, 0x00, 0x88, 0x19];

        let response = predict(
            &platform.services(),
            &testing::config().serving,
            "gantry-classifier-endpoint",
            vec![0xde, 0xad],
        )
        .await
        .unwrap();

        assert_eq!(response, vec![0xff, 0x00, 0x88, 0x19]);
        let predictions = platform.inference.predictions.lock().unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].1, "application/x-image");
        assert_eq!(predictions[0].2, vec![0xde, 0xad]);
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let platform = TestPlatform::new();
        let services = platform.services();
        deploy_endpoint(&services, &testing::config().serving, "model").await.unwrap();

        delete_endpoint(&services, "gantry-classifier-endpoint").await.unwrap();
        let err = delete_endpoint(&services, "gantry-classifier-endpoint").await.unwrap_err();
        assert!(matches!(err, PipelineError::Cloud(CloudError::NotFound(_))));
    }
}
