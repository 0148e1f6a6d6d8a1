//! Endpoint deployment and invocation.

use crate::client::PlatformClient;
use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// Lifecycle states of a serving endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointState {
    Creating,
    InService,
    Failed,
    Deleting,
}

impl EndpointState {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointState::Creating => "creating",
            EndpointState::InService => "in_service",
            EndpointState::Failed => "failed",
            EndpointState::Deleting => "deleting",
        }
    }
}

impl std::fmt::Display for EndpointState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the platform needs to stand up an endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointSpec {
    pub endpoint_name: String,
    /// Compiled model the endpoint serves.
    pub model_name: String,
    pub instance_type: String,
    pub instance_count: u32,
}

/// Point-in-time view of an endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub endpoint_name: String,
    pub state: EndpointState,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Endpoint lifecycle and invocation.
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn create_endpoint(&self, spec: &EndpointSpec) -> CloudResult<()>;

    async fn describe_endpoint(&self, endpoint_name: &str) -> CloudResult<EndpointStatus>;

    /// Send a raw payload and return the raw response body, unmodified.
    async fn predict(
        &self,
        endpoint_name: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> CloudResult<Vec<u8>>;

    /// Tear the endpoint down. Deleting an endpoint that does not exist is a
    /// [`CloudError::NotFound`].
    async fn delete_endpoint(&self, endpoint_name: &str) -> CloudResult<()>;

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(15)
    }

    fn wait_timeout(&self) -> Duration {
        Duration::from_secs(3600)
    }

    /// Poll until the endpoint is in service or has failed.
    async fn wait_until_in_service(&self, endpoint_name: &str) -> CloudResult<EndpointStatus> {
        let started = Instant::now();
        loop {
            let status = self.describe_endpoint(endpoint_name).await?;
            if matches!(status.state, EndpointState::InService | EndpointState::Failed) {
                return Ok(status);
            }
            if started.elapsed() >= self.wait_timeout() {
                return Err(CloudError::WaitTimeout {
                    name: endpoint_name.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            debug!(endpoint = %endpoint_name, state = %status.state, "waiting for endpoint");
            sleep(self.poll_interval()).await;
        }
    }
}

/// Endpoints backed by the platform API.
#[derive(Debug, Clone)]
pub struct HttpInferenceService {
    client: PlatformClient,
}

impl HttpInferenceService {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InferenceService for HttpInferenceService {
    async fn create_endpoint(&self, spec: &EndpointSpec) -> CloudResult<()> {
        self.client.post_accepted("/v1/endpoints", spec).await
    }

    async fn describe_endpoint(&self, endpoint_name: &str) -> CloudResult<EndpointStatus> {
        self.client.get_json(&format!("/v1/endpoints/{endpoint_name}")).await
    }

    async fn predict(
        &self,
        endpoint_name: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> CloudResult<Vec<u8>> {
        self.client
            .post_bytes(&format!("/v1/endpoints/{endpoint_name}/invoke"), content_type, body)
            .await
    }

    async fn delete_endpoint(&self, endpoint_name: &str) -> CloudResult<()> {
        self.client.delete(&format!("/v1/endpoints/{endpoint_name}")).await
    }

    fn poll_interval(&self) -> Duration {
        self.client.poll_interval()
    }

    fn wait_timeout(&self) -> Duration {
        self.client.wait_timeout()
    }
}
