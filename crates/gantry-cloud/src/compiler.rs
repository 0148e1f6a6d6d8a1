//! Hardware-targeted model compilation.

use crate::client::PlatformClient;
use crate::error::{CloudError, CloudResult};
use crate::training::JobState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// Everything the platform needs to compile a trained artifact.
#[derive(Debug, Clone, Serialize)]
pub struct CompilationRequest {
    pub job_name: String,
    /// Name the compiled model is registered under.
    pub model_name: String,
    /// `store://` location of the trained model archive.
    pub artifact_location: String,
    /// `store://` location compiled output is written under.
    pub output_location: String,
    pub role: String,
    /// Hardware family to compile for.
    pub target_family: String,
    pub framework: String,
    pub framework_version: String,
    /// The single input tensor binding: name and shape.
    pub input_name: String,
    pub input_shape: Vec<u64>,
}

/// Point-in-time view of a compilation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationStatus {
    pub job_name: String,
    pub state: JobState,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub output_location: Option<String>,
}

/// Compilation-job submission and monitoring.
#[async_trait]
pub trait ModelCompiler: Send + Sync {
    async fn submit(&self, request: &CompilationRequest) -> CloudResult<()>;

    async fn describe(&self, job_name: &str) -> CloudResult<CompilationStatus>;

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(15)
    }

    fn wait_timeout(&self) -> Duration {
        Duration::from_secs(4 * 3600)
    }

    /// Poll until the compilation job reaches a terminal state.
    async fn wait_until_terminal(&self, job_name: &str) -> CloudResult<CompilationStatus> {
        let started = Instant::now();
        loop {
            let status = self.describe(job_name).await?;
            if status.state.is_terminal() {
                return Ok(status);
            }
            if started.elapsed() >= self.wait_timeout() {
                return Err(CloudError::WaitTimeout {
                    name: job_name.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            debug!(job = %job_name, state = %status.state, "waiting for compilation job");
            sleep(self.poll_interval()).await;
        }
    }
}

/// Compilation backed by the platform API.
#[derive(Debug, Clone)]
pub struct HttpModelCompiler {
    client: PlatformClient,
}

impl HttpModelCompiler {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelCompiler for HttpModelCompiler {
    async fn submit(&self, request: &CompilationRequest) -> CloudResult<()> {
        self.client.post_accepted("/v1/compilation/jobs", request).await
    }

    async fn describe(&self, job_name: &str) -> CloudResult<CompilationStatus> {
        self.client.get_json(&format!("/v1/compilation/jobs/{job_name}")).await
    }

    fn poll_interval(&self) -> Duration {
        self.client.poll_interval()
    }

    fn wait_timeout(&self) -> Duration {
        self.client.wait_timeout()
    }
}
