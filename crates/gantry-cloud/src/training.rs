//! Remote training jobs.

use crate::client::PlatformClient;
use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;
use gantry_core::MetricRuleConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// Lifecycle states a platform job moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Stopped)
    }

    pub fn is_success(self) -> bool {
        self == JobState::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the platform needs to schedule one training job.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingJobRequest {
    pub job_name: String,
    /// Fully-qualified training image reference.
    pub image: String,
    /// Role the platform assumes for the job.
    pub role: String,
    /// `store://` location of the staged dataset.
    pub input_location: String,
    /// `store://` location outputs are written under.
    pub output_location: String,
    pub instance_type: String,
    pub instance_count: u32,
    /// Stringly-typed hyperparameters, as the platform expects them.
    pub hyperparameters: BTreeMap<String, String>,
    /// Log-extraction rules the platform applies while the job runs.
    pub metric_rules: Vec<MetricRuleConfig>,
}

/// Point-in-time view of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobStatus {
    pub job_name: String,
    pub state: JobState,
    /// Platform-provided failure diagnostics, when terminal and unsuccessful.
    #[serde(default)]
    pub reason: Option<String>,
    /// Location of the trained model archive, once completed.
    #[serde(default)]
    pub artifact_location: Option<String>,
}

/// Training-job submission and monitoring.
#[async_trait]
pub trait TrainingService: Send + Sync {
    async fn submit(&self, request: &TrainingJobRequest) -> CloudResult<()>;

    async fn describe(&self, job_name: &str) -> CloudResult<TrainingJobStatus>;

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(15)
    }

    fn wait_timeout(&self) -> Duration {
        Duration::from_secs(4 * 3600)
    }

    /// Poll until the job reaches a terminal state.
    ///
    /// Returns the terminal status, successful or not; callers decide what a
    /// failure means for them.
    async fn wait_until_terminal(&self, job_name: &str) -> CloudResult<TrainingJobStatus> {
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
            debug!(job = %job_name, state = %status.state, "waiting for training job");
            sleep(self.poll_interval()).await;
        }
    }
}

/// Training jobs backed by the platform API.
#[derive(Debug, Clone)]
pub struct HttpTrainingService {
    client: PlatformClient,
}

impl HttpTrainingService {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TrainingService for HttpTrainingService {
    async fn submit(&self, request: &TrainingJobRequest) -> CloudResult<()> {
        self.client.post_accepted("/v1/training/jobs", request).await
    }

    async fn describe(&self, job_name: &str) -> CloudResult<TrainingJobStatus> {
        self.client.get_json(&format!("/v1/training/jobs/{job_name}")).await
    }

    fn poll_interval(&self) -> Duration {
        self.client.poll_interval()
    }

    fn wait_timeout(&self) -> Duration {
        self.client.wait_timeout()
    }
}
