//! Bundle of remote-service handles the stages run against.

use crate::error::PipelineResult;
use gantry_cloud::{
    ContainerEngine, DockerCli, HttpIdentityService, HttpImageRegistry, HttpInferenceService,
    HttpMetricsService, HttpModelCompiler, HttpObjectStore, HttpTrainingService, IdentityService,
    ImageRegistry, InferenceService, MetricsService, ModelCompiler, ObjectStore, PlatformClient,
    TrainingService,
};
use gantry_core::PlatformConfig;
use std::sync::Arc;

/// Every remote collaborator of the pipeline, behind trait objects.
///
/// Production wiring talks to the platform API and the local docker CLI;
/// tests substitute in-memory fakes per seam.
#[derive(Clone)]
pub struct CloudServices {
    pub identity: Arc<dyn IdentityService>,
    pub storage: Arc<dyn ObjectStore>,
    pub registry: Arc<dyn ImageRegistry>,
    pub training: Arc<dyn TrainingService>,
    pub metrics: Arc<dyn MetricsService>,
    pub compiler: Arc<dyn ModelCompiler>,
    pub inference: Arc<dyn InferenceService>,
    pub containers: Arc<dyn ContainerEngine>,
}

impl CloudServices {
    /// Wire every service against the configured platform and the docker CLI.
    pub fn from_config(config: &PlatformConfig) -> PipelineResult<Self> {
        let client = PlatformClient::from_config(config)?;
        Ok(Self {
            identity: Arc::new(HttpIdentityService::new(client.clone())),
            storage: Arc::new(HttpObjectStore::new(client.clone())),
            registry: Arc::new(HttpImageRegistry::new(client.clone())),
            training: Arc::new(HttpTrainingService::new(client.clone())),
            metrics: Arc::new(HttpMetricsService::new(client.clone())),
            compiler: Arc::new(HttpModelCompiler::new(client.clone())),
            inference: Arc::new(HttpInferenceService::new(client)),
            containers: Arc::new(DockerCli::new()),
        })
    }
}
