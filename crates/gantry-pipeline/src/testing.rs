//! In-memory fakes for every remote seam, shared by stage tests.

use crate::services::CloudServices;
use async_trait::async_trait;
use gantry_cloud::{
    CloudError, CloudResult, CompilationRequest, CompilationStatus, ContainerEngine, EndpointSpec,
    EndpointState, EndpointStatus, IdentityService, ImageRegistry, InferenceService, JobState,
    MetricPoint, MetricsService, ModelCompiler, ObjectStore, ObjectSummary, RegistryCredential,
    RepositoryInfo, TrainingJobRequest, TrainingJobStatus, TrainingService,
};
use gantry_core::{GantryConfig, SessionIdentity};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn identity() -> SessionIdentity {
    SessionIdentity {
        account_id: "123456789012".to_string(),
        region: "eu-central".to_string(),
        default_bucket: "acct-staging".to_string(),
        execution_role: "platform/exec-role".to_string(),
    }
}

pub(crate) fn config() -> GantryConfig {
    let mut config = GantryConfig::default();
    config.platform.base_url = "https://platform.test".to_string();
    config.image.descriptor_url = "https://builds.test/Dockerfile".to_string();
    config.image.base_registry = "base-images.test".to_string();
    config.dataset.archive_url = "https://data.test/cats-dogs.tar.gz".to_string();
    config.dataset.prefix = "proj/data/".to_string();
    config
}

pub(crate) struct FakeIdentity {
    pub identity: SessionIdentity,
    pub fail: Mutex<bool>,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self { identity: identity(), fail: Mutex::new(false) }
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn resolve(&self) -> CloudResult<SessionIdentity> {
        if *self.fail.lock().unwrap() {
            return Err(CloudError::Api { status: 403, message: "identity denied".to_string() });
        }
        Ok(self.identity.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeStore {
    pub existing: Mutex<Vec<ObjectSummary>>,
    pub puts: Mutex<Vec<(String, String)>>,
}

impl FakeStore {
    pub fn preload(&self, keys: &[&str]) {
        let mut existing = self.existing.lock().unwrap();
        *existing = keys
            .iter()
            .map(|k| ObjectSummary { key: (*k).to_string(), size: 1 })
            .collect();
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list_prefix(&self, _bucket: &str, _prefix: &str) -> CloudResult<Vec<ObjectSummary>> {
        Ok(self
            .existing
            .lock()
            .unwrap()
            .iter()
            .map(|o| ObjectSummary { key: o.key.clone(), size: o.size })
            .collect())
    }

    async fn put_object(&self, bucket: &str, key: &str, _bytes: Vec<u8>) -> CloudResult<()> {
        self.puts.lock().unwrap().push((bucket.to_string(), key.to_string()));
        Ok(())
    }
}

pub(crate) struct FakeRegistry {
    pub exists: Mutex<bool>,
    pub created: Mutex<Vec<String>>,
    pub auth_hosts: Mutex<Vec<String>>,
}

impl Default for FakeRegistry {
    fn default() -> Self {
        Self { exists: Mutex::new(false), created: Mutex::new(vec![]), auth_hosts: Mutex::new(vec![]) }
    }
}

fn repository(name: &str) -> RepositoryInfo {
    RepositoryInfo { name: name.to_string(), uri: format!("registry.test/acct/{name}") }
}

#[async_trait]
impl ImageRegistry for FakeRegistry {
    async fn describe_repository(&self, name: &str) -> CloudResult<RepositoryInfo> {
        if *self.exists.lock().unwrap() {
            Ok(repository(name))
        } else {
            Err(CloudError::NotFound(name.to_string()))
        }
    }

    async fn create_repository(&self, name: &str) -> CloudResult<RepositoryInfo> {
        self.created.lock().unwrap().push(name.to_string());
        *self.exists.lock().unwrap() = true;
        Ok(repository(name))
    }

    async fn authorization(&self, registry_host: &str) -> CloudResult<RegistryCredential> {
        self.auth_hosts.lock().unwrap().push(registry_host.to_string());
        Ok(RegistryCredential {
            username: "builder".to_string(),
            password: "s3cr3t".to_string(),
            endpoint: registry_host.to_string(),
        })
    }
}

pub(crate) struct FakeTraining {
    pub submitted: Mutex<Vec<TrainingJobRequest>>,
    pub terminal: Mutex<JobState>,
    pub reason: Mutex<Option<String>>,
    pub artifact: Mutex<Option<String>>,
}

impl Default for FakeTraining {
    fn default() -> Self {
        Self {
            submitted: Mutex::new(vec![]),
            terminal: Mutex::new(JobState::Completed),
            reason: Mutex::new(None),
            artifact: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TrainingService for FakeTraining {
    async fn submit(&self, request: &TrainingJobRequest) -> CloudResult<()> {
        self.submitted.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn describe(&self, job_name: &str) -> CloudResult<TrainingJobStatus> {
        let state = *self.terminal.lock().unwrap();
        let artifact_location = if state.is_success() {
            Some(self.artifact.lock().unwrap().clone().unwrap_or_else(|| {
                format!("store://acct-staging/gantry/output/{job_name}/model.tar.gz")
            }))
        } else {
            None
        };
        Ok(TrainingJobStatus {
            job_name: job_name.to_string(),
            state,
            reason: self.reason.lock().unwrap().clone(),
            artifact_location,
        })
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn wait_timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

#[derive(Default)]
pub(crate) struct FakeMetrics {
    pub rows: Mutex<Vec<MetricPoint>>,
    pub requests: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl MetricsService for FakeMetrics {
    async fn fetch_series(
        &self,
        job_name: &str,
        metric_names: &[String],
    ) -> CloudResult<Vec<MetricPoint>> {
        self.requests.lock().unwrap().push((job_name.to_string(), metric_names.to_vec()));
        Ok(self.rows.lock().unwrap().clone())
    }
}

pub(crate) struct FakeCompiler {
    pub submitted: Mutex<Vec<CompilationRequest>>,
    pub terminal: Mutex<JobState>,
    pub reason: Mutex<Option<String>>,
    pub output_location: Mutex<Option<String>>,
}

impl Default for FakeCompiler {
    fn default() -> Self {
        Self {
            submitted: Mutex::new(vec![]),
            terminal: Mutex::new(JobState::Completed),
            reason: Mutex::new(None),
            output_location: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ModelCompiler for FakeCompiler {
    async fn submit(&self, request: &CompilationRequest) -> CloudResult<()> {
        self.submitted.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn describe(&self, job_name: &str) -> CloudResult<CompilationStatus> {
        Ok(CompilationStatus {
            job_name: job_name.to_string(),
            state: *self.terminal.lock().unwrap(),
            reason: self.reason.lock().unwrap().clone(),
            output_location: self.output_location.lock().unwrap().clone(),
        })
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn wait_timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

pub(crate) struct FakeInference {
    pub endpoints: Mutex<Vec<EndpointSpec>>,
    pub state: Mutex<EndpointState>,
    pub reason: Mutex<Option<String>>,
    pub predictions: Mutex<Vec<(String, String, Vec<u8>)>>,
    pub response: Mutex<Vec<u8>>,
    pub deleted: Mutex<Vec<String>>,
    pub exists: Mutex<bool>,
}

impl Default for FakeInference {
    fn default() -> Self {
        Self {
            endpoints: Mutex::new(vec![]),
            state: Mutex::new(EndpointState::InService),
            reason: Mutex::new(None),
            predictions: Mutex::new(vec![]),
            response: Mutex::new(b"payload".to_vec()),
            deleted: Mutex::new(vec![]),
            exists: Mutex::new(false),
        }
    }
}

#[async_trait]
impl InferenceService for FakeInference {
    async fn create_endpoint(&self, spec: &EndpointSpec) -> CloudResult<()> {
        self.endpoints.lock().unwrap().push(spec.clone());
        *self.exists.lock().unwrap() = true;
        Ok(())
    }

    async fn describe_endpoint(&self, endpoint_name: &str) -> CloudResult<EndpointStatus> {
        Ok(EndpointStatus {
            endpoint_name: endpoint_name.to_string(),
            state: *self.state.lock().unwrap(),
            reason: self.reason.lock().unwrap().clone(),
        })
    }

    async fn predict(
        &self,
        endpoint_name: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> CloudResult<Vec<u8>> {
        self.predictions.lock().unwrap().push((
            endpoint_name.to_string(),
            content_type.to_string(),
            body,
        ));
        Ok(self.response.lock().unwrap().clone())
    }

    async fn delete_endpoint(&self, endpoint_name: &str) -> CloudResult<()> {
        let mut exists = self.exists.lock().unwrap();
        if !*exists {
            return Err(CloudError::NotFound(endpoint_name.to_string()));
        }
        *exists = false;
        self.deleted.lock().unwrap().push(endpoint_name.to_string());
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn wait_timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

#[derive(Default)]
pub(crate) struct FakeEngine {
    pub calls: Mutex<Vec<String>>,
    pub fail_on: Mutex<Option<String>>,
}

impl FakeEngine {
    fn call(&self, entry: String) -> CloudResult<()> {
        let verb = entry.split_whitespace().next().unwrap_or("").to_string();
        if self.fail_on.lock().unwrap().as_deref() == Some(verb.as_str()) {
            return Err(CloudError::Container(format!("{verb} failed")));
        }
        self.calls.lock().unwrap().push(entry);
        Ok(())
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn login(&self, host: &str, username: &str, _password: &str) -> CloudResult<()> {
        self.call(format!("login {host} {username}"))
    }

    async fn build(
        &self,
        _context_dir: &Path,
        tag: &str,
        build_args: &[(String, String)],
    ) -> CloudResult<()> {
        let args: Vec<String> = build_args.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.call(format!("build {tag} {}", args.join(",")))
    }

    async fn tag(&self, source: &str, target: &str) -> CloudResult<()> {
        self.call(format!("tag {source} {target}"))
    }

    async fn push(&self, reference: &str) -> CloudResult<()> {
        self.call(format!("push {reference}"))
    }
}

/// All fakes plus the `CloudServices` view over them.
pub(crate) struct TestPlatform {
    pub identity: Arc<FakeIdentity>,
    pub storage: Arc<FakeStore>,
    pub registry: Arc<FakeRegistry>,
    pub training: Arc<FakeTraining>,
    pub metrics: Arc<FakeMetrics>,
    pub compiler: Arc<FakeCompiler>,
    pub inference: Arc<FakeInference>,
    pub containers: Arc<FakeEngine>,
}

impl TestPlatform {
    pub fn new() -> Self {
        Self {
            identity: Arc::new(FakeIdentity::default()),
            storage: Arc::new(FakeStore::default()),
            registry: Arc::new(FakeRegistry::default()),
            training: Arc::new(FakeTraining::default()),
            metrics: Arc::new(FakeMetrics::default()),
            compiler: Arc::new(FakeCompiler::default()),
            inference: Arc::new(FakeInference::default()),
            containers: Arc::new(FakeEngine::default()),
        }
    }

    pub fn services(&self) -> CloudServices {
        CloudServices {
            identity: self.identity.clone(),
            storage: self.storage.clone(),
            registry: self.registry.clone(),
            training: self.training.clone(),
            metrics: self.metrics.clone(),
            compiler: self.compiler.clone(),
            inference: self.inference.clone(),
            containers: self.containers.clone(),
        }
    }
}
