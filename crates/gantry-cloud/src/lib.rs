//! Gantry Cloud
//!
//! Typed clients for every remote collaborator of the pipeline:
//! - The managed ML platform (identity, object store, image registry,
//!   training, metrics, compilation, endpoints)
//! - The local container engine used to build and push training images
//! - Plain HTTP fetches for build descriptors and dataset archives
//!
//! All remote calls go through small `async_trait` seams so the pipeline
//! can be exercised against in-memory fakes.

pub mod client;
pub mod compiler;
pub mod docker;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod inference;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod training;

pub use client::PlatformClient;
pub use compiler::{CompilationRequest, CompilationStatus, HttpModelCompiler, ModelCompiler};
pub use docker::{ContainerEngine, DockerCli};
pub use error::{CloudError, CloudResult};
pub use fetch::{download, fetch_bytes, fetch_text};
pub use identity::{HttpIdentityService, IdentityService};
pub use inference::{
    EndpointSpec, EndpointState, EndpointStatus, HttpInferenceService, InferenceService,
};
pub use metrics::{HttpMetricsService, MetricPoint, MetricsService};
pub use registry::{
    ensure_repository, HttpImageRegistry, ImageRegistry, RegistryCredential, RepositoryInfo,
};
pub use storage::{upload_tree, HttpObjectStore, ObjectStore, ObjectSummary};
pub use training::{
    HttpTrainingService, JobState, TrainingJobRequest, TrainingJobStatus, TrainingService,
};
