//! Workspace manifest (`gantry.toml`) support.
//!
//! One TOML document configures the whole pipeline: platform endpoint,
//! image build, dataset staging, training, compilation, and serving.
//! Every section has usable defaults except the URLs and registry hosts,
//! which `validate` requires to be filled in.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Hardware variant an image is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Cpu,
    Gpu,
}

impl Arch {
    /// Both variants, in build order.
    pub const ALL: [Arch; 2] = [Arch::Cpu, Arch::Gpu];

    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Cpu => "cpu",
            Arch::Gpu => "gpu",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Arch::Cpu),
            "gpu" => Ok(Arch::Gpu),
            other => Err(CoreError::InvalidConfig(format!("unknown architecture '{other}'"))),
        }
    }
}

/// Top-level workspace configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GantryConfig {
    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub compilation: CompilationConfig,

    #[serde(default)]
    pub serving: ServingConfig,
}

/// Connection settings for the managed ML platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform API.
    #[serde(default)]
    pub base_url: String,

    /// Seconds between job-status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Seconds to wait for a job or endpoint before giving up.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    15
}

fn default_wait_timeout() -> u64 {
    4 * 3600
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            poll_interval_secs: default_poll_interval(),
            wait_timeout_secs: default_wait_timeout(),
        }
    }
}

/// Training-image build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Repository name in the account registry.
    #[serde(default = "default_image_name")]
    pub name: String,

    /// Image version used as the tag stem.
    #[serde(default = "default_image_version")]
    pub version: String,

    /// Runtime token appended to the tag.
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// URL of the build descriptor (Dockerfile) to build from.
    #[serde(default)]
    pub descriptor_url: String,

    /// Registry host the base images are pulled from.
    #[serde(default)]
    pub base_registry: String,
}

fn default_image_name() -> String {
    "gantry-classifier".to_string()
}

fn default_image_version() -> String {
    "1.0".to_string()
}

fn default_runtime() -> String {
    "py3".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: default_image_name(),
            version: default_image_version(),
            runtime: default_runtime(),
            descriptor_url: String::new(),
            base_registry: String::new(),
        }
    }
}

impl ImageConfig {
    /// Tag for one hardware variant: `{version}-{arch}-{runtime}`.
    pub fn tag_for(&self, arch: Arch) -> String {
        format!("{}-{}-{}", self.version, arch, self.runtime)
    }
}

/// Dataset download and staging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name; also the local directory name under `.gantry/data`.
    #[serde(default = "default_dataset_name")]
    pub name: String,

    /// URL of the gzipped tar archive to download.
    #[serde(default)]
    pub archive_url: String,

    /// Staging bucket override. Defaults to the account staging bucket.
    #[serde(default)]
    pub bucket: Option<String>,

    /// Key prefix the dataset tree is uploaded under.
    #[serde(default = "default_dataset_prefix")]
    pub prefix: String,
}

fn default_dataset_name() -> String {
    "cats-dogs".to_string()
}

fn default_dataset_prefix() -> String {
    "gantry/data/".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name: default_dataset_name(),
            archive_url: String::new(),
            bucket: None,
            prefix: default_dataset_prefix(),
        }
    }
}

/// Remote training settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Which image variant the job runs on.
    #[serde(default = "default_training_arch")]
    pub arch: Arch,

    /// Instance type the platform schedules the job on.
    #[serde(default = "default_training_instance")]
    pub instance_type: String,

    #[serde(default = "default_instance_count")]
    pub instance_count: u32,

    #[serde(default = "default_epochs")]
    pub epochs: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Key prefix job outputs are written under.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Metric-extraction rules the platform applies to job logs.
    #[serde(default = "default_metric_rules")]
    pub metric_rules: Vec<MetricRuleConfig>,
}

fn default_training_arch() -> Arch {
    Arch::Gpu
}

fn default_training_instance() -> String {
    "gpu.xlarge".to_string()
}

fn default_instance_count() -> u32 {
    1
}

fn default_epochs() -> u32 {
    6
}

fn default_batch_size() -> u32 {
    64
}

fn default_output_prefix() -> String {
    "gantry/output/".to_string()
}

fn default_metric_rules() -> Vec<MetricRuleConfig> {
    vec![MetricRuleConfig {
        name: "accuracy".to_string(),
        pattern: r"accuracy=(\S+)".to_string(),
    }]
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            arch: default_training_arch(),
            instance_type: default_training_instance(),
            instance_count: default_instance_count(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            output_prefix: default_output_prefix(),
            metric_rules: default_metric_rules(),
        }
    }
}

/// One named metric with the regex that extracts its value from a log line.
///
/// The pattern must contain exactly one capture group; the group captures
/// the numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRuleConfig {
    pub name: String,
    pub pattern: String,
}

/// Model compilation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationConfig {
    /// Name the compiled model is registered under.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Hardware family the artifact is compiled for.
    #[serde(default = "default_target_family")]
    pub target_family: String,

    /// Name of the single input tensor.
    #[serde(default = "default_input_name")]
    pub input_name: String,

    /// Shape of the input tensor.
    #[serde(default = "default_input_shape")]
    pub input_shape: Vec<u64>,

    /// Framework the trained artifact was produced with.
    #[serde(default = "default_framework")]
    pub framework: String,

    #[serde(default = "default_framework_version")]
    pub framework_version: String,
}

fn default_model_name() -> String {
    "gantry-classifier-compiled".to_string()
}

fn default_target_family() -> String {
    "standard-cpu".to_string()
}

fn default_input_name() -> String {
    "data".to_string()
}

fn default_input_shape() -> Vec<u64> {
    vec![1, 3, 224, 224]
}

fn default_framework() -> String {
    "mxnet".to_string()
}

fn default_framework_version() -> String {
    "1.8".to_string()
}

impl Default for CompilationConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            target_family: default_target_family(),
            input_name: default_input_name(),
            input_shape: default_input_shape(),
            framework: default_framework(),
            framework_version: default_framework_version(),
        }
    }
}

/// Endpoint deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingConfig {
    #[serde(default = "default_endpoint_name")]
    pub endpoint_name: String,

    #[serde(default = "default_serving_instance")]
    pub instance_type: String,

    #[serde(default = "default_instance_count")]
    pub instance_count: u32,

    /// Content type sent with prediction payloads.
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_endpoint_name() -> String {
    "gantry-classifier-endpoint".to_string()
}

fn default_serving_instance() -> String {
    "cpu.xlarge".to_string()
}

fn default_content_type() -> String {
    "application/x-image".to_string()
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            endpoint_name: default_endpoint_name(),
            instance_type: default_serving_instance(),
            instance_count: default_instance_count(),
            content_type: default_content_type(),
        }
    }
}

impl GantryConfig {
    /// Load and parse a manifest.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check every field a full pipeline run depends on.
    ///
    /// Runs before any stage so that a half-filled manifest fails here
    /// instead of halfway through a paid remote job.
    pub fn validate(&self) -> CoreResult<()> {
        let require = |value: &str, key: &str| -> CoreResult<()> {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidConfig(format!("{key} is not set")));
            }
            Ok(())
        };

        require(&self.platform.base_url, "platform.base_url")?;
        if !self.platform.base_url.starts_with("http") {
            return Err(CoreError::InvalidConfig(format!(
                "platform.base_url must be an http(s) URL, got '{}'",
                self.platform.base_url
            )));
        }
        if self.platform.poll_interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "platform.poll_interval_secs must be >= 1".to_string(),
            ));
        }

        require(&self.image.name, "image.name")?;
        require(&self.image.version, "image.version")?;
        require(&self.image.runtime, "image.runtime")?;
        require(&self.image.descriptor_url, "image.descriptor_url")?;
        require(&self.image.base_registry, "image.base_registry")?;

        require(&self.dataset.name, "dataset.name")?;
        if self.dataset.name.contains('/') {
            return Err(CoreError::InvalidConfig(
                "dataset.name must not contain '/'".to_string(),
            ));
        }
        require(&self.dataset.archive_url, "dataset.archive_url")?;
        require(&self.dataset.prefix, "dataset.prefix")?;

        require(&self.training.instance_type, "training.instance_type")?;
        require(&self.training.output_prefix, "training.output_prefix")?;
        if self.training.epochs == 0 {
            return Err(CoreError::InvalidConfig("training.epochs must be >= 1".to_string()));
        }
        if self.training.batch_size == 0 {
            return Err(CoreError::InvalidConfig("training.batch_size must be >= 1".to_string()));
        }
        if self.training.instance_count == 0 {
            return Err(CoreError::InvalidConfig(
                "training.instance_count must be >= 1".to_string(),
            ));
        }
        for rule in &self.training.metric_rules {
            require(&rule.name, "training.metric_rules[].name")?;
            let compiled = regex::Regex::new(&rule.pattern).map_err(|e| {
                CoreError::InvalidConfig(format!("metric rule '{}' is not a valid regex: {e}", rule.name))
            })?;
            // captures_len counts the implicit whole-match group
            if compiled.captures_len() != 2 {
                return Err(CoreError::InvalidConfig(format!(
                    "metric rule '{}' must have exactly one capture group",
                    rule.name
                )));
            }
        }

        require(&self.compilation.model_name, "compilation.model_name")?;
        require(&self.compilation.target_family, "compilation.target_family")?;
        require(&self.compilation.input_name, "compilation.input_name")?;
        require(&self.compilation.framework, "compilation.framework")?;
        require(&self.compilation.framework_version, "compilation.framework_version")?;
        if self.compilation.input_shape.is_empty() {
            return Err(CoreError::InvalidConfig(
                "compilation.input_shape must not be empty".to_string(),
            ));
        }
        if self.compilation.input_shape.contains(&0) {
            return Err(CoreError::InvalidConfig(
                "compilation.input_shape dimensions must be >= 1".to_string(),
            ));
        }

        require(&self.serving.endpoint_name, "serving.endpoint_name")?;
        require(&self.serving.instance_type, "serving.instance_type")?;
        require(&self.serving.content_type, "serving.content_type")?;
        if self.serving.instance_count == 0 {
            return Err(CoreError::InvalidConfig(
                "serving.instance_count must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}
