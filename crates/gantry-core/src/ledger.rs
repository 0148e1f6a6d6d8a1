//! Persisted pipeline step ledger.
//!
//! Every completed step writes one record (timestamp + typed outputs) into
//! `.gantry/state/pipeline.json`. Later stages read their inputs from the
//! ledger, and `run --resume` skips steps that already have a record, so a
//! pipeline interrupted after an expensive step picks up where it stopped.

use crate::config::Arch;
use crate::error::{CoreError, CoreResult};
use crate::identity::SessionIdentity;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    Prepare,
    BuildImage(Arch),
    StageDataset,
    Train,
    FetchMetrics,
    Compile,
    Deploy,
}

impl StepId {
    /// Stable key used in the ledger file.
    pub fn key(self) -> String {
        match self {
            StepId::Prepare => "prepare".to_string(),
            StepId::BuildImage(arch) => format!("build-image-{arch}"),
            StepId::StageDataset => "stage-dataset".to_string(),
            StepId::Train => "train".to_string(),
            StepId::FetchMetrics => "fetch-metrics".to_string(),
            StepId::Compile => "compile".to_string(),
            StepId::Deploy => "deploy".to_string(),
        }
    }

    /// Human-readable step title.
    pub fn title(self) -> String {
        match self {
            StepId::Prepare => "Prepare environment".to_string(),
            StepId::BuildImage(arch) => format!("Build {arch} image"),
            StepId::StageDataset => "Stage dataset".to_string(),
            StepId::Train => "Train model".to_string(),
            StepId::FetchMetrics => "Fetch metrics".to_string(),
            StepId::Compile => "Compile model".to_string(),
            StepId::Deploy => "Deploy endpoint".to_string(),
        }
    }

    /// Full pipeline in execution order.
    pub fn pipeline() -> [StepId; 8] {
        [
            StepId::Prepare,
            StepId::BuildImage(Arch::Cpu),
            StepId::BuildImage(Arch::Gpu),
            StepId::StageDataset,
            StepId::Train,
            StepId::FetchMetrics,
            StepId::Compile,
            StepId::Deploy,
        ]
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// A completed step: when it finished and what it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub outputs: serde_json::Value,
}

/// Outputs of the environment-preparation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareOutputs {
    pub identity: SessionIdentity,
    /// Whether a stale credential file was actually deleted.
    pub removed_credentials: bool,
}

/// Outputs of one image build-and-push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutputs {
    pub arch: Arch,
    /// Local `name:tag` reference.
    pub local_tag: String,
    /// Fully-qualified registry reference that was pushed.
    pub remote_tag: String,
}

/// Outputs of dataset staging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOutputs {
    /// `store://bucket/prefix/` the tree lives under.
    pub location: String,
    /// Objects uploaded by this run (zero when the prefix was already populated).
    pub uploaded_objects: u64,
    /// SHA-256 digest over the local tree, recorded for inspection.
    pub tree_digest: String,
    /// True when staging was skipped because objects were already present.
    pub reused: bool,
}

/// Outputs of a successful training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOutputs {
    pub job_name: String,
    /// Location of the trained model archive.
    pub artifact_location: String,
}

/// Outputs of a metric fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsOutputs {
    pub job_name: String,
    pub rows: u64,
}

/// Outputs of model compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOutputs {
    pub model_name: String,
    pub output_location: String,
}

/// Outputs of endpoint deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployOutputs {
    pub endpoint_name: String,
}

/// The persisted ledger: step key -> completion record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunLedger {
    #[serde(default)]
    steps: BTreeMap<String, StepRecord>,
}

impl RunLedger {
    /// Load the ledger, or an empty one if the file does not exist yet.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let ledger: Self = serde_json::from_str(&content)?;
        Ok(ledger)
    }

    /// Write the ledger as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Record a step as complete, replacing any earlier record.
    pub fn record<T: Serialize>(&mut self, step: StepId, outputs: &T) -> CoreResult<()> {
        let outputs = serde_json::to_value(outputs)?;
        self.steps.insert(step.key(), StepRecord { completed_at: Utc::now(), outputs });
        Ok(())
    }

    /// Drop the record for `step`. Returns whether one existed.
    pub fn clear(&mut self, step: StepId) -> bool {
        self.steps.remove(&step.key()).is_some()
    }

    /// Drop every record.
    pub fn reset(&mut self) {
        self.steps.clear();
    }

    pub fn is_complete(&self, step: StepId) -> bool {
        self.steps.contains_key(&step.key())
    }

    pub fn record_for(&self, step: StepId) -> Option<&StepRecord> {
        self.steps.get(&step.key())
    }

    /// Decode the outputs recorded for `step`.
    ///
    /// `Ok(None)` when the step has no record; an error when a record exists
    /// but does not have the expected shape.
    pub fn outputs<T: DeserializeOwned>(&self, step: StepId) -> CoreResult<Option<T>> {
        let Some(record) = self.record_for(step) else {
            return Ok(None);
        };
        let outputs = serde_json::from_value(record.outputs.clone()).map_err(|e| {
            CoreError::MalformedRecord { step: step.key(), reason: e.to_string() }
        })?;
        Ok(Some(outputs))
    }

    /// Identity resolved by the last `prepare` step.
    pub fn identity(&self) -> CoreResult<Option<SessionIdentity>> {
        Ok(self.outputs::<PrepareOutputs>(StepId::Prepare)?.map(|p| p.identity))
    }

    pub fn image(&self, arch: Arch) -> CoreResult<Option<BuildOutputs>> {
        self.outputs(StepId::BuildImage(arch))
    }

    pub fn dataset(&self) -> CoreResult<Option<DatasetOutputs>> {
        self.outputs(StepId::StageDataset)
    }

    pub fn training(&self) -> CoreResult<Option<TrainOutputs>> {
        self.outputs(StepId::Train)
    }

    pub fn compiled(&self) -> CoreResult<Option<CompileOutputs>> {
        self.outputs(StepId::Compile)
    }

    pub fn endpoint(&self) -> CoreResult<Option<DeployOutputs>> {
        self.outputs(StepId::Deploy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity() -> SessionIdentity {
        SessionIdentity {
            account_id: "123456789012".to_string(),
            region: "eu-central".to_string(),
            default_bucket: "acct-staging".to_string(),
            execution_role: "platform/exec-role".to_string(),
        }
    }

    #[test]
    fn test_record_and_query() {
        let mut ledger = RunLedger::default();
        assert!(!ledger.is_complete(StepId::Train));

        ledger
            .record(
                StepId::Train,
                &TrainOutputs {
                    job_name: "job-1".to_string(),
                    artifact_location: "store://b/out/job-1/model.tar.gz".to_string(),
                },
            )
            .unwrap();

        assert!(ledger.is_complete(StepId::Train));
        let outputs = ledger.training().unwrap().unwrap();
        assert_eq!(outputs.job_name, "job-1");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state/pipeline.json");

        let mut ledger = RunLedger::default();
        ledger
            .record(
                StepId::Prepare,
                &PrepareOutputs { identity: identity(), removed_credentials: true },
            )
            .unwrap();
        ledger
            .record(
                StepId::BuildImage(Arch::Cpu),
                &BuildOutputs {
                    arch: Arch::Cpu,
                    local_tag: "gantry-classifier:1.0-cpu-py3".to_string(),
                    remote_tag: "registry.test/gantry-classifier:1.0-cpu-py3".to_string(),
                },
            )
            .unwrap();
        ledger.save(&path).unwrap();

        let loaded = RunLedger::load(&path).unwrap();
        assert!(loaded.is_complete(StepId::Prepare));
        assert!(loaded.is_complete(StepId::BuildImage(Arch::Cpu)));
        assert!(!loaded.is_complete(StepId::BuildImage(Arch::Gpu)));
        assert_eq!(loaded.identity().unwrap().unwrap().account_id, "123456789012");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let ledger = RunLedger::load(&temp.path().join("pipeline.json")).unwrap();
        assert!(!ledger.is_complete(StepId::Prepare));
    }

    #[test]
    fn test_malformed_outputs_fail_fast() {
        let mut ledger = RunLedger::default();
        ledger.record(StepId::Train, &serde_json::json!({"job": 42})).unwrap();

        let err = ledger.training().unwrap_err();
        match err {
            CoreError::MalformedRecord { step, .. } => assert_eq!(step, "train"),
            other => panic!("Expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_clear() {
        let mut ledger = RunLedger::default();
        ledger
            .record(StepId::Deploy, &DeployOutputs { endpoint_name: "ep".to_string() })
            .unwrap();
        assert!(ledger.clear(StepId::Deploy));
        assert!(!ledger.clear(StepId::Deploy));
        assert!(ledger.endpoint().unwrap().is_none());
    }

    #[test]
    fn test_pipeline_order() {
        let steps = StepId::pipeline();
        assert_eq!(steps[0], StepId::Prepare);
        assert_eq!(steps[1], StepId::BuildImage(Arch::Cpu));
        assert_eq!(steps[4], StepId::Train);
        assert_eq!(steps[7], StepId::Deploy);
        assert_eq!(StepId::BuildImage(Arch::Gpu).key(), "build-image-gpu");
    }
}
