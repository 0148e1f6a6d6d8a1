//! Workspace directory layout and discovery.
//!
//! A Gantry workspace is any directory containing a `gantry.toml` manifest.
//! Pipeline state lives under `.gantry/` next to the manifest.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Workspace manifest file name.
pub const MANIFEST_FILE: &str = "gantry.toml";

/// Internal state directory.
pub const DIR_GANTRY: &str = ".gantry";

/// Local dataset copies.
const INTERNAL_DATA: &str = "data";

/// Run ledger and other pipeline state.
const INTERNAL_STATE: &str = "state";

/// Saved training logs.
const INTERNAL_LOGS: &str = "logs";

/// Image build contexts.
const INTERNAL_BUILD: &str = "build";

/// Ledger file name under the state directory.
const LEDGER_FILE: &str = "pipeline.json";

/// A discovered workspace rooted at the manifest directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Walk up from `start` until a directory containing `gantry.toml` is found.
    pub fn discover(start: &Path) -> CoreResult<Self> {
        for dir in start.ancestors() {
            if dir.join(MANIFEST_FILE).is_file() {
                return Ok(Self::new(dir));
            }
        }
        Err(CoreError::WorkspaceNotFound(start.display().to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `gantry.toml` manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// The `.gantry` state root.
    pub fn gantry_dir(&self) -> PathBuf {
        self.root.join(DIR_GANTRY)
    }

    /// Local dataset directory (`.gantry/data`).
    pub fn data_dir(&self) -> PathBuf {
        self.gantry_dir().join(INTERNAL_DATA)
    }

    /// Pipeline state directory (`.gantry/state`).
    pub fn state_dir(&self) -> PathBuf {
        self.gantry_dir().join(INTERNAL_STATE)
    }

    /// Saved log directory (`.gantry/logs`).
    pub fn logs_dir(&self) -> PathBuf {
        self.gantry_dir().join(INTERNAL_LOGS)
    }

    /// Image build context directory (`.gantry/build`).
    pub fn build_dir(&self) -> PathBuf {
        self.gantry_dir().join(INTERNAL_BUILD)
    }

    /// Path of the persisted run ledger.
    pub fn ledger_path(&self) -> PathBuf {
        self.state_dir().join(LEDGER_FILE)
    }

    pub fn internal_dirs(&self) -> Vec<PathBuf> {
        vec![self.data_dir(), self.state_dir(), self.logs_dir(), self.build_dir()]
    }

    /// Create the `.gantry` tree.
    pub fn create_all(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.gantry_dir())?;
        for dir in self.internal_dirs() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        if !self.gantry_dir().exists() {
            return false;
        }
        self.internal_dirs().iter().all(|dir| dir.exists())
    }
}

/// Machine-local platform credential cache (`~/.gantry/credentials.json`).
///
/// Environment preparation deletes this file so a run never picks up
/// credentials left behind by an earlier session.
pub fn global_credentials_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gantry")
        .join("credentials.json")
}
