//! Error types for Gantry Core.

use thiserror::Error;

/// Core error type for workspace and state operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a TOML document
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Ledger (de)serialization errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] serde_json::Error),

    /// Recorded step outputs do not have the expected shape
    #[error("Malformed step record for '{step}': {reason}")]
    MalformedRecord { step: String, reason: String },

    /// A string that does not name an object-store location
    #[error("Invalid storage location: {0}")]
    InvalidLocation(String),

    /// No workspace manifest found
    #[error("No workspace found: {0}")]
    WorkspaceNotFound(String),
}

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoreError = io_err.into();
        match err {
            CoreError::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_core_error_ledger_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: CoreError = json_err.into();
        match err {
            CoreError::Ledger(_) => {}
            _ => panic!("Expected Ledger error variant"),
        }
    }

    #[test]
    fn test_core_error_display() {
        let err = CoreError::InvalidConfig("dataset.archive_url is not set".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("dataset.archive_url"));

        let err = CoreError::MalformedRecord {
            step: "train".to_string(),
            reason: "missing field".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("train"));
        assert!(msg.contains("missing field"));
    }
}
