//! Error types for remote-service clients.

use thiserror::Error;

/// Errors surfaced by platform, registry, and container-engine calls.
///
/// Remote failures carry the platform's own diagnostic text; nothing is
/// reclassified or retried at this layer.
#[derive(Error, Debug)]
pub enum CloudError {
    /// Transport-level failure before a response arrived
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the platform, message as the platform sent it
    #[error("Platform API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The named resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// GANTRY_API_TOKEN is required for all platform calls
    #[error("GANTRY_API_TOKEN environment variable not set")]
    MissingToken,

    /// A response arrived but did not have the promised shape
    #[error("Malformed response from {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    /// A remote job reached a terminal state other than success
    #[error("Job '{name}' ended as {state}: {reason}")]
    JobFailed { name: String, state: String, reason: String },

    /// A blocking wait outlived the configured timeout
    #[error("Timed out after {waited_secs}s waiting for '{name}'")]
    WaitTimeout { name: String, waited_secs: u64 },

    /// The container engine exited non-zero
    #[error("Container engine error: {0}")]
    Container(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cloud operations.
pub type CloudResult<T> = std::result::Result<T, CloudError>;
