//! Resolved platform identity for a pipeline run.

use crate::error::{CoreError, CoreResult};
use crate::location::StorageLocation;
use serde::{Deserialize, Serialize};

/// The account context every remote stage runs under.
///
/// Resolved once during environment preparation and passed explicitly into
/// each stage rather than re-read from ambient global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Platform account identifier.
    pub account_id: String,
    /// Region all services are addressed in.
    pub region: String,
    /// Account-default staging bucket.
    pub default_bucket: String,
    /// Role the platform assumes when running jobs on our behalf.
    pub execution_role: String,
}

impl SessionIdentity {
    pub fn validate(&self) -> CoreResult<()> {
        if self.account_id.trim().is_empty() {
            return Err(CoreError::InvalidConfig("identity.account_id is empty".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(CoreError::InvalidConfig("identity.region is empty".to_string()));
        }
        if self.default_bucket.trim().is_empty() {
            return Err(CoreError::InvalidConfig("identity.default_bucket is empty".to_string()));
        }
        if self.execution_role.trim().is_empty() {
            return Err(CoreError::InvalidConfig("identity.execution_role is empty".to_string()));
        }
        Ok(())
    }

    /// Location under the account-default bucket.
    pub fn bucket_location(&self, prefix: &str) -> StorageLocation {
        StorageLocation::new(self.default_bucket.clone(), prefix)
    }
}
