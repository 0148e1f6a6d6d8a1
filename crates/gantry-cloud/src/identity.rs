//! Platform identity resolution.

use crate::client::PlatformClient;
use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;
use gantry_core::SessionIdentity;
use tracing::debug;

/// Resolves the account context the pipeline runs under.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn resolve(&self) -> CloudResult<SessionIdentity>;
}

/// Identity resolution against the platform API.
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: PlatformClient,
}

impl HttpIdentityService {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn resolve(&self) -> CloudResult<SessionIdentity> {
        let identity: SessionIdentity = self.client.get_json("/v1/identity").await?;
        identity.validate().map_err(|e| CloudError::MalformedResponse {
            context: "/v1/identity".to_string(),
            reason: e.to_string(),
        })?;
        debug!(account_id = %identity.account_id, region = %identity.region, "resolved identity");
        Ok(identity)
    }
}
