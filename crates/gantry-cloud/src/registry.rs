//! Account image-registry access.

use crate::client::PlatformClient;
use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A repository in the account registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    /// Fully-qualified repository URI images are tagged against.
    pub uri: String,
}

/// A decoded docker login credential for one registry host.
#[derive(Debug, Clone)]
pub struct RegistryCredential {
    pub username: String,
    pub password: String,
    pub endpoint: String,
}

/// Registry management: repositories and login credentials.
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    async fn describe_repository(&self, name: &str) -> CloudResult<RepositoryInfo>;

    async fn create_repository(&self, name: &str) -> CloudResult<RepositoryInfo>;

    /// Short-lived docker credential for `registry_host`.
    async fn authorization(&self, registry_host: &str) -> CloudResult<RegistryCredential>;
}

/// Describe the repository, creating it when it does not exist yet.
pub async fn ensure_repository(
    registry: &dyn ImageRegistry,
    name: &str,
) -> CloudResult<RepositoryInfo> {
    match registry.describe_repository(name).await {
        Ok(info) => {
            debug!(repository = %name, uri = %info.uri, "repository exists");
            Ok(info)
        }
        Err(CloudError::NotFound(_)) => {
            info!(repository = %name, "repository missing, creating");
            registry.create_repository(name).await
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthorizationResponse {
    /// Base64 `user:password` pair.
    token: String,
    endpoint: String,
}

/// Registry access backed by the platform API.
#[derive(Debug, Clone)]
pub struct HttpImageRegistry {
    client: PlatformClient,
}

impl HttpImageRegistry {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    fn decode_credential(
        response: AuthorizationResponse,
        context: &str,
    ) -> CloudResult<RegistryCredential> {
        let malformed = |reason: String| CloudError::MalformedResponse {
            context: context.to_string(),
            reason,
        };
        let decoded = general_purpose::STANDARD
            .decode(&response.token)
            .map_err(|e| malformed(format!("token is not base64: {e}")))?;
        let text = String::from_utf8(decoded)
            .map_err(|e| malformed(format!("token is not UTF-8: {e}")))?;
        let (username, password) = text
            .split_once(':')
            .ok_or_else(|| malformed("token is not a user:password pair".to_string()))?;
        Ok(RegistryCredential {
            username: username.to_string(),
            password: password.to_string(),
            endpoint: response.endpoint,
        })
    }
}

#[async_trait]
impl ImageRegistry for HttpImageRegistry {
    async fn describe_repository(&self, name: &str) -> CloudResult<RepositoryInfo> {
        self.client.get_json(&format!("/v1/registry/repositories/{name}")).await
    }

    async fn create_repository(&self, name: &str) -> CloudResult<RepositoryInfo> {
        self.client
            .post_json("/v1/registry/repositories", &CreateRepositoryRequest { name })
            .await
    }

    async fn authorization(&self, registry_host: &str) -> CloudResult<RegistryCredential> {
        let path = format!("/v1/registry/authorization?host={registry_host}");
        let response: AuthorizationResponse = self.client.get_json(&path).await?;
        Self::decode_credential(response, &path)
    }
}
