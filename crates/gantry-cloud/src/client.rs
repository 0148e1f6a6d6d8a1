//! Low-level HTTP client for the managed ML platform.

use crate::error::{CloudError, CloudResult};
use gantry_core::PlatformConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::time::Duration;
use tracing::{debug, error};

/// Environment variable holding the platform API token.
pub const TOKEN_ENV: &str = "GANTRY_API_TOKEN";

/// Authenticated JSON/byte transport shared by all platform services.
///
/// Non-success responses become [`CloudError::Api`] carrying the body text
/// exactly as the platform sent it; 404s become [`CloudError::NotFound`].
#[derive(Debug, Clone)]
pub struct PlatformClient {
    base_url: String,
    token: String,
    client: Client,
    poll_interval: Duration,
    wait_timeout: Duration,
}

impl PlatformClient {
    /// Build a client from workspace configuration, reading the API token
    /// from `GANTRY_API_TOKEN`.
    pub fn from_config(config: &PlatformConfig) -> CloudResult<Self> {
        let token = env::var(TOKEN_ENV).map_err(|_| CloudError::MissingToken)?;
        Ok(Self::with_token(&config.base_url, token)
            .with_timing(config.poll_interval_secs, config.wait_timeout_secs))
    }

    /// Build a client with an explicit token.
    #[must_use]
    pub fn with_token(base_url: &str, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
            poll_interval: Duration::from_secs(15),
            wait_timeout: Duration::from_secs(4 * 3600),
        }
    }

    /// Override poll interval and wait timeout (seconds).
    #[must_use]
    pub fn with_timing(mut self, poll_interval_secs: u64, wait_timeout_secs: u64) -> Self {
        self.poll_interval = Duration::from_secs(poll_interval_secs);
        self.wait_timeout = Duration::from_secs(wait_timeout_secs);
        self
    }

    /// Seconds between status polls for blocking waits.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// How long blocking waits run before timing out.
    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CloudResult<T> {
        debug!(path = %path, "platform GET");
        let response = self.client.get(self.url(path)).bearer_auth(&self.token).send().await?;
        let response = Self::check(response, path).await?;
        Self::decode(response, path).await
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> CloudResult<T> {
        debug!(path = %path, "platform POST");
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let response = Self::check(response, path).await?;
        Self::decode(response, path).await
    }

    /// POST a JSON body where only the status matters.
    pub async fn post_accepted<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> CloudResult<()> {
        debug!(path = %path, "platform POST");
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::check(response, path).await?;
        Ok(())
    }

    /// PUT raw bytes (object uploads).
    pub async fn put_bytes(&self, path: &str, bytes: Vec<u8>) -> CloudResult<()> {
        debug!(path = %path, len = bytes.len(), "platform PUT");
        let response = self
            .client
            .put(self.url(path))
            .bearer_auth(&self.token)
            .body(bytes)
            .send()
            .await?;
        Self::check(response, path).await?;
        Ok(())
    }

    /// POST raw bytes and return the raw response body (endpoint invocation).
    pub async fn post_bytes(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> CloudResult<Vec<u8>> {
        debug!(path = %path, len = bytes.len(), "platform POST (bytes)");
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;
        let response = Self::check(response, path).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// DELETE a resource. A 404 becomes [`CloudError::NotFound`].
    pub async fn delete(&self, path: &str) -> CloudResult<()> {
        debug!(path = %path, "platform DELETE");
        let response = self.client.delete(self.url(path)).bearer_auth(&self.token).send().await?;
        Self::check(response, path).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response, context: &str) -> CloudResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CloudError::NotFound(context.to_string()));
        }
        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, context = %context, message = %message, "platform returned error status");
        Err(CloudError::Api { status: status.as_u16(), message })
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> CloudResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            error!(context = %context, error = %e, "failed to decode platform response");
            CloudError::MalformedResponse { context: context.to_string(), reason: e.to_string() }
        })
    }
}
