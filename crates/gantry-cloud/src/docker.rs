//! Container-engine driver for image builds.

use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// The subset of a container engine the image stage needs.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Confirm the engine is reachable before a build starts.
    async fn verify(&self) -> CloudResult<()> {
        Ok(())
    }

    /// Authenticate against a registry host.
    async fn login(&self, host: &str, username: &str, password: &str) -> CloudResult<()>;

    /// Build `context_dir` into an image tagged `tag`.
    async fn build(
        &self,
        context_dir: &Path,
        tag: &str,
        build_args: &[(String, String)],
    ) -> CloudResult<()>;

    /// Apply an additional tag to an existing image.
    async fn tag(&self, source: &str, target: &str) -> CloudResult<()>;

    /// Push a fully-qualified reference.
    async fn push(&self, reference: &str) -> CloudResult<()>;
}

/// Container engine backed by the `docker` CLI.
///
/// Construction never touches the binary; the image stage calls `verify`
/// before its first docker command.
#[derive(Default)]
pub struct DockerCli;

impl DockerCli {
    pub fn new() -> Self {
        Self
    }

    /// Builds the docker build command arguments.
    fn build_args(context_dir: &Path, tag: &str, build_args: &[(String, String)]) -> Vec<String> {
        let mut args = vec!["build".to_string(), "-t".to_string(), tag.to_string()];
        for (key, value) in build_args {
            args.push("--build-arg".to_string());
            args.push(format!("{key}={value}"));
        }
        args.push(context_dir.display().to_string());
        args
    }

    async fn run(args: &[String]) -> CloudResult<()> {
        debug!(args = ?args, "running docker");
        let output = Command::new("docker").args(args).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let verb = args.first().map_or("", String::as_str);
            return Err(CloudError::Container(format!("docker {verb} failed: {}", stderr.trim())));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn verify(&self) -> CloudResult<()> {
        Command::new("docker")
            .arg("--version")
            .output()
            .await
            .map_err(|e| CloudError::Container(format!("docker not found: {e}")))?;
        Ok(())
    }

    async fn login(&self, host: &str, username: &str, password: &str) -> CloudResult<()> {
        // Password goes over stdin so it never appears in the process list.
        let mut child = Command::new("docker")
            .args(["login", "--username", username, "--password-stdin", host])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(password.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CloudError::Container(format!(
                "docker login to {host} failed: {}",
                stderr.trim()
            )));
        }
        info!(host = %host, "registry login succeeded");
        Ok(())
    }

    async fn build(
        &self,
        context_dir: &Path,
        tag: &str,
        build_args: &[(String, String)],
    ) -> CloudResult<()> {
        let args = Self::build_args(context_dir, tag, build_args);
        Self::run(&args).await?;
        info!(tag = %tag, "image built");
        Ok(())
    }

    async fn tag(&self, source: &str, target: &str) -> CloudResult<()> {
        Self::run(&["tag".to_string(), source.to_string(), target.to_string()]).await
    }

    async fn push(&self, reference: &str) -> CloudResult<()> {
        Self::run(&["push".to_string(), reference.to_string()]).await?;
        info!(reference = %reference, "image pushed");
        Ok(())
    }
}
