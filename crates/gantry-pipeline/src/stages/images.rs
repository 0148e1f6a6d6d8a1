//! Image build & publish: descriptor fetch, registry auth, per-arch build loop.

use crate::error::PipelineResult;
use crate::services::CloudServices;
use gantry_cloud::{ensure_repository, fetch_text, RepositoryInfo};
use gantry_core::{Arch, BuildOutputs, ImageConfig, SessionIdentity, Workspace};
use std::path::PathBuf;
use tracing::{debug, info};

/// Build context and repository shared by both architecture variants.
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub repository: RepositoryInfo,
    pub context_dir: PathBuf,
}

/// One-time setup for the build loop: ensure the repository exists, fetch the
/// build descriptor into the workspace build context, and log into both the
/// target registry and the registry hosting the base image.
pub async fn prepare_build(
    identity: &SessionIdentity,
    services: &CloudServices,
    config: &ImageConfig,
    workspace: &Workspace,
) -> PipelineResult<PreparedBuild> {
    debug!(
        account = %identity.account_id,
        repository = %config.name,
        "Preparing image build"
    );

    services.containers.verify().await?;
    let repository = ensure_repository(services.registry.as_ref(), &config.name).await?;

    let context_dir = workspace.build_dir();
    std::fs::create_dir_all(&context_dir)?;
    let descriptor = fetch_text(&config.descriptor_url).await?;
    std::fs::write(context_dir.join("Dockerfile"), descriptor)?;

    // Target registry first, then the one the base image is pulled from.
    let target_host = repository.uri.split('/').next().unwrap_or(&repository.uri);
    for host in [target_host, config.base_registry.as_str()] {
        let credential = services.registry.authorization(host).await?;
        services
            .containers
            .login(&credential.endpoint, &credential.username, &credential.password)
            .await?;
    }

    Ok(PreparedBuild { repository, context_dir })
}

/// Builds, tags, and pushes one architecture variant.
pub async fn publish_variant(
    services: &CloudServices,
    config: &ImageConfig,
    prepared: &PreparedBuild,
    arch: Arch,
) -> PipelineResult<BuildOutputs> {
    let tag = config.tag_for(arch);
    let local_tag = format!("{}:{tag}", config.name);
    let remote_tag = format!("{}:{tag}", prepared.repository.uri);

    let build_args = vec![("ARCH".to_string(), arch.as_str().to_string())];
    services.containers.build(&prepared.context_dir, &local_tag, &build_args).await?;
    services.containers.tag(&local_tag, &remote_tag).await?;
    services.containers.push(&remote_tag).await?;
    info!(tag = %remote_tag, "Published image variant");

    Ok(BuildOutputs { arch, local_tag, remote_tag })
}

/// The whole stage: prepare once, then both variants in build order.
///
/// The first failing variant aborts the loop; a variant already pushed stays
/// in the registry.
pub async fn build_and_publish(
    identity: &SessionIdentity,
    services: &CloudServices,
    config: &ImageConfig,
    workspace: &Workspace,
) -> PipelineResult<Vec<BuildOutputs>> {
    let prepared = prepare_build(identity, services, config, workspace).await?;
    let mut published = Vec::with_capacity(Arch::ALL.len());
    for arch in Arch::ALL {
        published.push(publish_variant(services, config, &prepared, arch).await?);
    }
    Ok(published)
}
