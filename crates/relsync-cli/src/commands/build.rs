use std::path::Path;

use relsync_core::{
    CredentialKind, FleetRun, ImageReference, RelsyncConfig, RepositoryConfig, RunPolicy,
};
use relsync_docker::{BuildSource, DockerClient};
use relsync_vcs::{GitClient, resolve_latest};
use secrecy::SecretString;

use super::markers::Markers;

pub struct BuildOptions {
    pub local: bool,
    pub push: bool,
    pub prompt: bool,
    pub policy: Option<RunPolicy>,
    pub only: Vec<String>,
}

/// Build (and optionally publish) every repository's image from its latest
/// release marker.
pub async fn build(config_path: &Path, options: &BuildOptions) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let fleet = super::select_fleet(&config, &options.only)?;

    let account = config.registry.account.as_str();
    if account.is_empty() {
        anyhow::bail!("registry account not set. Set [registry].account in relsync.toml.");
    }

    let provider = super::credential_provider(&config, options.prompt);
    let credential = if options.push {
        Some(super::required_secret(
            provider.as_ref(),
            CredentialKind::Registry,
            Some(account),
            &config.credentials.registry_env,
        )?)
    } else {
        None
    };

    let git = GitClient::new();
    let markers = Markers::open(&config, &git, options.local, provider.as_ref()).await?;
    let docker = DockerClient::new();

    let policy = match options.policy {
        Some(policy) => policy,
        None => config.policy.build,
    };
    let mut run = FleetRun::new(policy);

    for repo in fleet {
        println!("In repo {}", repo.name);
        if options.local {
            config.existing_working_copy(&repo.name)?;
        }

        let result = build_one(&config, repo, &markers, &docker, credential.as_ref()).await;
        if super::record(&mut run, &repo.name, result)?.is_break() {
            break;
        }
    }

    super::finish(&run.finish())
}

async fn build_one(
    config: &RelsyncConfig,
    repo: &RepositoryConfig,
    markers: &Markers<'_>,
    docker: &DockerClient,
    credential: Option<&SecretString>,
) -> anyhow::Result<String> {
    let marker = resolve_latest(markers, &repo.name).await?;
    println!("  latest marker: {}", marker.name);

    let image = ImageReference::for_repository(&repo.name, &config.registry.account, &marker.name)?;

    let source = match markers.owner() {
        Some(owner) => BuildSource::Remote {
            url: format!(
                "{}/{owner}/{}.git",
                config.host.web_url.trim_end_matches('/'),
                repo.name
            ),
            marker: marker.name.clone(),
        },
        None => BuildSource::Local(config.existing_working_copy(&repo.name)?),
    };

    let built = docker
        .build_and_publish(&image, &source, credential)
        .await?;

    Ok(if credential.is_some() {
        format!("{built} (pushed, latest moved)")
    } else {
        format!("{built} (built)")
    })
}
