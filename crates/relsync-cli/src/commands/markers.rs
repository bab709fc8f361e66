use relsync_core::{CredentialKind, CredentialProvider, ReleaseMarker, RelsyncConfig};
use relsync_vcs::{GitClient, GitHubHost, LocalTags, MarkerSource, ResolveError};

/// Release markers from the host API or from local working copies.
pub enum Markers<'a> {
    Host(GitHubHost),
    Local(LocalTags<'a, relsync_vcs::RealExecutor>),
}

impl<'a> Markers<'a> {
    pub async fn open(
        config: &RelsyncConfig,
        git: &'a GitClient,
        local: bool,
        provider: &dyn CredentialProvider,
    ) -> anyhow::Result<Self> {
        if local {
            return Ok(Self::Local(LocalTags::new(git, config.workspace.root.clone())));
        }

        let token = super::required_secret(
            provider,
            CredentialKind::Host,
            config.host.owner.as_deref(),
            &config.credentials.host_env,
        )?;
        let host =
            GitHubHost::connect(&config.host.api_url, token, config.host.owner.as_deref()).await?;
        tracing::debug!(owner = host.owner(), "connected to host");
        Ok(Self::Host(host))
    }

    /// Owner on the host; `None` for local working copies.
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::Host(host) => Some(host.owner()),
            Self::Local(_) => None,
        }
    }
}

impl MarkerSource for Markers<'_> {
    async fn markers(&self, repository: &str) -> Result<Vec<ReleaseMarker>, ResolveError> {
        match self {
            Self::Host(host) => host.markers(repository).await,
            Self::Local(tags) => tags.markers(repository).await,
        }
    }
}
