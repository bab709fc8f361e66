use std::path::PathBuf;

use relsync_core::{ReleaseMarker, latest_marker};

use crate::client::GitClient;
use crate::executor::GitExecutor;
use crate::git::GitError;

/// Where release markers for a repository come from.
#[allow(async_fn_in_trait)]
pub trait MarkerSource {
    /// All markers of `repository`, in the source's enumeration order.
    async fn markers(&self, repository: &str) -> Result<Vec<ReleaseMarker>, ResolveError>;
}

/// Latest marker of `repository`: the one whose commit is newest.
pub async fn resolve_latest<S: MarkerSource>(
    source: &S,
    repository: &str,
) -> Result<ReleaseMarker, ResolveError> {
    let markers = source.markers(repository).await?;
    let count = markers.len();
    let latest = latest_marker(markers).ok_or_else(|| ResolveError::NoMarkers {
        repository: repository.to_owned(),
    })?;
    tracing::debug!(repository, markers = count, latest = %latest.name, "latest marker resolved");
    Ok(latest)
}

/// Tags of local working copies under `root`.
///
/// The working copy must exist; callers check with
/// [`RelsyncConfig::existing_working_copy`](relsync_core::RelsyncConfig::existing_working_copy).
pub struct LocalTags<'a, E: GitExecutor> {
    git: &'a GitClient<E>,
    root: PathBuf,
}

impl<'a, E: GitExecutor> LocalTags<'a, E> {
    pub fn new(git: &'a GitClient<E>, root: impl Into<PathBuf>) -> Self {
        Self {
            git,
            root: root.into(),
        }
    }
}

impl<E: GitExecutor> MarkerSource for LocalTags<'_, E> {
    async fn markers(&self, repository: &str) -> Result<Vec<ReleaseMarker>, ResolveError> {
        let dir = self.root.join(repository);
        Ok(self.git.tags_with_timestamps(&dir).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("host rejected the access token (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("repository {owner}/{name} not found on host")]
    RepositoryNotFound { owner: String, name: String },

    #[error("repository {repository} has no release markers")]
    NoMarkers { repository: String },

    #[error("request to {url} failed")]
    Http { url: String, source: reqwest::Error },

    #[error("host returned HTTP {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("failed to read local tags")]
    Git {
        #[from]
        source: GitError,
    },
}

impl ResolveError {
    /// Repository absent or without markers.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RepositoryNotFound { .. } | Self::NoMarkers { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    struct Fixed(Vec<ReleaseMarker>);

    impl MarkerSource for Fixed {
        async fn markers(&self, _repository: &str) -> Result<Vec<ReleaseMarker>, ResolveError> {
            Ok(self.0.clone())
        }
    }

    fn marker(name: &str, secs: i64) -> ReleaseMarker {
        ReleaseMarker::new(name, Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[tokio::test]
    async fn empty_listing_is_no_markers() {
        let err = resolve_latest(&Fixed(vec![]), "docker-base")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoMarkers { ref repository } if repository == "docker-base"));
    }

    #[tokio::test]
    async fn newest_commit_wins() {
        let source = Fixed(vec![marker("b", 10), marker("c", 30), marker("a", 20)]);
        assert_eq!(resolve_latest(&source, "r").await.unwrap().name, "c");
    }

    #[tokio::test]
    async fn tie_keeps_first_enumerated() {
        let source = Fixed(vec![marker("first", 30), marker("second", 30)]);
        assert_eq!(resolve_latest(&source, "r").await.unwrap().name, "first");
    }
}
