//! Release markers from a GitHub (or GitHub Enterprise) host.
//!
//! One request resolves the repository, one per page lists its tags, and
//! then one request per tag fetches the tagged commit's committer date.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::resolver::{MarkerSource, ResolveError};
use relsync_core::ReleaseMarker;

const PAGE_SIZE: usize = 100;
const USER_AGENT: &str = concat!("relsync/", env!("CARGO_PKG_VERSION"));

/// Host API client for one owner's repositories.
pub struct GitHubHost {
    http: reqwest::Client,
    api_url: String,
    token: SecretString,
    owner: String,
}

#[derive(Deserialize)]
struct User {
    login: String,
}

#[derive(Deserialize)]
struct Tag {
    name: String,
    commit: TagCommit,
}

#[derive(Deserialize)]
struct TagCommit {
    sha: String,
}

#[derive(Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    committer: Signature,
}

#[derive(Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

impl GitHubHost {
    /// Connect to the host; when `owner` is `None` the token's user is used.
    pub async fn connect(
        api_url: &str,
        token: SecretString,
        owner: Option<&str>,
    ) -> Result<Self, ResolveError> {
        let mut host = Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_owned(),
            token,
            owner: String::new(),
        };

        host.owner = match owner {
            Some(owner) => owner.to_owned(),
            None => {
                let user: User = host.get_present(&format!("{}/user", host.api_url)).await?;
                tracing::debug!(login = %user.login, "host owner resolved from token");
                user.login
            }
        };

        Ok(host)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// GET `url` as JSON; `None` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, ResolveError> {
        tracing::debug!(url, "host GET");
        let http_err = |e| ResolveError::Http {
            url: url.to_owned(),
            source: e,
        };

        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(http_err)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ResolveError::Unauthorized {
                status: response.status().as_u16(),
            }),
            status if status.is_success() => response.json().await.map(Some).map_err(http_err),
            status => Err(ResolveError::UnexpectedStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            }),
        }
    }

    /// GET `url` as JSON where a 404 is not an expected answer.
    async fn get_present<T: DeserializeOwned>(&self, url: &str) -> Result<T, ResolveError> {
        self.get_json(url)
            .await?
            .ok_or_else(|| ResolveError::UnexpectedStatus {
                url: url.to_owned(),
                status: StatusCode::NOT_FOUND.as_u16(),
            })
    }

    async fn tags(&self, repo_url: &str) -> Result<Vec<Tag>, ResolveError> {
        let mut tags = Vec::new();
        for page in 1.. {
            let url = format!("{repo_url}/tags?per_page={PAGE_SIZE}&page={page}");
            let batch: Vec<Tag> = self.get_present(&url).await?;
            let last = batch.len() < PAGE_SIZE;
            tags.extend(batch);
            if last {
                break;
            }
        }
        Ok(tags)
    }
}

impl MarkerSource for GitHubHost {
    async fn markers(&self, repository: &str) -> Result<Vec<ReleaseMarker>, ResolveError> {
        let repo_url = format!("{}/repos/{}/{}", self.api_url, self.owner, repository);
        let not_found = || ResolveError::RepositoryNotFound {
            owner: self.owner.clone(),
            name: repository.to_owned(),
        };

        let _repo: serde::de::IgnoredAny = self.get_json(&repo_url).await?.ok_or_else(not_found)?;

        let tags = self.tags(&repo_url).await?;
        let mut markers = Vec::with_capacity(tags.len());
        for tag in tags {
            let url = format!("{repo_url}/commits/{}", tag.commit.sha);
            let entry: CommitEntry = self.get_present(&url).await?;
            markers.push(ReleaseMarker::new(tag.name, entry.commit.committer.date));
        }

        tracing::debug!(repository, markers = markers.len(), "host markers listed");
        Ok(markers)
    }
}
