use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::RunPolicy;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "relsync.toml";

/// Placeholder in commit and tag messages replaced by the ISO release date.
pub const DATE_PLACEHOLDER: &str = "{date}";

/// relsync.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelsyncConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// The fleet, in processing order.
    #[serde(default, rename = "repository")]
    pub repositories: Vec<RepositoryConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry account images are published under
    #[serde(default)]
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Owner of the fleet repositories (defaults to the token's user)
    pub owner: Option<String>,
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Web base URL, used to build clone URLs
    #[serde(default = "default_web_url")]
    pub web_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Folder holding one working copy per repository
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Recipe file inside each working copy
    #[serde(default = "default_recipe")]
    pub recipe: PathBuf,
    /// Remote that releases are published to
    #[serde(default = "default_remote")]
    pub remote: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_name")]
    pub name: String,
    #[serde(default = "default_identity_email")]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_build_policy")]
    pub build: RunPolicy,
    #[serde(default = "default_sync_policy")]
    pub sync: RunPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Environment variable holding the host API token
    #[serde(default = "default_host_env")]
    pub host_env: String,
    /// Environment variable holding the registry token
    #[serde(default = "default_registry_env")]
    pub registry_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    #[serde(default = "default_tag_message")]
    pub tag_message: String,
}

impl RepositoryConfig {
    pub fn commit_message_for(&self, iso_date: &str) -> String {
        self.commit_message.replace(DATE_PLACEHOLDER, iso_date)
    }

    pub fn tag_message_for(&self, iso_date: &str) -> String {
        self.tag_message.replace(DATE_PLACEHOLDER, iso_date)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            owner: None,
            api_url: default_api_url(),
            web_url: default_web_url(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            recipe: default_recipe(),
            remote: default_remote(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_identity_name(),
            email: default_identity_email(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            build: default_build_policy(),
            sync: default_sync_policy(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            host_env: default_host_env(),
            registry_env: default_registry_env(),
        }
    }
}

impl RelsyncConfig {
    /// Load from relsync.toml in the given directory, or return defaults if not found.
    pub fn load(dir: &Path) -> crate::Result<Self> {
        Self::load_file(&dir.join(CONFIG_FILE))
    }

    /// Load from an explicit path, or return defaults if it does not exist.
    ///
    /// A relative `workspace.root` is resolved against the file's directory.
    pub fn load_file(config_path: &Path) -> crate::Result<Self> {
        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;
            toml::from_str::<Self>(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path.to_path_buf(),
                source: e,
            })?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file; using defaults");
            Self::default()
        };

        if config.workspace.root.is_relative() {
            if let Some(base) = config_path.parent() {
                config.workspace.root = base.join(&config.workspace.root);
            }
        }

        config.validate()?;
        tracing::debug!(
            path = %config_path.display(),
            repositories = config.repositories.len(),
            root = %config.workspace.root.display(),
            "config loaded"
        );
        Ok(config)
    }

    /// Every repository must carry the image prefix, and appear once.
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for repo in &self.repositories {
            crate::image::image_name(&repo.name)?;
            if !seen.insert(repo.name.as_str()) {
                return Err(crate::Error::DuplicateRepository {
                    name: repo.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Repositories to process, optionally narrowed to `only` (fleet order kept).
    pub fn select(&self, only: &[String]) -> Vec<&RepositoryConfig> {
        self.repositories
            .iter()
            .filter(|r| only.is_empty() || only.iter().any(|o| *o == r.name))
            .collect()
    }

    /// Path of the working copy for `repository`.
    pub fn working_copy(&self, repository: &str) -> PathBuf {
        self.workspace.root.join(repository)
    }

    /// Working copy path, failing if it is not there.
    pub fn existing_working_copy(&self, repository: &str) -> crate::Result<PathBuf> {
        let path = self.working_copy(repository);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(crate::Error::MissingWorkingCopy { path })
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_web_url() -> String {
    "https://github.com".to_owned()
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_recipe() -> PathBuf {
    PathBuf::from("Dockerfile")
}

fn default_remote() -> String {
    "origin".to_owned()
}

fn default_identity_name() -> String {
    "relsync".to_owned()
}

fn default_identity_email() -> String {
    "relsync@localhost".to_owned()
}

fn default_build_policy() -> RunPolicy {
    RunPolicy::FailFast
}

fn default_sync_policy() -> RunPolicy {
    RunPolicy::ContinueOnError
}

fn default_host_env() -> String {
    "GITHUB_TOKEN".to_owned()
}

fn default_registry_env() -> String {
    "DOCKER_TOKEN".to_owned()
}

fn default_commit_message() -> String {
    "Build from {date} base image release.".to_owned()
}

fn default_tag_message() -> String {
    "From {date} base image release.".to_owned()
}
