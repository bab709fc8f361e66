use std::fmt;
use std::path::PathBuf;

use relsync_core::ImageReference;
use secrecy::{ExposeSecret, SecretString};

use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor};

/// Image build and registry operations, parameterized over the executor for
/// testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the build context comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSource {
    /// Remote git URL at a release marker (`url#marker`).
    Remote { url: String, marker: String },
    /// Local working copy.
    Local(PathBuf),
}

impl BuildSource {
    /// Build context argument passed to `docker build`.
    pub fn locator(&self) -> String {
        match self {
            Self::Remote { url, marker } => format!("{url}#{marker}"),
            Self::Local(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for BuildSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.locator())
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    pub async fn version(&self) -> Result<String, DockerError> {
        let out = self
            .executor
            .exec(&args(["version", "--format", "{{.Client.Version}}"]))
            .await?;
        Ok(out.trim().to_owned())
    }

    pub async fn build(
        &self,
        image: &ImageReference,
        source: &BuildSource,
    ) -> Result<(), DockerError> {
        let image = image.to_string();
        let locator = source.locator();
        self.executor
            .exec(&args(["build", "--tag", &image, &locator]))
            .await?;
        Ok(())
    }

    /// Log in to the registry with the credential passed on stdin.
    pub async fn login(
        &self,
        account: &str,
        credential: &SecretString,
    ) -> Result<(), DockerError> {
        self.executor
            .exec_with_stdin(
                &args(["login", "--username", account, "--password-stdin"]),
                credential.expose_secret().as_bytes(),
            )
            .await?;
        Ok(())
    }

    pub async fn push(&self, image: &ImageReference) -> Result<(), DockerError> {
        let image = image.to_string();
        self.executor.exec(&args(["push", &image])).await?;
        Ok(())
    }

    pub async fn tag(
        &self,
        source: &ImageReference,
        target: &ImageReference,
    ) -> Result<(), DockerError> {
        let (source, target) = (source.to_string(), target.to_string());
        self.executor.exec(&args(["tag", &source, &target])).await?;
        Ok(())
    }

    /// Build `image` from `source`; with a credential, also publish it and
    /// move the `latest` alias onto it.
    ///
    /// The first failing step aborts the rest. Returns the built reference.
    pub async fn build_and_publish(
        &self,
        image: &ImageReference,
        source: &BuildSource,
        credential: Option<&SecretString>,
    ) -> Result<ImageReference, PublishError> {
        tracing::info!(%image, %source, "building image");
        self.build(image, source)
            .await
            .map_err(|e| PublishError::Build {
                image: image.to_string(),
                source: e,
            })?;

        let Some(credential) = credential else {
            tracing::debug!(%image, "no registry credential; skipping publish");
            return Ok(image.clone());
        };

        let account = image.account();
        self.login(account, credential)
            .await
            .map_err(|e| PublishError::Login {
                account: account.to_owned(),
                source: e,
            })?;

        tracing::info!(%image, "pushing image");
        self.push(image).await.map_err(|e| PublishError::Push {
            image: image.to_string(),
            source: e,
        })?;

        let latest = image.latest();
        self.tag(image, &latest)
            .await
            .map_err(|e| PublishError::Retag {
                image: latest.to_string(),
                source: e,
            })?;
        self.push(&latest).await.map_err(|e| PublishError::PushLatest {
            image: latest.to_string(),
            source: e,
        })?;

        Ok(image.clone())
    }

    // ── Doctor ──

    /// Check the docker CLI and daemon without early return.
    pub async fn doctor(&self) -> DoctorReport {
        let mut report = DoctorReport::default();

        match self.version().await {
            Ok(v) => report.docker = CheckResult::ok(&v),
            Err(e) => {
                report.docker = CheckResult::fail(&e.to_string());
                report.daemon = CheckResult::fail("docker CLI unavailable");
                return report;
            }
        }

        match self
            .executor
            .exec(&args(["info", "--format", "{{.ServerVersion}}"]))
            .await
        {
            Ok(v) if !v.trim().is_empty() => report.daemon = CheckResult::ok(v.trim()),
            _ => report.daemon = CheckResult::fail("daemon not reachable"),
        }

        report
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub docker: CheckResult,
    pub daemon: CheckResult,
    pub git: CheckResult,
    pub config_file: CheckResult,
    pub working_copies: Vec<WorkingCopyCheck>,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.docker.passed
            && self.daemon.passed
            && self.git.passed
            && self.config_file.passed
            && self.working_copies.iter().all(|c| c.result.passed)
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("docker CLI", &self.docker),
            ("docker daemon", &self.daemon),
            ("git", &self.git),
            ("relsync.toml", &self.config_file),
        ];
        for (label, check) in rows {
            writeln!(f, "  {}  {label:<24} {}", check.icon(), check.detail)?;
        }
        for copy in &self.working_copies {
            writeln!(
                f,
                "  {}  {:<24} {}",
                copy.result.icon(),
                copy.name,
                copy.result.detail
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

#[derive(Debug, Clone)]
pub struct WorkingCopyCheck {
    pub name: String,
    pub result: CheckResult,
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("docker build of {image} failed")]
    Build { image: String, source: DockerError },

    #[error("registry login as {account} failed")]
    Login { account: String, source: DockerError },

    #[error("docker push of {image} failed")]
    Push { image: String, source: DockerError },

    #[error("retagging as {image} failed")]
    Retag { image: String, source: DockerError },

    #[error("docker push of {image} failed")]
    PushLatest { image: String, source: DockerError },
}
