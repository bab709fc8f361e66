use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use relsync_core::{IdentityConfig, ReleaseMarker};

use crate::executor::{GitExecutor, RealExecutor};
use crate::git::GitError;

/// `for-each-ref` format: tag name, peeled commit time (annotated tags),
/// own commit time (lightweight tags).
const TAG_FORMAT: &str = "--format=%(refname:strip=2)%09%(*committerdate:unix)%09%(committerdate:unix)";

/// Local git operations, parameterized over the executor for testability.
pub struct GitClient<E: GitExecutor = RealExecutor> {
    pub(crate) executor: E,
}

impl GitClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for GitClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GitExecutor> GitClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Inspection ──

    /// Installed git version, e.g. `git version 2.43.0`.
    pub async fn version(&self) -> Result<String, GitError> {
        let out = self.executor.exec(Path::new("."), &args(["--version"])).await?;
        Ok(out.trim().to_owned())
    }

    /// Whether `dir` is inside a work tree. A missing git is an error, not `false`.
    pub async fn is_repository(&self, dir: &Path) -> Result<bool, GitError> {
        match self
            .executor
            .exec(dir, &args(["rev-parse", "--is-inside-work-tree"]))
            .await
        {
            Ok(out) => Ok(out.trim() == "true"),
            Err(GitError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Every local tag with the commit time of the commit it points at.
    ///
    /// Read from the local object store in one call, in refname order.
    pub async fn tags_with_timestamps(&self, dir: &Path) -> Result<Vec<ReleaseMarker>, GitError> {
        let out = self
            .executor
            .exec(dir, &args(["for-each-ref", TAG_FORMAT, "refs/tags"]))
            .await?;

        let mut markers = Vec::new();
        for line in out.lines().filter(|line| !line.trim().is_empty()) {
            let marker = match parse_tag_line(line)? {
                TagLine::Dated(marker) => marker,
                TagLine::Nested(name) => self.peeled_tag(dir, name).await?,
            };
            markers.push(marker);
        }
        Ok(markers)
    }

    /// Commit time of a tag whose target is another tag, peeled to the commit.
    async fn peeled_tag(&self, dir: &Path, name: &str) -> Result<ReleaseMarker, GitError> {
        let target = format!("refs/tags/{name}^{{commit}}");
        let out = self
            .executor
            .exec(dir, &args(["log", "-1", "--format=%ct", &target, "--"]))
            .await?;
        let committed_at = unix_time(out.trim()).ok_or_else(|| GitError::UnexpectedOutput {
            command: "log",
            line: out.trim().to_owned(),
        })?;
        Ok(ReleaseMarker::new(name, committed_at))
    }

    /// Whether `path` differs from the last commit (modified, staged, or untracked).
    pub async fn has_changes(&self, dir: &Path, path: &Path) -> Result<bool, GitError> {
        let out = self
            .executor
            .exec(dir, &path_args(["status", "--porcelain", "--"], path))
            .await?;
        Ok(!out.trim().is_empty())
    }

    // ── Commits ──

    pub async fn stage(&self, dir: &Path, path: &Path) -> Result<(), GitError> {
        self.executor
            .exec(dir, &path_args(["add", "--"], path))
            .await?;
        Ok(())
    }

    /// Commit `path` only, with `identity` as both author and committer.
    pub async fn commit(
        &self,
        dir: &Path,
        path: &Path,
        message: &str,
        identity: &IdentityConfig,
    ) -> Result<(), GitError> {
        let mut cmd = identity_args(identity);
        cmd.extend(args(["commit", "-m", message, "--"]));
        cmd.push(path.display().to_string());
        self.executor.exec(dir, &cmd).await?;
        Ok(())
    }

    // ── Tags ──

    pub async fn tag_exists(&self, dir: &Path, name: &str) -> Result<bool, GitError> {
        let out = self
            .executor
            .exec(dir, &args(["tag", "--list", name]))
            .await?;
        Ok(out.lines().any(|line| line.trim() == name))
    }

    pub async fn delete_tag(&self, dir: &Path, name: &str) -> Result<(), GitError> {
        self.executor.exec(dir, &args(["tag", "-d", name])).await?;
        Ok(())
    }

    /// Create an annotated tag at HEAD.
    pub async fn create_tag(
        &self,
        dir: &Path,
        name: &str,
        message: &str,
        identity: &IdentityConfig,
    ) -> Result<(), GitError> {
        let mut cmd = identity_args(identity);
        cmd.extend(args(["tag", "-a", name, "-m", message]));
        self.executor.exec(dir, &cmd).await?;
        Ok(())
    }

    // ── Remote ──

    pub async fn remote_tag_exists(
        &self,
        dir: &Path,
        remote: &str,
        name: &str,
    ) -> Result<bool, GitError> {
        let refname = format!("refs/tags/{name}");
        let out = self
            .executor
            .exec(dir, &args(["ls-remote", "--tags", remote, &refname]))
            .await?;
        Ok(!out.trim().is_empty())
    }

    pub async fn delete_remote_tag(
        &self,
        dir: &Path,
        remote: &str,
        name: &str,
    ) -> Result<(), GitError> {
        let refname = format!("refs/tags/{name}");
        self.executor
            .exec(dir, &args(["push", remote, "--delete", &refname]))
            .await?;
        Ok(())
    }

    /// Force-push the current branch.
    pub async fn push_branch(&self, dir: &Path, remote: &str) -> Result<(), GitError> {
        self.executor
            .exec(dir, &args(["push", "--force", remote, "HEAD"]))
            .await?;
        Ok(())
    }

    pub async fn push_tag(&self, dir: &Path, remote: &str, name: &str) -> Result<(), GitError> {
        let refname = format!("refs/tags/{name}");
        self.executor
            .exec(dir, &args(["push", remote, &refname]))
            .await?;
        Ok(())
    }
}

// ── Helpers ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

fn path_args<const N: usize>(a: [&str; N], path: &Path) -> Vec<String> {
    let mut v = args(a);
    v.push(path.display().to_string());
    v
}

fn identity_args(identity: &IdentityConfig) -> Vec<String> {
    vec![
        "-c".to_owned(),
        format!("user.name={}", identity.name),
        "-c".to_owned(),
        format!("user.email={}", identity.email),
    ]
}

enum TagLine<'a> {
    Dated(ReleaseMarker),
    /// Annotated tag of an annotated tag: `for-each-ref` peels one level only.
    Nested(&'a str),
}

fn parse_tag_line(line: &str) -> Result<TagLine<'_>, GitError> {
    let unexpected = || GitError::UnexpectedOutput {
        command: "for-each-ref",
        line: line.to_owned(),
    };

    let mut fields = line.split('\t').map(str::trim);
    let (Some(name), Some(peeled), Some(own)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(unexpected());
    };
    if name.is_empty() {
        return Err(unexpected());
    }

    let stamp = match (peeled, own) {
        ("", "") => return Ok(TagLine::Nested(name)),
        ("", own) => own,
        (peeled, _) => peeled,
    };
    let committed_at = unix_time(stamp).ok_or_else(unexpected)?;
    Ok(TagLine::Dated(ReleaseMarker::new(name, committed_at)))
}

fn unix_time(stamp: &str) -> Option<DateTime<Utc>> {
    match stamp.parse::<i64>() {
        Ok(secs) => Utc.timestamp_opt(secs, 0).single(),
        Err(_) => None,
    }
}
