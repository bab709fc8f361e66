use std::path::Path;

use crate::git::GitError;

/// Abstraction over git CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait GitExecutor: Send + Sync {
    /// Run `git -C <dir> <args>` and capture stdout.
    async fn exec(&self, dir: &Path, args: &[String]) -> Result<String, GitError>;
}

/// Real git CLI executor.
pub struct RealExecutor;

impl GitExecutor for RealExecutor {
    async fn exec(&self, dir: &Path, args: &[String]) -> Result<String, GitError> {
        use std::process::Stdio;

        tracing::debug!(dir = %dir.display(), ?args, "git");

        let output = tokio::process::Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| GitError::NotFound { source: e })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| GitError::InvalidUtf8 { source: e })
        } else {
            Err(GitError::CommandFailed {
                args: args.to_vec(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}
