//! Release commits and tags.
//!
//! ```text
//! commit_and_tag
//!   1. Write recipe      ── LF line endings
//!   2. Changed?          ── git status --porcelain -- <recipe>
//!   3. Commit            ── git add + git commit (skipped when unchanged)
//!   4. Clear tag         ── git tag -d; remote delete only if the remote has it
//!   5. Tag HEAD          ── git tag -a <tag> -m <message>
//!   6. Publish           ── git push --force <remote> HEAD; git push <remote> <tag>
//! ```
//!
//! Step 4 runs whether or not step 3 committed, so after a successful call
//! the tag always names the current tip. Nothing is rolled back: a failed
//! publish leaves the local commit and tag in place, and the call can simply
//! be repeated.

use std::fmt;
use std::path::Path;

use relsync_build::recipe::{RecipeError, write_normalized};
use relsync_core::IdentityConfig;

use crate::client::GitClient;
use crate::executor::GitExecutor;
use crate::git::GitError;

/// Everything needed to record one repository's release.
#[derive(Debug, Clone)]
pub struct ReleaseRequest<'a> {
    pub working_copy: &'a Path,
    /// Recipe path relative to the working copy.
    pub recipe: &'a Path,
    pub content: &'a str,
    pub commit_message: &'a str,
    pub tag_name: &'a str,
    pub tag_message: &'a str,
    pub identity: &'a IdentityConfig,
    pub remote: &'a str,
    pub publish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitOutcome {
    /// A new commit was created.
    pub committed: bool,
    /// A tag with the same name existed and was replaced.
    pub replaced_tag: bool,
    /// Branch and tag were pushed.
    pub published: bool,
}

impl fmt::Display for CommitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.committed {
            "committed"
        } else {
            "unchanged"
        })?;
        f.write_str(if self.replaced_tag {
            ", tag replaced"
        } else {
            ", tagged"
        })?;
        if self.published {
            f.write_str(", pushed")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error("{step} failed")]
    Local {
        step: &'static str,
        source: GitError,
    },

    #[error("{step} failed; local commit and tag were kept")]
    Publish {
        step: &'static str,
        source: GitError,
    },
}

impl CommitError {
    /// Whether local state was recorded but not published.
    pub fn is_publish_failure(&self) -> bool {
        matches!(self, Self::Publish { .. })
    }
}

fn local(step: &'static str) -> impl FnOnce(GitError) -> CommitError {
    move |source| CommitError::Local { step, source }
}

fn publish(step: &'static str) -> impl FnOnce(GitError) -> CommitError {
    move |source| CommitError::Publish { step, source }
}

impl<E: GitExecutor> GitClient<E> {
    /// Write the recipe, commit it if it changed, and (re)tag the tip.
    pub async fn commit_and_tag(
        &self,
        request: &ReleaseRequest<'_>,
    ) -> Result<CommitOutcome, CommitError> {
        let dir = request.working_copy;
        let mut outcome = CommitOutcome::default();

        // 1. Write
        write_normalized(&dir.join(request.recipe), request.content)?;

        // 2-3. Commit only when the recipe differs from the last commit
        if self
            .has_changes(dir, request.recipe)
            .await
            .map_err(local("git status"))?
        {
            self.stage(dir, request.recipe)
                .await
                .map_err(local("git add"))?;
            self.commit(dir, request.recipe, request.commit_message, request.identity)
                .await
                .map_err(local("git commit"))?;
            outcome.committed = true;
            tracing::info!(dir = %dir.display(), "release commit created");
        } else {
            tracing::info!(dir = %dir.display(), "recipe unchanged; no commit");
        }

        // 4. Clear any tag with the same name
        if self
            .tag_exists(dir, request.tag_name)
            .await
            .map_err(local("git tag --list"))?
        {
            self.delete_tag(dir, request.tag_name)
                .await
                .map_err(local("git tag -d"))?;
            outcome.replaced_tag = true;
            tracing::info!(tag = request.tag_name, "deleted existing local tag");

            if request.publish {
                let on_remote = self
                    .remote_tag_exists(dir, request.remote, request.tag_name)
                    .await
                    .map_err(publish("git ls-remote"))?;
                if on_remote {
                    self.delete_remote_tag(dir, request.remote, request.tag_name)
                        .await
                        .map_err(publish("deleting remote tag"))?;
                    tracing::info!(
                        tag = request.tag_name,
                        remote = request.remote,
                        "deleted remote tag"
                    );
                } else {
                    tracing::warn!(
                        tag = request.tag_name,
                        remote = request.remote,
                        "tag not on remote; nothing to delete"
                    );
                }
            }
        }

        // 5. Tag the tip
        self.create_tag(dir, request.tag_name, request.tag_message, request.identity)
            .await
            .map_err(local("git tag -a"))?;

        // 6. Publish
        if request.publish {
            tracing::info!(remote = request.remote, "pushing changes");
            self.push_branch(dir, request.remote)
                .await
                .map_err(publish("git push --force"))?;
            self.push_tag(dir, request.remote, request.tag_name)
                .await
                .map_err(publish("git push tag"))?;
            outcome.published = true;
            tracing::info!(
                tag = request.tag_name,
                remote = request.remote,
                "release pushed"
            );
        }

        Ok(outcome)
    }
}
