pub mod client;
pub mod committer;
pub mod executor;
pub mod git;
pub mod github;
pub mod resolver;

pub use client::GitClient;
pub use committer::{CommitError, CommitOutcome, ReleaseRequest};
pub use executor::{GitExecutor, RealExecutor};
pub use git::GitError;
pub use github::GitHubHost;
pub use resolver::{LocalTags, MarkerSource, ResolveError, resolve_latest};
