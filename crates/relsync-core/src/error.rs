use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("repository '{name}' is listed more than once in the fleet")]
    DuplicateRepository { name: String },

    // ── Preconditions (fatal for the whole run) ──
    #[error(
        "repository name '{name}' must start with '{prefix}' followed by an image name",
        prefix = crate::image::REPOSITORY_PREFIX
    )]
    MissingImagePrefix { name: String },

    #[error("working copy not found at {path}")]
    MissingWorkingCopy { path: PathBuf },

    // ── Release dates ──
    #[error("invalid release date {value:?}: {reason}")]
    InvalidReleaseDate { value: String, reason: &'static str },

    // ── Credentials ──
    #[error("failed to read {kind} credential")]
    CredentialRead {
        kind: crate::credentials::CredentialKind,
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error is a configuration or programming defect that must
    /// stop the whole run instead of being recorded against one repository.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingImagePrefix { .. }
                | Self::MissingWorkingCopy { .. }
                | Self::DuplicateRepository { .. }
        )
    }
}
