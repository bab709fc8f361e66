#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git not found (install git and make sure it is on PATH)")]
    NotFound { source: std::io::Error },

    #[error("git command failed: {args:?}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        args: Vec<String>,
        stdout: String,
        stderr: String,
    },

    #[error("git output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("unexpected git output for {command}: {line:?}")]
    UnexpectedOutput { command: &'static str, line: String },
}
