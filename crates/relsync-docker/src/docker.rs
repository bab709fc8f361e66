#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found (install: https://docs.docker.com/get-docker/)")]
    NotFound { source: std::io::Error },

    #[error("docker command failed: {args:?}\n{stdout}{stderr}")]
    CommandFailed {
        args: Vec<String>,
        stdout: String,
        stderr: String,
    },

    #[error("docker output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("failed to write to docker stdin")]
    StdinWrite { source: std::io::Error },
}
