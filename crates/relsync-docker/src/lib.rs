pub mod client;
pub mod docker;
pub mod executor;

pub use client::{
    BuildSource, CheckResult, DockerClient, DoctorReport, PublishError, WorkingCopyCheck,
};
pub use docker::DockerError;
pub use executor::{DockerExecutor, RealExecutor};
