//! Core types and configuration for relsync.
//!
//! This crate defines the `relsync.toml` schema ([`RelsyncConfig`]), the
//! release vocabulary ([`ReleaseDate`], [`ReleaseMarker`], [`ImageReference`]),
//! the fleet run policy ([`RunPolicy`], [`FleetRun`]), credential providers,
//! and shared error types.

pub mod config;
pub mod credentials;
pub mod error;
pub mod image;
pub mod release;
pub mod run;

pub use config::{
    CONFIG_FILE, CredentialsConfig, HostConfig, IdentityConfig, PolicyConfig, RegistryConfig,
    RelsyncConfig, RepositoryConfig, WorkspaceConfig,
};
pub use credentials::{CredentialKind, CredentialProvider, EnvCredentials, StaticCredentials};
pub use error::{Error, Result};
pub use image::{ImageReference, REPOSITORY_PREFIX};
pub use release::{ReleaseDate, ReleaseMarker, latest_marker};
pub use run::{FleetRun, RepositoryOutcome, RunPolicy, RunReport};
