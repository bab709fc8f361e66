//! Credential providers.
//!
//! The workflows ask for "a secret for account X" and do not care where it
//! comes from. Secrets are [`SecretString`]s so they never end up in debug
//! output or logs.

use std::collections::HashMap;
use std::fmt;

use secrecy::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Access token for the source-control host API.
    Host,
    /// Access token for the container registry.
    Registry,
}

impl CredentialKind {
    /// "registry token for acct", or just "host token" when the account is unknown.
    pub fn token_label(self, account: Option<&str>) -> String {
        match account {
            Some(account) => format!("{self} token for {account}"),
            None => format!("{self} token"),
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Host => "host",
            Self::Registry => "registry",
        })
    }
}

/// Supplies secrets on demand.
pub trait CredentialProvider {
    /// Secret for `account` (`None` when not known yet), or `None` when the
    /// provider has none.
    fn secret(
        &self,
        kind: CredentialKind,
        account: Option<&str>,
    ) -> crate::Result<Option<SecretString>>;
}

/// Reads secrets from environment variables, after loading `.env` if present.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    host_var: String,
    registry_var: String,
}

impl EnvCredentials {
    pub fn new(config: &crate::CredentialsConfig) -> Self {
        let dotenv_loaded = dotenvy::dotenv().is_ok();
        tracing::debug!(dotenv = dotenv_loaded, "loading credentials from environment");
        Self {
            host_var: config.host_env.clone(),
            registry_var: config.registry_env.clone(),
        }
    }

    fn var_for(&self, kind: CredentialKind) -> &str {
        match kind {
            CredentialKind::Host => &self.host_var,
            CredentialKind::Registry => &self.registry_var,
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn secret(
        &self,
        kind: CredentialKind,
        account: Option<&str>,
    ) -> crate::Result<Option<SecretString>> {
        let var = self.var_for(kind);
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                tracing::debug!(%kind, ?account, var, "credential found in environment");
                Ok(Some(SecretString::from(value.trim().to_owned())))
            }
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(crate::Error::CredentialRead {
                kind,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("{var} is not valid unicode"),
                ),
            }),
        }
    }
}

/// Fixed secrets, keyed by kind.
#[derive(Default, Clone)]
pub struct StaticCredentials {
    secrets: HashMap<CredentialKind, SecretString>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: CredentialKind, secret: impl Into<String>) -> Self {
        self.secrets.insert(kind, SecretString::from(secret.into()));
        self
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("kinds", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CredentialProvider for StaticCredentials {
    fn secret(
        &self,
        kind: CredentialKind,
        _account: Option<&str>,
    ) -> crate::Result<Option<SecretString>> {
        Ok(self.secrets.get(&kind).cloned())
    }
}
