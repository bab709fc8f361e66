mod build;
mod credentials;
mod doctor;
mod init;
mod latest;
mod markers;
mod sync;

use std::ops::ControlFlow;
use std::path::Path;

use relsync_core::{
    CredentialKind, CredentialProvider, EnvCredentials, FleetRun, RelsyncConfig, RepositoryConfig,
    RunReport,
};
use secrecy::SecretString;

pub use build::{BuildOptions, build};
pub use doctor::doctor;
pub use init::init;
pub use latest::latest;
pub use sync::{SyncOptions, sync};

/// Repositories to process, narrowed to `only`.
fn select_fleet<'a>(
    config: &'a RelsyncConfig,
    only: &[String],
) -> anyhow::Result<Vec<&'a RepositoryConfig>> {
    if config.repositories.is_empty() {
        anyhow::bail!("no repositories configured. Run `relsync init` or add [[repository]] entries.");
    }
    let selected = config.select(only);
    if selected.is_empty() {
        anyhow::bail!("none of {only:?} is in the fleet");
    }
    Ok(selected)
}

fn load_config(path: &Path) -> anyhow::Result<RelsyncConfig> {
    Ok(RelsyncConfig::load_file(path)?)
}

/// Credential source for this invocation.
fn credential_provider(config: &RelsyncConfig, prompt: bool) -> Box<dyn CredentialProvider> {
    if prompt {
        Box::new(credentials::PromptCredentials)
    } else {
        Box::new(EnvCredentials::new(&config.credentials))
    }
}

/// A secret that the run cannot go without.
fn required_secret(
    provider: &dyn CredentialProvider,
    kind: CredentialKind,
    account: Option<&str>,
    env_var: &str,
) -> anyhow::Result<SecretString> {
    provider.secret(kind, account)?.ok_or_else(|| {
        anyhow::anyhow!(
            "no {}. Set {env_var} or pass --prompt.",
            kind.token_label(account)
        )
    })
}

/// Record one repository's result.
///
/// Precondition violations are configuration defects: they end the run with
/// an error whatever the policy.
fn record(
    run: &mut FleetRun,
    repository: &str,
    result: anyhow::Result<String>,
) -> anyhow::Result<ControlFlow<()>> {
    match result {
        Err(e)
            if e.downcast_ref::<relsync_core::Error>()
                .is_some_and(relsync_core::Error::is_precondition) =>
        {
            Err(e)
        }
        other => Ok(run.record(repository, other.map_err(|e| format!("{e:#}")))),
    }
}

/// Print the report; failures make the command fail.
fn finish(report: &RunReport) -> anyhow::Result<()> {
    println!();
    print!("{report}");

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!(
            "{failed} of {} repositories failed (see above for details)",
            report.outcomes.len()
        );
    }
    Ok(())
}
