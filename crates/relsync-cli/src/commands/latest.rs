use std::path::Path;

use relsync_core::{FleetRun, RunPolicy};
use relsync_vcs::{GitClient, resolve_latest};

use super::markers::Markers;

/// Print each repository's latest release marker.
pub async fn latest(config_path: &Path, local: bool, prompt: bool) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let fleet = super::select_fleet(&config, &[])?;

    let provider = super::credential_provider(&config, prompt);
    let git = GitClient::new();
    let markers = Markers::open(&config, &git, local, provider.as_ref()).await?;

    let mut run = FleetRun::new(RunPolicy::ContinueOnError);
    for repo in fleet {
        if local {
            config.existing_working_copy(&repo.name)?;
        }
        let result = resolve_latest(&markers, &repo.name)
            .await
            .map(|marker| format!("{} ({})", marker.name, marker.committed_at.to_rfc3339()))
            .map_err(anyhow::Error::from);
        if super::record(&mut run, &repo.name, result)?.is_break() {
            break;
        }
    }

    super::finish(&run.finish())
}
