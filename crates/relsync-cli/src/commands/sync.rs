use std::path::Path;

use relsync_build::RecipeDocument;
use relsync_core::{FleetRun, ReleaseDate, RelsyncConfig, RepositoryConfig, RunPolicy};
use relsync_vcs::{GitClient, ReleaseRequest};

pub struct SyncOptions {
    pub push: bool,
    pub policy: Option<RunPolicy>,
    pub only: Vec<String>,
}

/// Point every recipe at the `date` release, commit, and tag it.
pub async fn sync(
    config_path: &Path,
    date: &ReleaseDate,
    options: &SyncOptions,
) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let fleet = super::select_fleet(&config, &options.only)?;
    let git = GitClient::new();

    let policy = match options.policy {
        Some(policy) => policy,
        None => config.policy.sync,
    };
    let mut run = FleetRun::new(policy);
    tracing::info!(
        %date,
        %policy,
        repositories = fleet.len(),
        push = options.push,
        "syncing release"
    );

    for repo in fleet {
        println!("In repo {}", repo.name);
        let working_copy = config.existing_working_copy(&repo.name)?;

        let result = sync_one(&config, repo, &git, &working_copy, date, options.push).await;
        if super::record(&mut run, &repo.name, result)?.is_break() {
            break;
        }
    }

    super::finish(&run.finish())
}

async fn sync_one(
    config: &RelsyncConfig,
    repo: &RepositoryConfig,
    git: &GitClient,
    working_copy: &Path,
    date: &ReleaseDate,
    push: bool,
) -> anyhow::Result<String> {
    let recipe_path = working_copy.join(&config.workspace.recipe);
    let mut recipe = RecipeDocument::load(&recipe_path)?;
    if !recipe.rewrite(date) {
        println!("  recipe already references {date}");
    }

    let iso = date.iso();
    let commit_message = repo.commit_message_for(&iso);
    let tag_message = repo.tag_message_for(&iso);

    let outcome = git
        .commit_and_tag(&ReleaseRequest {
            working_copy,
            recipe: &config.workspace.recipe,
            content: recipe.content(),
            commit_message: &commit_message,
            tag_name: &iso,
            tag_message: &tag_message,
            identity: &config.identity,
            remote: &config.workspace.remote,
            publish: push,
        })
        .await?;

    Ok(format!("{iso}: {outcome}"))
}
