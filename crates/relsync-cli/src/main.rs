mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relsync_core::{CONFIG_FILE, ReleaseDate, RunPolicy};

#[derive(Parser)]
#[command(
    name = "relsync",
    about = "Sync base-image releases across docker-* repositories and publish their images"
)]
#[command(version)]
struct Cli {
    /// Path to the fleet configuration
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build each repository's image from its latest release marker
    Build {
        /// Resolve markers from local working copies and build from them
        #[arg(long)]
        local: bool,
        /// Push the image and move `latest` onto it
        #[arg(long)]
        push: bool,
        /// Prompt for credentials instead of reading the environment
        #[arg(long)]
        prompt: bool,
        /// What to do when a repository fails (fail-fast, continue-on-error)
        #[arg(long)]
        policy: Option<RunPolicy>,
        /// Only process these repositories (repeatable)
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,
    },
    /// Point every recipe at a new base-image release, then commit and tag
    Sync {
        /// Release date as YYYYMMDD
        date: ReleaseDate,
        /// Push the branch and tag to the remote
        #[arg(long)]
        push: bool,
        /// What to do when a repository fails (fail-fast, continue-on-error)
        #[arg(long)]
        policy: Option<RunPolicy>,
        /// Only process these repositories (repeatable)
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,
    },
    /// Show the latest release marker of each repository
    Latest {
        /// Read tags from local working copies
        #[arg(long)]
        local: bool,
        /// Prompt for the host token instead of reading the environment
        #[arg(long)]
        prompt: bool,
    },
    /// Write a starter relsync.toml and .env.example
    Init,
    /// Check tools, configuration and working copies
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="unset or invalid RUST_LOG falls back to the --verbose level"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            local,
            push,
            prompt,
            policy,
            only,
        } => {
            let options = commands::BuildOptions {
                local,
                push,
                prompt,
                policy,
                only,
            };
            commands::build(&cli.config, &options).await?
        }
        Commands::Sync {
            date,
            push,
            policy,
            only,
        } => {
            let options = commands::SyncOptions { push, policy, only };
            commands::sync(&cli.config, &date, &options).await?
        }
        Commands::Latest { local, prompt } => commands::latest(&cli.config, local, prompt).await?,
        Commands::Init => commands::init(&cli.config)?,
        Commands::Doctor => commands::doctor(&cli.config).await?,
    }

    Ok(())
}
