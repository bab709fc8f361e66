use std::path::Path;

use relsync_core::RelsyncConfig;
use relsync_docker::{CheckResult, DockerClient, WorkingCopyCheck};
use relsync_vcs::GitClient;

pub async fn doctor(config_path: &Path) -> anyhow::Result<()> {
    let docker = DockerClient::new();
    let mut report = docker.doctor().await;

    let git = GitClient::new();
    report.git = match git.version().await {
        Ok(v) => CheckResult::ok(v.trim()),
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    match RelsyncConfig::load_file(config_path) {
        Ok(_) if !config_path.exists() => {
            report.config_file = CheckResult::fail("not found (run `relsync init`)");
        }
        Ok(config) => {
            report.config_file = CheckResult::ok(&format!(
                "{} ({} repositories)",
                config_path.display(),
                config.repositories.len()
            ));
            for repo in &config.repositories {
                let path = config.working_copy(&repo.name);
                let result = if !path.is_dir() {
                    CheckResult::fail(&format!("missing at {}", path.display()))
                } else {
                    match git.is_repository(&path).await {
                        Ok(true) => CheckResult::ok(&path.display().to_string()),
                        Ok(false) => CheckResult::fail(&format!(
                            "{} is not a git repository",
                            path.display()
                        )),
                        Err(e) => CheckResult::fail(&e.to_string()),
                    }
                };
                report.working_copies.push(WorkingCopyCheck {
                    name: repo.name.clone(),
                    result,
                });
            }
        }
        Err(e) => report.config_file = CheckResult::fail(&format!("{:#}", anyhow::Error::from(e))),
    }

    println!();
    print!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed (see above for details)");
    }

    Ok(())
}
