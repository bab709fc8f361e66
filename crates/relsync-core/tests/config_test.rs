use relsync_core::{RelsyncConfig, RunPolicy};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = RelsyncConfig::load(tmp.path()).unwrap();

    assert!(config.registry.account.is_empty());
    assert!(config.host.owner.is_none());
    assert_eq!(config.host.api_url, "https://api.github.com");
    assert_eq!(config.host.web_url, "https://github.com");
    assert_eq!(config.workspace.root, tmp.path().join("."));
    assert_eq!(config.workspace.recipe, PathBuf::from("Dockerfile"));
    assert_eq!(config.workspace.remote, "origin");
    assert_eq!(config.policy.build, RunPolicy::FailFast);
    assert_eq!(config.policy.sync, RunPolicy::ContinueOnError);
    assert_eq!(config.credentials.host_env, "GITHUB_TOKEN");
    assert_eq!(config.credentials.registry_env, "DOCKER_TOKEN");
    assert!(config.repositories.is_empty());
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[registry]
account = "acct"

[host]
owner = "someone"
api_url = "https://ghe.example/api/v3"
web_url = "https://ghe.example"

[workspace]
root = "repos"
recipe = "docker/Dockerfile"
remote = "upstream"

[identity]
name = "Release Bot"
email = "bot@example.com"

[policy]
build = "continue-on-error"
sync = "fail-fast"

[credentials]
host_env = "GHE_TOKEN"
registry_env = "REGISTRY_TOKEN"

[[repository]]
name = "docker-debian-stable-dev-image-base"
commit_message = "Build from {date} version of Debian stable."
tag_message = "From {date} version of Debian stable."

[[repository]]
name = "docker-debian-stable-cpp-image-gcc"
"#;
    std::fs::write(tmp.path().join("relsync.toml"), toml).unwrap();

    let config = RelsyncConfig::load(tmp.path()).unwrap();

    assert_eq!(config.registry.account, "acct");
    assert_eq!(config.host.owner.as_deref(), Some("someone"));
    assert_eq!(config.host.api_url, "https://ghe.example/api/v3");
    assert_eq!(config.host.web_url, "https://ghe.example");
    assert_eq!(config.workspace.root, tmp.path().join("repos"));
    assert_eq!(config.workspace.recipe, PathBuf::from("docker/Dockerfile"));
    assert_eq!(config.workspace.remote, "upstream");
    assert_eq!(config.identity.name, "Release Bot");
    assert_eq!(config.identity.email, "bot@example.com");
    assert_eq!(config.policy.build, RunPolicy::ContinueOnError);
    assert_eq!(config.policy.sync, RunPolicy::FailFast);
    assert_eq!(config.credentials.host_env, "GHE_TOKEN");
    assert_eq!(config.credentials.registry_env, "REGISTRY_TOKEN");

    assert_eq!(config.repositories.len(), 2);
    let first = &config.repositories[0];
    assert_eq!(first.name, "docker-debian-stable-dev-image-base");
    assert_eq!(
        first.commit_message_for("2023-06-12"),
        "Build from 2023-06-12 version of Debian stable."
    );
    assert_eq!(
        first.tag_message_for("2023-06-12"),
        "From 2023-06-12 version of Debian stable."
    );
    // Defaults fill in missing messages
    let second = &config.repositories[1];
    assert_eq!(
        second.commit_message_for("2023-06-12"),
        "Build from 2023-06-12 base image release."
    );
}

#[test]
fn load_keeps_absolute_root() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("elsewhere");
    let toml = format!("[workspace]\nroot = {:?}\n", root.display().to_string());
    std::fs::write(tmp.path().join("relsync.toml"), toml).unwrap();

    let config = RelsyncConfig::load(tmp.path()).unwrap();
    assert_eq!(config.workspace.root, root);
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("relsync.toml"),
        "[registry]\naccount = \"partial\"\n",
    )
    .unwrap();

    let config = RelsyncConfig::load(tmp.path()).unwrap();

    assert_eq!(config.registry.account, "partial");
    assert_eq!(config.workspace.remote, "origin");
    assert_eq!(config.policy.build, RunPolicy::FailFast);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("relsync.toml"), "not valid {{{{ toml").unwrap();

    let result = RelsyncConfig::load(tmp.path());
    assert!(result.is_err());

    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_rejects_unknown_policy() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("relsync.toml"),
        "[policy]\nbuild = \"sometimes\"\n",
    )
    .unwrap();

    assert!(RelsyncConfig::load(tmp.path()).is_err());
}

#[test]
fn load_rejects_repository_without_prefix() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("relsync.toml"),
        "[[repository]]\nname = \"cpp-image-gcc\"\n",
    )
    .unwrap();

    let err = RelsyncConfig::load(tmp.path()).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("cpp-image-gcc"));
}

#[test]
fn load_rejects_duplicate_repository() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("relsync.toml"),
        "[[repository]]\nname = \"docker-a\"\n\n[[repository]]\nname = \"docker-a\"\n",
    )
    .unwrap();

    let err = RelsyncConfig::load(tmp.path()).unwrap_err().to_string();
    assert!(err.contains("more than once"), "got: {err}");
}

#[test]
fn select_keeps_fleet_order() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("relsync.toml"),
        "[[repository]]\nname = \"docker-a\"\n\n[[repository]]\nname = \"docker-b\"\n\n[[repository]]\nname = \"docker-c\"\n",
    )
    .unwrap();
    let config = RelsyncConfig::load(tmp.path()).unwrap();

    let all: Vec<&str> = config.select(&[]).iter().map(|r| r.name.as_str()).collect();
    assert_eq!(all, ["docker-a", "docker-b", "docker-c"]);

    let only = ["docker-c".to_owned(), "docker-a".to_owned()];
    let picked: Vec<&str> = config.select(&only).iter().map(|r| r.name.as_str()).collect();
    assert_eq!(picked, ["docker-a", "docker-c"]);
}

#[test]
fn missing_working_copy_is_precondition() {
    let tmp = TempDir::new().unwrap();
    let config = RelsyncConfig::load(tmp.path()).unwrap();

    let err = config.existing_working_copy("docker-absent").unwrap_err();
    assert!(err.is_precondition());

    std::fs::create_dir(tmp.path().join("docker-present")).unwrap();
    let path = config.existing_working_copy("docker-present").unwrap();
    assert!(path.ends_with("docker-present"));
}
