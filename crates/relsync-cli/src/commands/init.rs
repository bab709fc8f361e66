use std::path::Path;

/// The fleet relsync was written for, with what each image is built from.
const FLEET: &[(&str, &str)] = &[
    ("docker-debian-stable-dev-image-base", "Debian stable"),
    ("docker-debian-stable-cpp-image-base", "base dev image"),
    ("docker-debian-stable-cpp-image-clang", "base cpp image"),
    ("docker-debian-stable-cpp-image-gcc", "base cpp image"),
    ("docker-debian-stable-latex-image", "base dev image"),
    ("docker-debian-stable-python-image", "base dev image"),
    ("docker-debian-testing-dev-image-base", "Debian testing"),
    ("docker-debian-testing-cpp-image-base", "base dev image"),
    ("docker-debian-testing-cpp-image-clang", "base cpp image"),
    ("docker-debian-testing-cpp-image-gcc", "base cpp image"),
    ("docker-debian-testing-python-image", "base dev image"),
];

const CONFIG_HEADER: &str = r#"[registry]
# account = "your-registry-account"

[host]
# owner = "your-github-login"   # default: the token's user
# api_url = "https://api.github.com"
# web_url = "https://github.com"

[workspace]
# root = ".."                   # working copies live at <root>/<repository>
# recipe = "Dockerfile"
# remote = "origin"

[identity]
# name = "Your Name"
# email = "you@example.com"

[policy]
# build = "fail-fast"
# sync = "continue-on-error"

[credentials]
# host_env = "GITHUB_TOKEN"
# registry_env = "DOCKER_TOKEN"
"#;

const ENV_EXAMPLE: &str = "GITHUB_TOKEN=your-github-token\nDOCKER_TOKEN=your-registry-token\n";

/// Starter configuration listing the fleet.
pub(crate) fn starter_config() -> String {
    let mut out = String::from(CONFIG_HEADER);
    for (name, base) in FLEET {
        out.push_str(&format!(
            "\n[[repository]]\n\
             name = \"{name}\"\n\
             commit_message = \"Build from {{date}} version of {base}.\"\n\
             tag_message = \"From {{date}} version of {base}.\"\n"
        ));
    }
    out
}

/// Write relsync.toml and .env.example next to it, skipping existing files.
pub fn init(config_path: &Path) -> anyhow::Result<()> {
    let env_example_path = config_path.with_file_name(".env.example");

    let mut created = Vec::new();
    for (path, content) in [
        (config_path.to_path_buf(), starter_config()),
        (env_example_path, ENV_EXAMPLE.to_owned()),
    ] {
        if path.exists() {
            eprintln!("{} already exists, skipping", path.display());
        } else {
            std::fs::write(&path, content)?;
            created.push(path);
        }
    }

    if created.is_empty() {
        println!("Nothing to create (already initialized).");
    } else {
        for path in &created {
            println!("Created {}", path.display());
        }
    }

    println!();
    println!("Next steps:");
    println!();
    println!("  1. Set [registry].account and [identity] in relsync.toml");
    println!();
    println!("  2. Configure credentials:");
    println!("     cp .env.example .env");
    println!();
    println!("  3. Check the setup:");
    println!("     relsync doctor");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relsync_core::RelsyncConfig;

    #[test]
    fn starter_config_parses_and_validates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("relsync.toml");
        std::fs::write(&path, starter_config()).unwrap();
        let config = RelsyncConfig::load_file(&path).unwrap();

        assert_eq!(config.repositories.len(), FLEET.len());
        let gcc = &config.repositories[3];
        assert_eq!(gcc.name, "docker-debian-stable-cpp-image-gcc");
        assert_eq!(
            gcc.commit_message_for("2023-06-12"),
            "Build from 2023-06-12 version of base cpp image."
        );
        assert_eq!(
            gcc.tag_message_for("2023-06-12"),
            "From 2023-06-12 version of base cpp image."
        );
    }
}
