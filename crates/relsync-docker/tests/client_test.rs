use mockall::{Sequence, mock};
use relsync_core::ImageReference;
use relsync_docker::client::{BuildSource, DockerClient, PublishError};
use relsync_docker::docker::DockerError;
use relsync_docker::executor::DockerExecutor;
use secrecy::SecretString;

mock! {
    Executor {}

    impl DockerExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<String, DockerError>;
        async fn exec_with_stdin(
            &self,
            args: &[String],
            stdin_data: &[u8],
        ) -> Result<String, DockerError>;
    }
}

fn image() -> ImageReference {
    ImageReference::for_repository("docker-cpp-gcc", "acct", "v3").unwrap()
}

fn remote() -> BuildSource {
    BuildSource::Remote {
        url: "https://github.com/acme/docker-cpp-gcc.git".to_owned(),
        marker: "v3".to_owned(),
    }
}

fn credential() -> SecretString {
    SecretString::from("s3cret".to_owned())
}

fn failed(stderr: &str) -> DockerError {
    DockerError::CommandFailed {
        args: vec![],
        stdout: String::new(),
        stderr: stderr.to_owned(),
    }
}

fn is(args: &[String], expected: &[&str]) -> bool {
    args == expected
}

// ── Build ──

#[tokio::test]
async fn build_only_without_credential() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| {
            is(
                args,
                &[
                    "build",
                    "--tag",
                    "acct/cpp-gcc:v3",
                    "https://github.com/acme/docker-cpp-gcc.git#v3",
                ],
            )
        })
        .times(1)
        .returning(|_| Ok(String::new()));
    mock.expect_exec_with_stdin().never();

    let client = DockerClient::with_executor(mock);
    let built = client
        .build_and_publish(&image(), &remote(), None)
        .await
        .unwrap();

    assert_eq!(built.to_string(), "acct/cpp-gcc:v3");
}

#[tokio::test]
async fn build_failure_skips_login_and_push() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "build"))
        .times(1)
        .returning(|_| Err(failed("failed to solve: Dockerfile not found")));
    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a != "build"))
        .never();
    mock.expect_exec_with_stdin().never();

    let client = DockerClient::with_executor(mock);
    let err = client
        .build_and_publish(&image(), &remote(), Some(&credential()))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Build { ref image, .. } if image == "acct/cpp-gcc:v3"));
    let source = std::error::Error::source(&err).unwrap().to_string();
    assert!(source.contains("Dockerfile not found"), "got: {source}");
}

#[tokio::test]
async fn local_build_uses_working_copy_path() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["build", "--tag", "acct/cpp-gcc:v3", "/work/docker-cpp-gcc"]))
        .times(1)
        .returning(|_| Ok(String::new()));

    let client = DockerClient::with_executor(mock);
    let source = BuildSource::Local("/work/docker-cpp-gcc".into());
    client
        .build_and_publish(&image(), &source, None)
        .await
        .unwrap();
}

// ── Publish ──

#[tokio::test]
async fn publish_runs_login_push_retag_push_in_order() {
    let mut mock = MockExecutor::new();
    let mut seq = Sequence::new();

    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "build"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(String::new()));
    mock.expect_exec_with_stdin()
        .withf(|args, stdin| {
            is(args, &["login", "--username", "acct", "--password-stdin"]) && stdin == b"s3cret"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("Login Succeeded\n".to_owned()));
    mock.expect_exec()
        .withf(|args| is(args, &["push", "acct/cpp-gcc:v3"]))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(String::new()));
    mock.expect_exec()
        .withf(|args| is(args, &["tag", "acct/cpp-gcc:v3", "acct/cpp-gcc:latest"]))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(String::new()));
    mock.expect_exec()
        .withf(|args| is(args, &["push", "acct/cpp-gcc:latest"]))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(String::new()));

    let client = DockerClient::with_executor(mock);
    let built = client
        .build_and_publish(&image(), &remote(), Some(&credential()))
        .await
        .unwrap();

    assert_eq!(built, image());
}

#[tokio::test]
async fn credential_never_appears_in_arguments() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains("s3cret")))
        .never();
    mock.expect_exec_with_stdin()
        .withf(|args, _| args.iter().any(|a| a.contains("s3cret")))
        .never();
    mock.expect_exec().returning(|_| Ok(String::new()));
    mock.expect_exec_with_stdin()
        .returning(|_, _| Ok(String::new()));

    let client = DockerClient::with_executor(mock);
    client
        .build_and_publish(&image(), &remote(), Some(&credential()))
        .await
        .unwrap();
}

#[tokio::test]
async fn account_before_slash_is_login_user() {
    let mut mock = MockExecutor::new();

    mock.expect_exec().returning(|_| Ok(String::new()));
    mock.expect_exec_with_stdin()
        .withf(|args, _| is(args, &["login", "--username", "acct", "--password-stdin"]))
        .times(1)
        .returning(|_, _| Ok(String::new()));

    let image = ImageReference::for_repository("docker-base", "acct/mirror", "v1").unwrap();
    let client = DockerClient::with_executor(mock);
    client
        .build_and_publish(&image, &remote(), Some(&credential()))
        .await
        .unwrap();
}

#[tokio::test]
async fn login_failure_stops_before_push() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "build"))
        .returning(|_| Ok(String::new()));
    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "push"))
        .never();
    mock.expect_exec_with_stdin()
        .returning(|_, _| Err(failed("unauthorized: incorrect username or password")));

    let client = DockerClient::with_executor(mock);
    let err = client
        .build_and_publish(&image(), &remote(), Some(&credential()))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Login { ref account, .. } if account == "acct"));
}

#[tokio::test]
async fn retag_failure_skips_latest_push() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "build"))
        .returning(|_| Ok(String::new()));
    mock.expect_exec_with_stdin()
        .returning(|_, _| Ok(String::new()));
    mock.expect_exec()
        .withf(|args| is(args, &["push", "acct/cpp-gcc:v3"]))
        .times(1)
        .returning(|_| Ok(String::new()));
    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "tag"))
        .times(1)
        .returning(|_| Err(failed("No such image")));
    mock.expect_exec()
        .withf(|args| is(args, &["push", "acct/cpp-gcc:latest"]))
        .never();

    let client = DockerClient::with_executor(mock);
    let err = client
        .build_and_publish(&image(), &remote(), Some(&credential()))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Retag { ref image, .. } if image == "acct/cpp-gcc:latest"));
}

#[tokio::test]
async fn latest_push_failure_is_reported() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["push", "acct/cpp-gcc:latest"]))
        .returning(|_| Err(failed("denied")));
    mock.expect_exec().returning(|_| Ok(String::new()));
    mock.expect_exec_with_stdin()
        .returning(|_, _| Ok(String::new()));

    let client = DockerClient::with_executor(mock);
    let err = client
        .build_and_publish(&image(), &remote(), Some(&credential()))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::PushLatest { .. }));
}

// ── Doctor ──

#[tokio::test]
async fn doctor_reports_cli_and_daemon() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "version"))
        .returning(|_| Ok("27.1.1\n".to_owned()));
    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "info"))
        .returning(|_| Ok("27.1.1\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(report.docker.passed);
    assert_eq!(report.docker.detail, "27.1.1");
    assert!(report.daemon.passed);
}

#[tokio::test]
async fn doctor_without_cli_fails_both_checks() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "version"))
        .returning(|_| {
            Err(DockerError::NotFound {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        });
    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "info"))
        .never();

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(!report.docker.passed);
    assert!(!report.daemon.passed);
    assert!(!report.all_passed());
}

#[tokio::test]
async fn doctor_with_stopped_daemon() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "version"))
        .returning(|_| Ok("27.1.1\n".to_owned()));
    mock.expect_exec()
        .withf(|args| args.first().is_some_and(|a| a == "info"))
        .returning(|_| Err(failed("Cannot connect to the Docker daemon")));

    let client = DockerClient::with_executor(mock);
    let report = client.doctor().await;

    assert!(report.docker.passed);
    assert!(!report.daemon.passed);
}
