use assert_fs::prelude::*;
use hazdist_e2e_tests::{
    MockResponse, MockServer, RecordingProgress, SERVICE_PATH, sample_archive,
    setup_test_environment,
};
use hazdist_lib::cli::{
    Command, FetchParams, ResolveParams, ResolvedCommand, resolve_command, run_fetch, run_resolve,
};
use hazdist_lib::error::HazDistError;
use predicates::prelude::*;
use std::path::Path;

const ARCHIVE_NAME: &str = "dpd_distribution_HAZ_5.2.1.zip";

fn fetch_command(
    config_path: Option<&Path>,
    base_url: Option<&str>,
    output_dir: Option<&Path>,
) -> Command {
    Command::Fetch {
        config_path: config_path.map(|path| path.to_str().unwrap().to_string()),
        base_url: base_url.map(str::to_string),
        output_dir: output_dir.map(|path| path.to_str().unwrap().to_string()),
        max_attempts: None,
        retry_delay_secs: Some(0),
        version_timeout_secs: None,
        download_timeout_secs: None,
        exit_code_policy: None,
        show_progress: false,
    }
}

fn build_fetch_params(command: Command) -> FetchParams {
    match resolve_command(command).expect("Failed to resolve fetch command") {
        ResolvedCommand::Fetch(params) => params,
        _ => unreachable!("Resolved command type mismatch"),
    }
}

/// Serves the version document on the bare endpoint and `archive` when the
/// `version` query parameter is present.
async fn start_distribution_server(version: &'static str, archive: Vec<u8>) -> MockServer {
    MockServer::start(move |target, _| {
        if target.contains("version=") {
            MockResponse::ok(archive.clone())
        } else {
            MockResponse::version(version)
        }
    })
    .await
    .expect("Failed to start mock server")
}

#[tokio::test]
async fn test_fetch_end_to_end_from_config_file() {
    init_tracing();

    let archive = sample_archive(64 * 1024);
    let server = start_distribution_server("5.2.1", archive.clone()).await;
    let (temp_dir, config_path) =
        setup_test_environment(&server.base_url()).expect("Failed to setup test environment");

    let params = build_fetch_params(fetch_command(Some(&config_path), None, None));
    let progress = RecordingProgress::default();
    let downloaded = run_fetch(params, &progress)
        .await
        .expect("Fetch should succeed");

    let expected_path = temp_dir.path().join("downloads").join(ARCHIVE_NAME);
    assert_eq!(downloaded.path, expected_path);
    assert_eq!(std::fs::read(&expected_path).unwrap(), archive);
    assert_eq!(
        server.requests(),
        vec![
            SERVICE_PATH.to_string(),
            format!("{SERVICE_PATH}?version=5.2.1"),
        ]
    );
    assert_eq!(progress.advanced(), archive.len() as u64);
}

#[tokio::test]
async fn test_fetch_with_command_line_overrides() {
    init_tracing();

    let server = start_distribution_server("5.2.1", b"PK\x03\x04".to_vec()).await;
    let temp = assert_fs::TempDir::new().unwrap();
    let output_dir = temp.child("archives");

    let params = build_fetch_params(fetch_command(
        None,
        Some(server.base_url().as_str()),
        Some(output_dir.path()),
    ));
    assert_eq!(params.download.retry.max_attempts, 3);

    let downloaded = run_fetch(params, &RecordingProgress::default())
        .await
        .expect("Fetch should succeed");

    output_dir.assert(predicate::path::is_dir());
    output_dir
        .child(ARCHIVE_NAME)
        .assert(predicate::path::is_file());
    assert_eq!(downloaded.size, 4);
}

#[tokio::test]
async fn test_version_failure_aborts_before_download() {
    init_tracing();

    let server = MockServer::start(|_, _| MockResponse::status(503))
        .await
        .expect("Failed to start mock server");
    let (temp_dir, config_path) =
        setup_test_environment(&server.base_url()).expect("Failed to setup test environment");

    let params = build_fetch_params(fetch_command(Some(&config_path), None, None));
    let result = run_fetch(params, &RecordingProgress::default()).await;

    assert!(
        matches!(result, Err(HazDistError::Server { .. })),
        "Expected version lookup failure, got {:?}",
        result
    );
    assert_eq!(server.request_count(), 1);
    assert!(!temp_dir.path().join("downloads").exists());
}

#[tokio::test]
async fn test_download_failures_exhaust_retries() {
    init_tracing();

    let server = MockServer::start(|target, _| {
        if target.contains("version=") {
            MockResponse::status(500)
        } else {
            MockResponse::version("5.2.1")
        }
    })
    .await
    .expect("Failed to start mock server");
    let temp = assert_fs::TempDir::new().unwrap();

    let params = build_fetch_params(fetch_command(
        None,
        Some(server.base_url().as_str()),
        Some(temp.path()),
    ));
    let result = run_fetch(params, &RecordingProgress::default()).await;

    assert!(
        matches!(result, Err(HazDistError::RetriesExhausted { attempts: 3, .. })),
        "Expected exhausted retries, got {:?}",
        result
    );
    // One version request followed by three download attempts.
    assert_eq!(server.request_count(), 4);
    temp.child(ARCHIVE_NAME).assert(predicate::path::missing());
}

#[tokio::test]
async fn test_run_resolve_prints_version_only() {
    init_tracing();

    let server = start_distribution_server("2025.1", Vec::new()).await;

    let command = Command::Resolve {
        config_path: None,
        base_url: Some(server.base_url().to_string()),
        version_timeout_secs: Some(5),
    };
    let params: ResolveParams =
        match resolve_command(command).expect("Failed to resolve command") {
            ResolvedCommand::Resolve(params) => params,
            _ => unreachable!("Resolved command type mismatch"),
        };

    let version = run_resolve(params).await.expect("Resolve should succeed");

    assert_eq!(version, "2025.1");
    assert_eq!(server.requests(), vec![SERVICE_PATH.to_string()]);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("hazdist_lib=debug,hazdist_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
