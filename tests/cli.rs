//! Behaviour of the `deckgen` binary: stdout contract and exit codes

mod common;

use common::*;
use serde_json::{Value, json};
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::MockServer;

/// Run the binary in `dir` against `server`, clearing any ambient credentials
async fn deckgen(server: &MockServer, dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deckgen"))
        .current_dir(dir.path())
        .env_remove("DECKGEN_APP_URL")
        .env("DECKGEN_BASE_URL", server.uri())
        .env("DECKGEN_API_KEY", TEST_API_KEY)
        .env("RUST_LOG", "info")
        .args([
            "--deck-poll-interval",
            "0.02",
            "--export-poll-interval",
            "0.02",
            "--timeout",
            "10",
        ])
        .args(args)
        .output()
        .await
        .unwrap()
}

#[tokio::test]
async fn export_run_prints_summary_then_file_line() {
    let server = MockServer::start().await;
    mount_create_deck(&server).await;
    mount_deck_polls(&server, 1, deck_body("complete", 6, 6)).await;
    mount_export_flow(&server).await;

    let dir = TempDir::new().unwrap();
    let output = deckgen(&server, &dir, &["Quarterly", "update"]).await;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "stdout: {stdout}");

    let summary: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(summary["id"], json!(DECK_ID));
    assert_eq!(summary["format"], json!("pdf"));
    assert_eq!(summary["file"], json!("./deck-a1b2c3d4.pdf"));
    assert_eq!(lines[1], "FILE: ./deck-a1b2c3d4.pdf");

    assert_eq!(
        std::fs::read(dir.path().join("deck-a1b2c3d4.pdf")).unwrap(),
        EXPORT_BYTES
    );
}

#[tokio::test]
async fn no_export_prints_only_the_summary() {
    let server = MockServer::start().await;
    mount_create_deck(&server).await;
    mount_deck_polls(&server, 0, deck_body("complete", 3, 3)).await;
    forbid_export(&server).await;

    let dir = TempDir::new().unwrap();
    let output = deckgen(&server, &dir, &["--no-export", "Quarterly update"]).await;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1, "stdout: {stdout}");
    assert!(!stdout.contains("FILE:"));

    let summary: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert!(summary.get("file").is_none());
    assert_eq!(summary["slides"], json!(3));
}

#[tokio::test]
async fn deck_failure_exits_non_zero_and_logs_message() {
    let server = MockServer::start().await;
    mount_create_deck(&server).await;
    mount_deck_polls(
        &server,
        2,
        json!({ "status": "error", "error": "renderer crashed" }),
    )
    .await;
    forbid_export(&server).await;

    let dir = TempDir::new().unwrap();
    let output = deckgen(&server, &dir, &["Quarterly update"]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("renderer crashed"), "stderr: {stderr}");
}

#[tokio::test]
async fn missing_prompt_is_a_usage_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let output = deckgen(&server, &dir, &[]).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_api_key_is_a_config_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let output = deckgen(&server, &dir, &["--api-key", "", "Quarterly update"]).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(server.received_requests().await.unwrap().is_empty());
}
