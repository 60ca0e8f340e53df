//! Integration tests for the `assetly` CLI binary.
//!
//! Argument parsing, help output, completions, and error handling run
//! without a server. The inventory tests point `--server` at wiremock.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `assetly` binary with env isolation.
///
/// Clears all `ASSETLY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn assetly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("assetly");
    cmd.env("HOME", "/tmp/assetly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/assetly-cli-test-nonexistent")
        .env_remove("ASSETLY_PROFILE")
        .env_remove("ASSETLY_SERVER")
        .env_remove("ASSETLY_USER")
        .env_remove("ASSETLY_SESSION")
        .env_remove("ASSETLY_OUTPUT")
        .env_remove("ASSETLY_INSECURE")
        .env_remove("ASSETLY_TIMEOUT")
        .env_remove("ASSETLY_DEFAULT_PROFILE");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so wiremock keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut argv = vec!["--server".to_owned(), server.uri(), "--color".into(), "never".into()];
    argv.extend(args.iter().map(|a| (*a).to_owned()));
    tokio::task::spawn_blocking(move || assetly_cmd().args(argv).output().unwrap())
        .await
        .unwrap()
}

async fn mount_inventory(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "firstName": "Jane", "lastName": "Doe", "department": "Finance" }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 10, "brand": "Dell", "model": "Latitude", "assetTag": "FIN-001", "purchaseCost": 30.0 },
            { "id": 11, "brand": "Apple", "model": "MacBook", "assetTag": "FIN-002", "purchaseCost": 5.0 },
            { "id": 12, "brand": "Lenovo", "model": "ThinkPad", "assetTag": "OPS-001", "purchaseCost": 100.0 }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "name": "Laptops", "description": "Portable computers" }
        ])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = assetly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    assetly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("asset")
            .and(predicate::str::contains("search"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("notifications")),
    );
}

#[test]
fn test_version_flag() {
    assetly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("assetly"));
}

#[test]
fn test_notifications_help_lists_watch() {
    assetly_cmd()
        .args(["notifications", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("watch").and(predicate::str::contains("recent")));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    assetly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    assetly_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = assetly_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_devices_list_without_server() {
    assetly_cmd()
        .args(["devices", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No server configured"));
}

#[test]
fn test_invalid_output_format() {
    let output = assetly_cmd()
        .args(["--output", "xml", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_desc_requires_sort() {
    let output = assetly_cmd()
        .args(["devices", "list", "--desc"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_watch_without_user_is_usage_error() {
    assetly_cmd()
        .args(["--server", "http://127.0.0.1:9", "notifications", "watch"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("No user selected"));
}

#[test]
fn test_config_show_without_file() {
    assetly_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_use_unknown_profile() {
    assetly_cmd()
        .args(["config", "use", "lab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lab"));
}

#[test]
fn test_config_set_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let isolated = || {
        let mut cmd = assetly_cmd();
        cmd.env("HOME", dir.path()).env("XDG_CONFIG_HOME", dir.path());
        cmd
    };

    isolated()
        .args(["config", "set", "server", "https://assets.example.com"])
        .assert()
        .success();
    isolated()
        .args(["config", "set", "user_id", "7"])
        .assert()
        .success();
    isolated()
        .args(["config", "set", "poll_interval", "never"])
        .assert()
        .failure()
        .code(2);

    isolated()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));

    let output = isolated()
        .args(["--output", "json-compact", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["profiles"]["default"]["server"], "https://assets.example.com");
    assert_eq!(value["profiles"]["default"]["user_id"], 7);
}

// ── Against a mock server ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_search_plain_output() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    let output = run_against(&server, &["--output", "plain", "search", "fin"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Users\t1\tJane Doe",
            "Devices\t10\tDell Latitude",
            "Devices\t11\tApple MacBook",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_sorted_by_cost_descending() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    let output = run_against(
        &server,
        &["--output", "plain", "devices", "list", "--sort", "cost", "--desc"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["OPS-001", "FIN-001", "FIN-002"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_filter_json() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    let output = run_against(
        &server,
        &["--output", "json-compact", "devices", "list", "--filter", "think"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["assetTag"], "OPS-001");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_sort_column_lists_choices() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    let output = run_against(&server, &["devices", "list", "--sort", "colour"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("cost"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_device_is_not_found() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    let output = run_against(&server, &["devices", "get", "99"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("devices list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recent_defaults_to_five_newest() {
    let server = MockServer::start().await;
    let unread: Vec<_> = (1..=7)
        .map(|id| {
            json!({
                "id": id,
                "userId": 4,
                "title": format!("Warranty {id}"),
                "type": "warranty_expiry",
                "createdAt": format!("2025-07-0{id}T08:00:00Z"),
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/users/4/notifications/unread"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(unread)))
        .mount(&server)
        .await;

    let output = run_against(&server, &["--user", "4", "--output", "plain", "notifications", "recent"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["7", "6", "5", "4", "3"]);
}
