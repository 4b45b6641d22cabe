//! Integration tests for the `aliasfwd` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without any provider; the last few drive the binary against a wiremock
//! stand-in for the DNS API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZONE: &str = "zone-abc";
const APEX: &str = "example.com";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `aliasfwd` binary with env isolation.
///
/// Clears all `ALIASFWD_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn aliasfwd_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("aliasfwd");
    cmd.env("HOME", "/tmp/aliasfwd-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/aliasfwd-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/aliasfwd-cli-test-nonexistent")
        .env_remove("ALIASFWD_PROFILE")
        .env_remove("ALIASFWD_APEX")
        .env_remove("ALIASFWD_ZONE")
        .env_remove("ALIASFWD_API_TOKEN")
        .env_remove("ALIASFWD_API_URL")
        .env_remove("ALIASFWD_STORE")
        .env_remove("ALIASFWD_OUTPUT")
        .env_remove("ALIASFWD_INSECURE")
        .env_remove("ALIASFWD_TIMEOUT")
        .env_remove("ALIASFWD_EMAIL")
        .env_remove("ALIASFWD_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// A command wired to a zone and a store file, no config needed.
fn flag_cmd(store: &Path) -> assert_cmd::Command {
    let mut cmd = aliasfwd_cmd();
    cmd.args(["--apex", APEX, "--zone", ZONE, "--api-token", "test-token"])
        .arg("--store")
        .arg(store);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn seed_store(path: &Path) {
    std::fs::write(
        path,
        r#"[profiles.u1]
alias = "alice"
forward_to = "alice@external.com"
dns_record_id = "rec_1"
created_at = "2026-01-01T00:00:00Z"

[profiles.u2]
alias = "bob"
created_at = "2026-01-02T00:00:00Z"
"#,
    )
    .unwrap();
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = aliasfwd_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    aliasfwd_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("forwarding")
            .and(predicate::str::contains("provision"))
            .and(predicate::str::contains("forward"))
            .and(predicate::str::contains("audit")),
    );
}

#[test]
fn test_version_flag() {
    aliasfwd_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aliasfwd"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    aliasfwd_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    aliasfwd_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = aliasfwd_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = aliasfwd_cmd()
        .args(["--output", "xml", "users", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_provision_without_config() {
    let output = aliasfwd_cmd()
        .args(["provision", "u1", "alice"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("config init"), "Expected setup hint:\n{text}");
}

#[test]
fn test_missing_token_is_auth_error() {
    let output = aliasfwd_cmd()
        .args(["--apex", APEX, "--zone", ZONE, "users", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_unknown_profile_is_reported() {
    let output = aliasfwd_cmd()
        .args(["--profile", "work", "users", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("'work'"));
}

#[test]
fn test_invalid_alias_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = flag_cmd(&dir.path().join("p.toml"))
        .args(["provision", "u1", "not an alias!"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("alias"));
}

#[test]
fn test_invalid_forward_target_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = flag_cmd(&dir.path().join("p.toml"))
        .args(["forward", "set", "u1", "not-an-address"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_delete_requires_yes_when_not_interactive() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("p.toml");
    seed_store(&store);

    let output = flag_cmd(&store)
        .args(["users", "delete", "u1"])
        .write_stdin("")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));

    // Nothing was removed
    let contents = std::fs::read_to_string(&store).unwrap();
    assert!(contents.contains("[profiles.u1]"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    aliasfwd_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_file() {
    aliasfwd_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_use_unknown_profile() {
    let output = aliasfwd_cmd()
        .args(["config", "use", "nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("(none)"));
}

// ── Local store ─────────────────────────────────────────────────────

#[test]
fn test_users_list_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    flag_cmd(&dir.path().join("missing.toml"))
        .args(["--output", "json-compact", "users", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_users_list_plain() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("p.toml");
    seed_store(&store);

    flag_cmd(&store)
        .args(["--output", "plain", "users", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("u1\nu2\n"));
}

#[test]
fn test_forward_show_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("p.toml");
    seed_store(&store);

    flag_cmd(&store)
        .args(["forward", "show", "u1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("alice@example.com")
                .and(predicate::str::contains("alice@external.com"))
                .and(predicate::str::contains("rec_1")),
        );
}

#[test]
fn test_forward_show_unknown_user() {
    let dir = tempfile::tempdir().unwrap();
    let output = flag_cmd(&dir.path().join("p.toml"))
        .args(["forward", "show", "ghost"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("users list"));
}

// ── Against a mock provider ─────────────────────────────────────────

fn records_path() -> String {
    format!("/client/v4/zones/{ZONE}/dns_records")
}

fn record(id: &str, content: &str) -> serde_json::Value {
    json!({ "id": id, "type": "TXT", "name": APEX, "content": content, "ttl": 1 })
}

fn listing(records: Vec<serde_json::Value>) -> serde_json::Value {
    let count = records.len();
    json!({
        "success": true, "errors": [], "messages": [],
        "result": records,
        "result_info": { "page": 1, "per_page": 100, "count": count, "total_count": count, "total_pages": 1 }
    })
}

async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_provision_against_mock_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(records_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(records_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "errors": [], "messages": [],
            "result": record("rec_1", "forward-email=alice:alice@external.com")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("p.toml");
    let mut cmd = flag_cmd(&store);
    cmd.args(["--api-url", &format!("{}/client/v4/", server.uri())])
        .args(["--output", "json", "provision", "u1", "alice"])
        .args(["--forward-to", "alice@external.com"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["value"]["record"]["id"], "rec_1");
    assert_eq!(body["value"]["address"], "alice@example.com");
    assert_eq!(body["warnings"], json!([]));

    let contents = std::fs::read_to_string(&store).unwrap();
    assert!(contents.contains("dns_record_id = \"rec_1\""), "{contents}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_records_list_against_mock_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(records_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            record("rec_spf", "v=spf1 ~all"),
            record("rec_1", "forward-email=alice:alice@external.com"),
            record("rec_2", "forward-email=bob:"),
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = flag_cmd(&dir.path().join("p.toml"));
    cmd.args(["--api-url", &format!("{}/client/v4/", server.uri())])
        .args(["--output", "plain", "records", "list"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "rec_1\nrec_2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_rejection_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 10000, "message": "Authentication error" }],
            "messages": [], "result": null
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = flag_cmd(&dir.path().join("p.toml"));
    cmd.args(["--api-url", &format!("{}/client/v4/", server.uri())])
        .args(["records", "list"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
