//! Integration tests for the `shinobi` CLI binary.
//!
//! Argument parsing and error paths run without any NVR; the rest talk to
//! a wiremock server passed in with `--url`.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MONITORS_PATH: &str = "/KEY/monitor/GROUP";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `shinobi` binary with env isolation.
///
/// Clears every `SHINOBI_*` variable and points config directories at a
/// nonexistent path so tests never read the user's real configuration.
fn shinobi_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("shinobi");
    cmd.env("HOME", "/tmp/shinobi-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/shinobi-cli-test-nonexistent")
        .env_remove("SHINOBI_PROFILE")
        .env_remove("SHINOBI_URL")
        .env_remove("SHINOBI_API_KEY")
        .env_remove("SHINOBI_GROUP_KEY")
        .env_remove("SHINOBI_OUTPUT")
        .env_remove("SHINOBI_INSECURE")
        .env_remove("SHINOBI_TIMEOUT")
        .env_remove("SHINOBI_INTERVAL")
        .env_remove("SHINOBI_STREAM_TYPE");
    cmd
}

/// `shinobi_cmd` with connection flags aimed at `url`.
fn nvr_cmd(url: &str) -> assert_cmd::Command {
    let mut cmd = shinobi_cmd();
    cmd.args(["--url", url, "--api-key", "KEY", "--group-key", "GROUP"]);
    cmd
}

/// Run a prepared command off the async runtime so the mock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn nvr_with_monitors() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MONITORS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "mid": "m1", "name": "Front Door", "status": "recording",
                "mode": "record", "type": "h264",
                "streams": ["/KEY/hls/GROUP/m1/s.m3u8"]
            },
            { "mid": "m2", "name": "Garage", "status": "watching", "mode": "watch", "type": "mjpeg" }
        ])))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_usage() {
    let output = shinobi_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    shinobi_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Shinobi")
            .and(predicate::str::contains("monitors"))
            .and(predicate::str::contains("snapshot"))
            .and(predicate::str::contains("record")),
    );
}

#[test]
fn version_flag() {
    shinobi_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shinobi"));
}

#[test]
fn completions_bash() {
    shinobi_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn invalid_mode_is_a_usage_error() {
    shinobi_cmd()
        .args(["mode", "m1", "sideways"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn missing_config_exits_with_usage_code() {
    shinobi_cmd().args(["monitors", "list"]).assert().code(2);
}

#[test]
fn missing_api_key_exits_with_auth_code() {
    shinobi_cmd()
        .args(["--url", "http://127.0.0.1:1", "--group-key", "GROUP"])
        .args(["monitors", "list"])
        .assert()
        .code(3);
}

#[test]
fn unknown_profile_exits_with_not_found_code() {
    shinobi_cmd()
        .args(["--profile", "nope", "monitors", "list"])
        .assert()
        .code(4);
}

#[test]
fn config_profiles_with_no_config_succeeds() {
    shinobi_cmd()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn config_set_leaves_malformed_file_untouched() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("shinobi").join("config.toml");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    let original = "[profiles.lab]\nurl = \"http://nvr\"\ntimeout = \"soon\"\n";
    std::fs::write(&file, original).unwrap();

    shinobi_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["config", "set", "url", "http://other"])
        .assert()
        .code(1);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), original);

    shinobi_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["config", "use", "lab"])
        .assert()
        .failure();
    assert_eq!(std::fs::read_to_string(&file).unwrap(), original);
}

// ── Against a mock NVR ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn monitors_list_json() {
    let server = nvr_with_monitors().await;
    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["-o", "json", "monitors", "list"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let mids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["mid"].as_str().unwrap())
        .collect();
    assert_eq!(mids, ["m1", "m2"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn monitors_get_by_name_plain() {
    let server = nvr_with_monitors().await;
    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["-o", "plain", "monitors", "get", "garage"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("m2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn entities_filtered_by_kind() {
    let server = nvr_with_monitors().await;
    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["-o", "plain", "entities", "--kind", "switch"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("shinobi_m1_recording"));
    assert!(stdout.contains("shinobi_m2_recording"));
    assert!(!stdout.contains("shinobi_m1_status"));
}

#[tokio::test(flavor = "multi_thread")]
async fn stream_prints_hls_source() {
    let server = nvr_with_monitors().await;
    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["-o", "plain", "stream", "m1"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let expected = format!("{}/KEY/hls/GROUP/m1/s.m3u8", server.uri());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_monitor_exits_with_not_found_code() {
    let server = nvr_with_monitors().await;
    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["stream", "porch"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn record_off_sends_watch_mode() {
    let server = nvr_with_monitors().await;
    Mock::given(method("GET"))
        .and(path(format!("{MONITORS_PATH}/m1/watch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["record", "off", "m1"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_mode_change_fails() {
    let server = nvr_with_monitors().await;
    Mock::given(method("GET"))
        .and(path(format!("{MONITORS_PATH}/m2/record")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["mode", "m2", "record"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(1), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MONITORS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut cmd = nvr_cmd(&server.uri());
    cmd.args(["monitors", "list"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[test]
fn unreachable_nvr_exits_with_connection_code() {
    nvr_cmd("http://127.0.0.1:1")
        .args(["--timeout", "2", "monitors", "list"])
        .assert()
        .code(7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_command_reports_monitor_count() {
    let server = nvr_with_monitors().await;
    let mut cmd = nvr_cmd(&server.uri());
    cmd.arg("test");

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Shinobi Video"), "{stdout}");
    assert!(stdout.contains("2 monitor(s)"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_command_invalid_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MONITORS_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut cmd = nvr_cmd(&server.uri());
    cmd.arg("test");

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("invalid_auth"));
}
