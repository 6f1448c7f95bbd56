//! Integration tests for the `proxmon` CLI binary.
//!
//! Argument parsing, help output, completions, config handling, and
//! error exit codes. Backend-bound commands run against wiremock.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `proxmon` binary with env isolation.
///
/// Clears all `PROXMON_*` env vars and points the config file at
/// `config` so tests never touch the user's real configuration.
fn proxmon_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("proxmon");
    cmd.env("PROXMON_CONFIG", config)
        .env("HOME", "/tmp/proxmon-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/proxmon-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("PROXMON_PROFILE")
        .env_remove("PROXMON_SERVER")
        .env_remove("PROXMON_OUTPUT")
        .env_remove("PROXMON_COLOR")
        .env_remove("PROXMON_INSECURE")
        .env_remove("PROXMON_TIMEOUT")
        .env_remove("RUST_LOG")
        .timeout(Duration::from_secs(30));
    cmd
}

fn isolated() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    (dir, config)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a prepared command off the async runtime so wiremock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn groups_body() -> serde_json::Value {
    json!([
        { "id": 1, "name": "기본그룹", "proxy_count": 0 },
        { "id": 2, "name": "Production-Proxy", "proxy_count": 3, "main_server": "PROD-MAIN-01" }
    ])
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_dir, config) = isolated();
    let output = proxmon_cmd(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (_dir, config) = isolated();
    proxmon_cmd(&config).arg("--help").assert().success().stdout(
        predicate::str::contains("proxy appliances")
            .and(predicate::str::contains("groups"))
            .and(predicate::str::contains("proxies"))
            .and(predicate::str::contains("monitor"))
            .and(predicate::str::contains("sessions")),
    );
}

#[test]
fn test_version_flag() {
    let (_dir, config) = isolated();
    proxmon_cmd(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("proxmon"));
}

#[test]
fn test_completions() {
    let (_dir, config) = isolated();
    for shell in ["bash", "zsh", "fish"] {
        proxmon_cmd(&config)
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("proxmon"));
    }
}

#[test]
fn test_invalid_subcommand() {
    let (_dir, config) = isolated();
    let output = proxmon_cmd(&config).arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_output_format() {
    let (_dir, config) = isolated();
    let output = proxmon_cmd(&config)
        .args(["-o", "xml", "groups", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_collect_requires_a_target() {
    let (_dir, config) = isolated();
    let output = proxmon_cmd(&config)
        .args(["-S", "http://127.0.0.1:9", "sessions", "collect"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_groups_list_without_backend() {
    let (_dir, config) = isolated();
    let output = proxmon_cmd(&config).args(["groups", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("No backend configured"));
}

#[test]
fn test_config_path_honors_override() {
    let (_dir, config) = isolated();
    proxmon_cmd(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_no_config() {
    let (_dir, config) = isolated();
    proxmon_cmd(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_set_then_use_profile() {
    let (_dir, config) = isolated();

    proxmon_cmd(&config)
        .args(["-p", "lab", "config", "set", "server", "http://10.1.1.1:5007"])
        .assert()
        .success();
    proxmon_cmd(&config)
        .args(["-p", "lab", "config", "set", "default_group", "Production-Proxy"])
        .assert()
        .success();
    proxmon_cmd(&config)
        .args(["config", "use", "lab"])
        .assert()
        .success();

    proxmon_cmd(&config)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lab *"));

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("default_profile = \"lab\""));
    assert!(written.contains("default_group = \"Production-Proxy\""));
}

#[test]
fn test_config_use_unknown_profile() {
    let (_dir, config) = isolated();
    let output = proxmon_cmd(&config)
        .args(["config", "use", "nowhere"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nowhere"));
}

// ── Validation before any request ───────────────────────────────────

#[test]
fn test_bad_host_is_rejected_locally() {
    let (_dir, config) = isolated();
    // Port 9 (discard) would refuse connections; exit 9 proves no request.
    let output = proxmon_cmd(&config)
        .args([
            "-S",
            "http://127.0.0.1:9",
            "proxies",
            "create",
            "--name",
            "EDGE-01",
            "--host",
            "not-an-ip",
            "--group",
            "2",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("host"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_groups_list_json() {
    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups_body()))
        .mount(&server)
        .await;

    let mut cmd = proxmon_cmd(&config);
    cmd.args(["-S", &server.uri(), "-o", "json-compact", "groups", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[1]["name"], "Production-Proxy");
    assert_eq!(parsed[1]["proxy_count"], 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_protected_group_delete_never_reaches_backend() {
    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups_body()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = proxmon_cmd(&config);
    cmd.args(["-S", &server.uri(), "-y", "groups", "delete", "기본그룹"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_proxy_exits_not_found() {
    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/proxies/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Proxy not found" })),
        )
        .mount(&server)
        .await;

    let mut cmd = proxmon_cmd(&config);
    cmd.args(["-S", &server.uri(), "proxies", "get", "99"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("proxies list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_duplicate_proxy_exits_conflict() {
    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/proxies"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "error": "Main proxy already exists in this group" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = proxmon_cmd(&config);
    cmd.args([
        "-S",
        &server.uri(),
        "proxies",
        "create",
        "--name",
        "PROD-MAIN-02",
        "--host",
        "192.168.1.20",
        "--group",
        "2",
        "--main",
    ]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("duplicate name/IP"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_monitor_watch_prints_one_refresh() {
    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/monitoring/resources"))
        .and(query_param("group_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "proxy_id": 10,
                "proxy_name": "PROD-MAIN-01",
                "host": "192.168.1.10",
                "group_name": "Production-Proxy",
                "is_main": true,
                "resource_data": {
                    "date": "2024-06-15", "time": "10:30:00",
                    "cpu": 91, "memory": 40.5, "uc": 3, "cc": 9, "cs": 9,
                    "http": 5, "https": 4, "ftp": 0, "total_sessions": 9
                }
            }]
        })))
        .mount(&server)
        .await;

    let mut cmd = proxmon_cmd(&config);
    cmd.args([
        "-S",
        &server.uri(),
        "monitor",
        "watch",
        "--interval",
        "1",
        "--group",
        "2",
        "--count",
        "1",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PROD-MAIN-01"), "{stdout}");
    assert!(stdout.contains("40.5"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_monitor_status_renders_collector_report() {
    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/monitoring/status/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "proxy_id": 10,
            "proxy_name": "PROD-MAIN-01",
            "host": "192.168.1.10",
            "group_name": "Production-Proxy",
            "is_main": true,
            "status": { "ssh": "ok", "uptime": "12 days" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = proxmon_cmd(&config);
    cmd.args(["-S", &server.uri(), "monitor", "status", "10"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PROD-MAIN-01 (10)"), "{stdout}");
    assert!(stdout.contains("12 days"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_monitor_status_unknown_proxy() {
    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/monitoring/status/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut cmd = proxmon_cmd(&config);
    cmd.args(["-S", &server.uri(), "monitor", "status", "99"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

/// SIGHUP makes a running `watch` re-read the profile and apply its new
/// refresh interval without restarting the process.
#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_watch_reloads_interval_on_sighup() {
    use std::io::{BufRead, BufReader};
    use std::process::{Command, Stdio};

    let (_dir, config) = isolated();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/monitoring/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "proxy_id": 10,
                "proxy_name": "PROD-MAIN-01",
                "host": "192.168.1.10",
                "resource_data": { "cpu": 12, "memory": 30 }
            }]
        })))
        .mount(&server)
        .await;

    let profile = |secs: u64| {
        format!(
            "default_profile = \"lab\"\n\n[profiles.lab]\n\
             server = \"{}\"\nrefresh_interval = {secs}\n",
            server.uri()
        )
    };
    std::fs::write(&config, profile(60)).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_proxmon"))
        .args(["monitor", "watch", "--count", "2"])
        .env("PROXMON_CONFIG", &config)
        .env("HOME", "/tmp/proxmon-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/proxmon-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("PROXMON_PROFILE")
        .env_remove("PROXMON_SERVER")
        .env_remove("PROXMON_OUTPUT")
        .env_remove("PROXMON_COLOR")
        .env_remove("PROXMON_INSECURE")
        .env_remove("PROXMON_TIMEOUT")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Keep draining stdout for the life of the child; report the first frame.
    let stdout = child.stdout.take().unwrap();
    let (first_tx, first_rx) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let mut first_tx = Some(first_tx);
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if line.contains("PROD-MAIN-01") {
                if let Some(tx) = first_tx.take() {
                    let _ = tx.send(());
                }
            }
        }
    });
    let seen = tokio::time::timeout(Duration::from_secs(10), first_rx).await;
    assert!(matches!(seen, Ok(Ok(()))), "no first frame");

    // With a 60s period the second frame only arrives in time if the new
    // interval is applied, since applying it refreshes immediately.
    std::fs::write(&config, profile(1)).unwrap();
    let pid = child.id().to_string();
    let sent = Command::new("kill").args(["-HUP", &pid]).status().unwrap();
    assert!(sent.success());

    let pid = child.id();
    let waited = tokio::time::timeout(
        Duration::from_secs(10),
        tokio::task::spawn_blocking(move || child.wait().unwrap()),
    )
    .await;
    match waited {
        Ok(Ok(status)) => assert!(status.success(), "watch exited with {status}"),
        _ => {
            let _ = Command::new("kill").args(["-KILL", &pid.to_string()]).status();
            panic!("watch did not pick up the reloaded interval");
        }
    }
}
