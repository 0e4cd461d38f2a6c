//! Integration tests for the `opnly` CLI binary.
//!
//! Argument parsing, the login gate and the local bookmark commands run
//! against a throwaway database; remote commands run against a wiremock
//! appliance.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `opnly` binary with env isolation.
///
/// Config and data directories point into `home`, the database lives
/// there too, and no `OPNLY_*` variable leaks in from the caller. Stdin is
/// a pipe, so prompts fail instead of waiting.
fn opnly_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("opnly");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("OPNLY_DATABASE", home.join("opnly.db"))
        .env_remove("OPNLY_PASSWORD")
        .env_remove("OPNLY_OUTPUT")
        .env_remove("OPNLY_API_SECRET")
        .env_remove("OPNLY_NEW_PASSWORD")
        .env_remove("RUST_LOG")
        .write_stdin("");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Store credentials pointing at `server` without contacting it.
fn configure(home: &Path, server: &MockServer, extra: &[&str]) {
    let port = server.address().port().to_string();
    opnly_cmd(home)
        .args(["setup", "--host", "http://127.0.0.1", "--port", &port])
        .args(["--key", "test-key", "--secret", "test-secret", "--skip-probe"])
        .args(extra)
        .assert()
        .success();
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = opnly_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("rules")
            .and(predicate::str::contains("vpn"))
            .and(predicate::str::contains("aliases"))
            .and(predicate::str::contains("arp")),
    );
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_config_path_under_config_home() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_writes_settings_once() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .env("OPNLY_POLL_INTERVAL_MS", "750")
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("config.toml"));

    let path = opnly_cmd(home.path())
        .args(["config", "path"])
        .output()
        .unwrap();
    let path = String::from_utf8(path.stdout).unwrap();
    let written = std::fs::read_to_string(path.trim()).unwrap();
    assert!(written.contains("poll_interval_ms = 750"), "{written}");

    let again = opnly_cmd(home.path())
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(again.status.code(), Some(2));

    opnly_cmd(home.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_before_setup() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("get_timeout_secs = 5")
                .and(predicate::str::contains("not configured")),
        );
    assert!(!home.path().join("opnly.db").exists());
}

// ── Local bookmarks ─────────────────────────────────────────────────

#[test]
fn test_probe_without_setup() {
    let home = TempDir::new().unwrap();
    let output = opnly_cmd(home.path()).arg("probe").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("opnly setup"));
}

#[test]
fn test_bookmarks_listed_unknown_without_setup() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .args(["rules", "add", "WAN-block", "uuid-1"])
        .assert()
        .success();
    opnly_cmd(home.path())
        .args(["rules", "add", "LAN-allow", "uuid-2"])
        .assert()
        .success();

    let output = opnly_cmd(home.path())
        .args(["rules", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "WAN-block");
    assert_eq!(rows[0]["state"], "unknown");
    assert_eq!(rows[1]["uuid"], "uuid-2");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Setup required"));
}

#[test]
fn test_vpn_watch_rejects_zero_interval() {
    let home = TempDir::new().unwrap();
    let output = opnly_cmd(home.path())
        .args(["vpn", "watch", "--interval-ms", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--interval-ms"));
}

#[test]
fn test_remove_unknown_bookmark() {
    let home = TempDir::new().unwrap();
    let output = opnly_cmd(home.path())
        .args(["rules", "remove", "nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_import_bookmarks() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("rules.json");
    std::fs::write(
        &file,
        r#"[{"name": "a", "uuid": "uuid-a"}, {"name": "b", "uuid": "uuid-b"}]"#,
    )
    .unwrap();

    opnly_cmd(home.path())
        .args(["rules", "import"])
        .arg(&file)
        .assert()
        .success();
    opnly_cmd(home.path())
        .args(["rules", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uuid-a").and(predicate::str::contains("uuid-b")));
}

// ── Login gate ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_gate() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    configure(home.path(), &server, &["--login-password", "hunter2"]);

    // Non-interactive without a password
    let mut bare = opnly_cmd(home.path());
    bare.args(["rules", "list"]);
    assert_eq!(run(bare).await.status.code(), Some(3));

    let mut wrong = opnly_cmd(home.path());
    wrong.args(["rules", "list", "--password", "hunter"]);
    assert_eq!(run(wrong).await.status.code(), Some(3));

    let mut right = opnly_cmd(home.path());
    right
        .args(["rules", "list"])
        .env("OPNLY_PASSWORD", "hunter2");
    assert!(run(right).await.status.success());

    // Re-running setup requires the password too
    let mut setup = opnly_cmd(home.path());
    setup.args(["setup", "--skip-probe", "--clear-password"]);
    assert_eq!(run(setup).await.status.code(), Some(3));
}

#[tokio::test]
async fn test_passwd_then_clear() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    configure(home.path(), &server, &[]);

    let mut mismatch = opnly_cmd(home.path());
    mismatch.args(["passwd", "--new-password", "a", "--confirm", "b"]);
    assert_eq!(run(mismatch).await.status.code(), Some(2));

    let mut set = opnly_cmd(home.path());
    set.args(["passwd", "--new-password", "s3cret"]);
    assert!(run(set).await.status.success());

    let mut gated = opnly_cmd(home.path());
    gated.args(["rules", "list"]);
    assert_eq!(run(gated).await.status.code(), Some(3));

    let mut clear = opnly_cmd(home.path());
    clear.args(["passwd", "--clear", "--password", "s3cret"]);
    assert!(run(clear).await.status.success());

    let mut open = opnly_cmd(home.path());
    open.args(["rules", "list"]);
    assert!(run(open).await.status.success());
}

// ── Remote commands ─────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_probes_firewall() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/core/menu/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let port = server.address().port().to_string();
    let mut cmd = opnly_cmd(home.path());
    cmd.args(["setup", "--host", "http://127.0.0.1", "--port", &port])
        .args(["--key", "k", "--secret", "s"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Firewall reachable"));
}

#[tokio::test]
async fn test_unauthorized_exit_code() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/core/menu/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    configure(home.path(), &server, &[]);

    let mut cmd = opnly_cmd(home.path());
    cmd.arg("probe");
    assert_eq!(run(cmd).await.status.code(), Some(3));
}

#[tokio::test]
async fn test_toggle_bookmarked_rule_by_name() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/firewall/filter/getRule/uuid-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "rule": { "enabled": "1" } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/firewall/filter/toggleRule/uuid-1/0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": "Disabled", "changed": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/firewall/filter/apply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    configure(home.path(), &server, &[]);
    opnly_cmd(home.path())
        .args(["rules", "add", "WAN-block", "uuid-1"])
        .assert()
        .success();

    let mut cmd = opnly_cmd(home.path());
    cmd.args(["rules", "toggle", "WAN-block"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Rule has been disabled"));
}

#[tokio::test]
async fn test_failed_apply_exit_code() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wireguard/general/get"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "general": { "enabled": "0" } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wireguard/general/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "saved" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wireguard/service/reconfigure"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "failed" })))
        .mount(&server)
        .await;
    configure(home.path(), &server, &[]);

    let mut cmd = opnly_cmd(home.path());
    cmd.args(["vpn", "toggle"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_arp_flush_requires_confirmation() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/diagnostics/interface/flushArp"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "192.168.1.10 (192.168.1.10) deleted\n192.168.1.11 (192.168.1.11) deleted\n",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/diagnostics/interface/getArp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ip": "192.168.1.1", "hostname": "gw", "mac": "00:11:22:33:44:55", "intf": "igb0" }
        ])))
        .mount(&server)
        .await;
    configure(home.path(), &server, &[]);

    let mut refused = opnly_cmd(home.path());
    refused.args(["arp", "flush"]);
    assert_eq!(run(refused).await.status.code(), Some(2));
    assert!(
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .all(|r| r.url.path() != "/api/diagnostics/interface/flushArp")
    );

    let mut cmd = opnly_cmd(home.path());
    cmd.args(["arp", "flush", "--yes", "-o", "plain"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("192.168.1.1"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Flushed 2 entries"));
}
