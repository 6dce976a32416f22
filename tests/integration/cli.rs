//! The `unhacs` binary, run as a subprocess.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use unhacs_cli::manifest::Manifest;

/// `unhacs` rooted at `dir`, isolated from the user's global configuration.
fn unhacs(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("unhacs").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(dir.join("global.toml"))
        .arg("--config-dir")
        .arg(dir)
        .arg("--no-progress");
    cmd
}

fn write_global_config(dir: &Path, server: &MockServer) {
    let config = format!("api_url = \"{}\"\nretry_attempts = 1\ntimeout_secs = 5\n", server.base_url());
    std::fs::write(dir.join("global.toml"), config).unwrap();
}

fn mock_card_release(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases");
        then.status(200).json_body(json!([
            {"tag_name": "v2.0", "published_at": "2024-02-01T00:00:00Z", "assets": []},
            {"tag_name": "v1.0", "published_at": "2024-01-01T00:00:00Z", "assets": []}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases/tags/v2.0");
        then.status(200).json_body(json!({
            "tag_name": "v2.0",
            "assets": [{"name": "card.js", "browser_download_url": server.url("/downloads/v2.0/card.js")}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/contents/hacs.json");
        then.status(200).body(r#"{"filename": "card.js"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/downloads/v2.0/card.js");
        then.status(200).body("card v2.0");
    });
}

#[test]
fn test_add_list_remove_offline() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    unhacs(dir)
        .args(["add", "https://github.com/someone/card", "--category", "plugin", "--version", "v1.0", "--no-sync"])
        .assert()
        .success();
    unhacs(dir).args(["add", "someone/dark", "-t", "theme", "--no-sync"]).assert().success();

    let manifest = Manifest::load(&dir.join("unhacs.toml")).unwrap();
    assert_eq!(manifest.len(), 2);

    unhacs(dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("someone/card"))
        .stdout(predicate::str::contains("pinned v1.0"))
        .stdout(predicate::str::contains("not installed"));

    let output = unhacs(dir).args(["list", "--json"]).assert().success().get_output().stdout.clone();
    let listed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["name"], "card");
    assert_eq!(listed[0]["present"], false);

    unhacs(dir).args(["remove", "dark"]).assert().success();
    assert_eq!(Manifest::load(&dir.join("unhacs.toml")).unwrap().len(), 1);
}

#[test]
fn test_add_rejects_duplicates() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    unhacs(dir).args(["add", "someone/card", "-t", "plugin", "--no-sync"]).assert().success();
    unhacs(dir).args(["add", "other/card", "-t", "plugin", "--no-sync"]).assert().failure();
}

#[test]
fn test_remove_unknown_package_suggests_name() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    unhacs(dir).args(["add", "someone/card", "-t", "plugin", "--no-sync"]).assert().success();

    unhacs(dir)
        .args(["remove", "crad"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("crad"))
        .stderr(predicate::str::contains("card"));
}

#[test]
fn test_sync_without_packages_is_a_no_op() {
    let temp = TempDir::new().unwrap();

    unhacs(temp.path()).arg("sync").assert().success().stdout(predicate::str::contains("No packages tracked"));
    assert!(!temp.path().join("unhacs.toml").exists());
}

#[test]
fn test_sync_installs_from_github() {
    let server = MockServer::start();
    mock_card_release(&server);
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    write_global_config(dir, &server);

    unhacs(dir).args(["add", "someone/card", "-t", "plugin", "--no-sync"]).assert().success();
    unhacs(dir)
        .arg("outdated")
        .arg("--check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("not installed"));

    unhacs(dir).arg("sync").assert().success().stdout(predicate::str::contains("card v2.0"));

    assert_eq!(std::fs::read_to_string(dir.join("www/community/card/card.js")).unwrap(), "card v2.0");
    let manifest = Manifest::load(&dir.join("unhacs.toml")).unwrap();
    assert_eq!(manifest.get("card").unwrap().installed_version.as_deref(), Some("v2.0"));

    unhacs(dir).args(["outdated", "--check"]).assert().success();
}

#[test]
fn test_sync_reports_failures_with_exit_code() {
    let server = MockServer::start();
    mock_card_release(&server);
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/gone/releases");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    write_global_config(dir, &server);

    unhacs(dir).args(["add", "someone/gone", "-t", "plugin", "--no-sync"]).assert().success();
    unhacs(dir).args(["add", "someone/card", "-t", "plugin", "--no-sync"]).assert().success();

    unhacs(dir)
        .arg("sync")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("card v2.0"))
        .stderr(predicate::str::contains("gone"));

    // The healthy package was still installed and recorded.
    assert!(dir.join("www/community/card/card.js").is_file());
    let manifest = Manifest::load(&dir.join("unhacs.toml")).unwrap();
    assert_eq!(manifest.get("card").unwrap().installed_version.as_deref(), Some("v2.0"));
    assert_eq!(manifest.get("gone").unwrap().installed_version, None);
}
