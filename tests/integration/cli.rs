use assert_cmd::Command;
use predicates::prelude::*;
use selfup::test_utils::release_json_with_base;
use std::path::Path;
use tempfile::TempDir;

const FEED_PATH: &str = "/repos/acme/tool/releases/latest";

/// `selfup` reading its config from `config`, so the host's own config never
/// leaks into a test.
fn selfup_with_config(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("selfup").unwrap();
    cmd.env_remove("SELFUP_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--no-progress")
        .arg("--config")
        .arg(config);
    cmd
}

/// `selfup` with a config path that does not exist, i.e. all defaults.
fn selfup(config_dir: &TempDir) -> Command {
    selfup_with_config(&config_dir.path().join("none.toml"))
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("selfup")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    Command::cargo_bin("selfup")
        .unwrap()
        .args(["-v", "-q", "platform"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_platform_json() {
    let temp = TempDir::new().unwrap();
    selfup(&temp)
        .args(["platform", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"self_update_supported\": true"))
        .stdout(predicate::str::contains(std::env::consts::ARCH));
}

#[test]
fn test_check_reports_available_update() {
    let temp = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let feed = server
        .mock("GET", FEED_PATH)
        .with_status(200)
        .with_body(release_json_with_base(
            "v99.0.0",
            &["tool-macos.zip", "tool-linux.tar.gz", "tool-windows.zip"],
            &server.url(),
        ))
        .expect(1)
        .create();

    let output = selfup(&temp)
        .args(["upgrade", "--check", "--format", "json"])
        .args(["--repo", "acme/tool", "--asset-prefix", "tool", "--api-url"])
        .arg(server.url())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["latest_version"], "v99.0.0");
    assert_eq!(report["update_available"], true);
    assert_eq!(report["downloaded"], false);
    assert_eq!(report["installed"], false);
    assert!(report["asset_name"].as_str().unwrap().starts_with("tool-"));
    feed.assert();
}

#[test]
fn test_check_reads_config_file() {
    let temp = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let feed = server
        .mock("GET", "/repos/acme/other/releases/latest")
        .with_status(200)
        .with_body(release_json_with_base("v0.0.1", &[], &server.url()))
        .expect(1)
        .create();

    let config_path = temp.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[update]\nrepository = \"acme/other\"\nasset_prefix = \"other\"\napi_url = \"{}\"\n",
            server.url()
        ),
    )
    .unwrap();

    selfup_with_config(&config_path)
        .args(["upgrade", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no build for"));
    feed.assert();
}

#[test]
fn test_missing_release_fails_with_suggestion() {
    let temp = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let _feed = server.mock("GET", FEED_PATH).with_status(404).create();

    selfup(&temp)
        .args(["upgrade", "--check", "--repo", "acme/tool", "--api-url"])
        .arg(server.url())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("HTTP 404"))
        .stderr(predicate::str::contains("Check the repository name"));
}

#[test]
fn test_invalid_repo_is_rejected_before_any_request() {
    let temp = TempDir::new().unwrap();
    selfup(&temp)
        .args(["upgrade", "--check", "--repo", "invalid", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid release feed 'invalid'"))
        .stderr(predicate::str::contains("owner/repo"));
}

#[test]
fn test_invalid_config_file() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("broken.toml");
    std::fs::write(&config_path, "[update\nrepository = ").unwrap();

    selfup_with_config(&config_path)
        .args(["upgrade", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
