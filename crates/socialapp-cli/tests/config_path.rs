use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("socialapp")
        .env("SOCIALAPP_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("socialapp")
        .env("SOCIALAPP_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[api]"));
    assert!(contents.contains("# base_url ="));
    assert!(contents.contains("request_timeout_secs = 30"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("socialapp")
        .env("SOCIALAPP_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_set_url_writes_base_url() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("socialapp")
        .env("SOCIALAPP_HOME", dir.path())
        .args(["config", "set-url", "https://api.example.com"])
        .assert()
        .success();

    let contents = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(contents.contains(r#"base_url = "https://api.example.com""#));
    assert!(contents.contains("[log]"));
}

#[test]
fn test_config_set_url_rejects_other_schemes() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("socialapp")
        .env("SOCIALAPP_HOME", dir.path())
        .args(["config", "set-url", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));

    assert!(!dir.path().join("config.toml").exists());
}
