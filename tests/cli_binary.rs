use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const TOKEN_VAR: &str = "GT_TEST_ACCESS_TOKEN";

#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("gt").unwrap();
    cmd.env_remove(TOKEN_VAR).env_remove("GT_ACCESS_TOKEN");
    cmd
}

/// Config pointing every user-scoped path into `dir`, so no test touches the
/// real config or cache directories.
fn write_config(dir: &Path) -> String {
    let config = dir.join("config.toml");
    fs::write(
        &config,
        format!(
            "token_env = \"{TOKEN_VAR}\"\ntoken_path = \"{}\"\ncache_dir = \"{}\"\n",
            dir.join("token.json").display(),
            dir.join("cache").display()
        ),
    )
    .unwrap();
    config.to_str().unwrap().to_string()
}

// --- Help & version ---

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Google Tasks"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gt"));
}

#[test]
fn edit_help_lists_flags() {
    cmd()
        .args(["edit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--move-to"))
        .stdout(predicate::str::contains("--clear-due"));
}

#[test]
fn add_rejects_bad_due_date() {
    cmd()
        .args(["add", "x", "--due", "next week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

// --- Config ---

#[test]
fn missing_explicit_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    cmd()
        .args(["--config", missing.to_str().unwrap(), "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn invalid_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "cache_ttl = 0\n").unwrap();
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cache_ttl must be > 0"));
}

// --- Auth ---

#[test]
fn list_without_token_fails_before_any_request() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_config(dir.path());
    cmd()
        .args(["--config", &config, "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no access token"))
        .stderr(predicate::str::contains(TOKEN_VAR));
}

#[test]
fn expired_stored_token_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_config(dir.path());
    fs::write(
        dir.path().join("token.json"),
        r#"{"access_token":"stale","expiry":"2001-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    cmd()
        .args(["--config", &config, "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expired"));
}

#[test]
fn logout_removes_token_and_mirror() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_config(dir.path());
    let token = dir.path().join("token.json");
    let mirror = dir.path().join("cache").join("cache.json");
    fs::write(&token, r#"{"access_token":"t"}"#).unwrap();
    fs::create_dir_all(mirror.parent().unwrap()).unwrap();
    fs::write(&mirror, "{}").unwrap();

    cmd()
        .args(["--config", &config, "logout"])
        .assert()
        .success()
        .stdout("Logged out.\n");

    assert!(!token.exists());
    assert!(!mirror.exists());
}

#[test]
fn logout_twice_is_fine() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_config(dir.path());
    for _ in 0..2 {
        cmd()
            .args(["--config", &config, "logout"])
            .assert()
            .success();
    }
}
