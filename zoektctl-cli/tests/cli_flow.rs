use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const CONFIG: &str = r#"
daemon:
  enabled: true
  repositories:
    - /srv/git/api
    - /srv/git/my repo
  port: 6090
  branches: main,dev
mcp:
  enabled: true
"#;

fn zoektctl(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zoektctl"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(home: &Path) {
    let dir = home.join(".config/zoektctl");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(dir.join("config.yaml"), CONFIG).expect("write config");
}

#[test]
fn init_then_init_again() {
    let home = TempDir::new().expect("home");
    zoektctl(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("wrote default config"));
    assert!(home.path().join(".config/zoektctl/config.yaml").exists());

    zoektctl(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("already exists"));
}

#[test]
fn init_writes_to_explicit_config_path() {
    let home = TempDir::new().expect("home");
    let custom = home.path().join("profiles/work.yaml");
    zoektctl(home.path())
        .args(["--config", custom.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(contains("work.yaml"));
    assert!(custom.exists());
    assert!(!home.path().join(".config/zoektctl/config.yaml").exists());

    zoektctl(home.path())
        .args(["--config", custom.to_str().unwrap(), "check"])
        .assert()
        .success();
}

#[test]
fn check_without_config_points_at_init() {
    let home = TempDir::new().expect("home");
    zoektctl(home.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("zoektctl init"));
}

#[test]
fn check_prints_both_command_lines() {
    let home = TempDir::new().expect("home");
    write_config(home.path());
    zoektctl(home.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("zoekt-git-index -index"))
        .stdout(contains("-branches main,dev"))
        .stdout(contains("my repo"))
        .stdout(contains("-listen"))
        .stdout(contains(":6090"));
}

#[test]
fn check_rejects_invalid_values() {
    let home = TempDir::new().expect("home");
    let dir = home.path().join(".config/zoektctl");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yaml"), "daemon:\n  branches: \"main, dev\"\n").unwrap();

    zoektctl(home.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("daemon.branches"));
}

#[test]
fn explicit_config_flag_is_honoured() {
    let home = TempDir::new().expect("home");
    let elsewhere = home.path().join("alt.yaml");
    fs::write(&elsewhere, "daemon:\n  port: 7111\n").unwrap();

    zoektctl(home.path())
        .args(["--config", elsewhere.to_str().unwrap(), "check"])
        .assert()
        .success()
        .stdout(contains("7111"));
}

#[test]
fn render_systemd_prints_units_and_timer() {
    let home = TempDir::new().expect("home");
    write_config(home.path());
    zoektctl(home.path())
        .args(["render", "--platform", "systemd"])
        .assert()
        .success()
        .stdout(contains("zoekt-indexer.timer <=="))
        .stdout(contains("After=zoekt-webserver.service"))
        .stdout(contains("\"ZOEKT_URL\": \"http://localhost:6090\""));
}

#[test]
fn unknown_platform_is_rejected() {
    let home = TempDir::new().expect("home");
    write_config(home.path());
    zoektctl(home.path())
        .args(["render", "--platform", "upstart"])
        .assert()
        .failure()
        .stderr(contains("unknown platform"));
}

#[test]
fn apply_dry_run_writes_nothing() {
    let home = TempDir::new().expect("home");
    write_config(home.path());
    zoektctl(home.path())
        .args(["apply", "--dry-run", "--platform", "launchd"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("launchctl bootstrap"));

    assert!(!home
        .path()
        .join("Library/LaunchAgents/org.zoekt.webserver.plist")
        .exists());
    assert!(!home.path().join(".local/state/zoektctl/manifest.json").exists());
}

#[test]
fn apply_then_status_diff_and_uninstall() {
    let home = TempDir::new().expect("home");
    write_config(home.path());

    zoektctl(home.path())
        .args(["apply", "--no-activate", "--platform", "systemd"])
        .assert()
        .success()
        .stdout(contains("5 changed"));
    assert!(home
        .path()
        .join(".config/systemd/user/zoekt-indexer.timer")
        .exists());

    let output = zoektctl(home.path())
        .args(["status", "--json"])
        .output()
        .expect("status");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["platform"], "systemd");
    let files = json["files"].as_array().expect("files");
    assert_eq!(files.len(), 5);
    assert!(files.iter().all(|f| f["state"] == "current"));

    zoektctl(home.path())
        .args(["diff", "--platform", "systemd"])
        .assert()
        .success()
        .stdout(contains("No differences."));

    zoektctl(home.path())
        .arg("uninstall")
        .assert()
        .success()
        .stdout(contains("5 file(s) removed"));
    assert!(!home
        .path()
        .join(".config/systemd/user/zoekt-webserver.service")
        .exists());
}

#[test]
fn switching_platform_stops_the_old_supervisor_first() {
    let home = TempDir::new().expect("home");
    write_config(home.path());
    zoektctl(home.path())
        .args(["apply", "--no-activate", "--platform", "systemd"])
        .assert()
        .success();

    zoektctl(home.path())
        .args(["apply", "--dry-run", "--platform", "launchd"])
        .assert()
        .success()
        .stdout(contains("would stop systemd services"));
}

#[test]
fn mcp_prints_descriptor() {
    let home = TempDir::new().expect("home");
    write_config(home.path());
    zoektctl(home.path())
        .arg("mcp")
        .assert()
        .success()
        .stdout(contains("\"mcpServers\""))
        .stdout(contains("http://localhost:6090"));
}

#[test]
fn mcp_disabled_prints_nothing_on_stdout() {
    let home = TempDir::new().expect("home");
    zoektctl(home.path()).arg("init").assert().success();
    zoektctl(home.path())
        .arg("mcp")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(contains("disabled"));
}

#[test]
fn logs_on_launchd_reads_log_files() {
    let home = TempDir::new().expect("home");
    let logs = home.path().join("Library/Logs");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("zoekt-indexer.err.log"), "first\nsecond\nthird\n").unwrap();

    zoektctl(home.path())
        .args(["logs", "--platform", "launchd", "--stderr-only", "--lines", "2"])
        .assert()
        .success()
        .stdout(contains("second\nthird"))
        .stdout(contains("first").not());
}
