use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::*;
use zoektctl_core::config::resolve;
use zoektctl_core::{Config, Platform};
use zoektctl_install::{apply, manifest, status, uninstall, FileState, InstallError};
use zoektctl_renderer::Renderer;

fn config(home: &Path) -> Config {
    let mut cfg = resolve(Config::default(), home);
    cfg.daemon.enabled = true;
    cfg.daemon.repositories = vec![PathBuf::from("/code/api"), PathBuf::from("/code/web")];
    cfg.mcp.enabled = true;
    cfg
}

#[test]
fn launchd_apply_installs_agents_wrapper_and_descriptor() {
    let home = assert_fs::TempDir::new().unwrap();
    let report = apply(
        &config(home.path()),
        Platform::Launchd,
        home.path(),
        &Renderer::new().unwrap(),
        false,
    )
    .unwrap();
    assert!(report.has_services());

    home.child("Library/LaunchAgents/org.zoekt.webserver.plist")
        .assert(predicate::str::contains("<key>KeepAlive</key>"));
    home.child("Library/LaunchAgents/org.zoekt.indexer.plist")
        .assert(predicate::str::contains("<key>StartInterval</key>"));
    home.child(".local/share/zoektctl/bin/zoekt-index-wrapper")
        .assert(predicate::str::starts_with("#!/bin/sh"));
    home.child(".config/zoektctl/mcp-servers.json")
        .assert(predicate::str::contains("http://localhost:6070"));
    home.child("Library/Logs").assert(predicate::path::is_dir());
    home.child(".zoekt/logs").assert(predicate::path::is_dir());
}

#[test]
fn switching_platform_prunes_previous_units() {
    let home = assert_fs::TempDir::new().unwrap();
    let cfg = config(home.path());
    let renderer = Renderer::new().unwrap();

    apply(&cfg, Platform::Launchd, home.path(), &renderer, false).unwrap();
    apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();

    home.child("Library/LaunchAgents/org.zoekt.webserver.plist")
        .assert(predicate::path::missing());
    home.child(".config/systemd/user/zoekt-indexer.timer")
        .assert(predicate::path::exists());

    let manifest = manifest::load_at(home.path()).unwrap().unwrap();
    assert_eq!(manifest.platform, Platform::Systemd);
    assert!(manifest.files.keys().all(|k| !k.ends_with(".plist")));
}

#[test]
fn disabling_discovery_keeps_services() {
    let home = assert_fs::TempDir::new().unwrap();
    let mut cfg = config(home.path());
    let renderer = Renderer::new().unwrap();
    apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();

    cfg.mcp.enabled = false;
    apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();

    home.child(".config/zoektctl/mcp-servers.json")
        .assert(predicate::path::missing());
    home.child(".config/systemd/user/zoekt-webserver.service")
        .assert(predicate::path::exists());
}

#[test]
fn bootstrap_failure_installs_nothing() {
    let home = assert_fs::TempDir::new().unwrap();
    let mut cfg = config(home.path());
    home.child("blocker").write_str("not a directory").unwrap();
    cfg.daemon.index_directory = home.path().join("blocker/index");

    let err = apply(
        &cfg,
        Platform::Systemd,
        home.path(),
        &Renderer::new().unwrap(),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, InstallError::Bootstrap { .. }), "got: {err}");

    home.child(".config/systemd/user/zoekt-webserver.service")
        .assert(predicate::path::missing());
    home.child(".local/share/zoektctl/bin/zoekt-index-wrapper")
        .assert(predicate::path::missing());
    assert!(manifest::load_at(home.path()).unwrap().is_none());
}

#[test]
fn status_tracks_edits_and_missing_files() {
    let home = assert_fs::TempDir::new().unwrap();
    let cfg = config(home.path());
    let renderer = Renderer::new().unwrap();
    apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();

    home.child(".config/systemd/user/zoekt-indexer.timer")
        .write_str("[Timer]\n")
        .unwrap();
    std::fs::remove_file(home.path().join(".config/zoektctl/mcp-servers.json")).unwrap();

    let generation = renderer
        .render_config(&cfg, Platform::Systemd, home.path())
        .unwrap();
    let manifest = manifest::load_at(home.path()).unwrap();
    let states = status::check(&generation, manifest.as_ref()).unwrap();

    let state_of = |suffix: &str| {
        states
            .iter()
            .find(|s| s.path.to_string_lossy().ends_with(suffix))
            .map(|s| s.state)
            .unwrap()
    };
    assert_eq!(state_of("zoekt-indexer.timer"), FileState::Modified);
    assert_eq!(state_of("mcp-servers.json"), FileState::Missing);
    assert_eq!(state_of("zoekt-webserver.service"), FileState::Current);
}

#[test]
fn uninstall_after_apply_leaves_no_managed_files() {
    let home = assert_fs::TempDir::new().unwrap();
    apply(
        &config(home.path()),
        Platform::Systemd,
        home.path(),
        &Renderer::new().unwrap(),
        false,
    )
    .unwrap();

    let removed = uninstall(home.path(), false).unwrap();
    assert_eq!(removed.len(), 5);
    home.child(".config/systemd/user/zoekt-webserver.service")
        .assert(predicate::path::missing());
    home.child(".local/state/zoektctl/manifest.json")
        .assert(predicate::path::missing());
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn shared_descriptor_keeps_other_servers_through_uninstall() {
    let home = assert_fs::TempDir::new().unwrap();
    let shared = home.child(".mcp.json");
    shared
        .write_str(r#"{"mcpServers":{"github":{"command":"gh-mcp"}}}"#)
        .unwrap();
    let mut cfg = config(home.path());
    cfg.mcp.descriptor_path = shared.path().to_path_buf();
    let renderer = Renderer::new().unwrap();

    apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();
    let doc = read_json(shared.path());
    assert_eq!(doc["mcpServers"]["github"]["command"], "gh-mcp");
    assert_eq!(
        doc["mcpServers"]["zoekt"]["env"]["ZOEKT_URL"],
        "http://localhost:6070"
    );

    let generation = renderer
        .render_config(&cfg, Platform::Systemd, home.path())
        .unwrap();
    let manifest = manifest::load_at(home.path()).unwrap();
    let states = status::check(&generation, manifest.as_ref()).unwrap();
    assert!(states.iter().all(|s| s.state == FileState::Current), "{states:?}");

    let again = apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();
    assert!(!again.changed());

    uninstall(home.path(), false).unwrap();
    shared.assert(predicate::path::exists());
    let doc = read_json(shared.path());
    assert_eq!(doc["mcpServers"]["github"]["command"], "gh-mcp");
    assert!(doc["mcpServers"].get("zoekt").is_none());
}

#[test]
fn disabling_discovery_withdraws_only_our_entry() {
    let home = assert_fs::TempDir::new().unwrap();
    let shared = home.child(".mcp.json");
    shared
        .write_str(r#"{"mcpServers":{"github":{"command":"gh-mcp"}}}"#)
        .unwrap();
    let mut cfg = config(home.path());
    cfg.mcp.descriptor_path = shared.path().to_path_buf();
    let renderer = Renderer::new().unwrap();
    apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();

    cfg.mcp.enabled = false;
    apply(&cfg, Platform::Systemd, home.path(), &renderer, false).unwrap();

    let doc = read_json(shared.path());
    assert!(doc["mcpServers"].get("zoekt").is_none());
    assert_eq!(doc["mcpServers"]["github"]["command"], "gh-mcp");
    let manifest = manifest::load_at(home.path()).unwrap().unwrap();
    assert!(manifest.shared.is_empty());
    assert!(!manifest.files.contains_key(&manifest::key(shared.path())));
}
