//! Filesystem conventions, all rooted at an explicit `home`.

use std::path::{Path, PathBuf};

pub const WEBSERVER_UNIT: &str = "zoekt-webserver";
pub const INDEXER_UNIT: &str = "zoekt-indexer";
pub const WEBSERVER_LABEL: &str = "org.zoekt.webserver";
pub const INDEXER_LABEL: &str = "org.zoekt.indexer";

pub const WRAPPER_NAME: &str = "zoekt-index-wrapper";
pub const CONFIG_FILE: &str = "config.yaml";
pub const MANIFEST_FILE: &str = "manifest.json";

pub fn config_dir(home: &Path) -> PathBuf {
    home.join(".config").join("zoektctl")
}

pub fn config_path(home: &Path) -> PathBuf {
    config_dir(home).join(CONFIG_FILE)
}

/// User `.tera` overrides for the embedded unit templates.
pub fn templates_dir(home: &Path) -> PathBuf {
    config_dir(home).join("templates")
}

pub fn data_dir(home: &Path) -> PathBuf {
    home.join(".local").join("share").join("zoektctl")
}

pub fn wrapper_path(home: &Path) -> PathBuf {
    data_dir(home).join("bin").join(WRAPPER_NAME)
}

pub fn state_dir(home: &Path) -> PathBuf {
    home.join(".local").join("state").join("zoektctl")
}

pub fn manifest_path(home: &Path) -> PathBuf {
    state_dir(home).join(MANIFEST_FILE)
}

pub fn launch_agents_dir(home: &Path) -> PathBuf {
    home.join("Library").join("LaunchAgents")
}

pub fn launchd_plist_path(home: &Path, label: &str) -> PathBuf {
    launch_agents_dir(home).join(format!("{label}.plist"))
}

pub fn launchd_logs_dir(home: &Path) -> PathBuf {
    home.join("Library").join("Logs")
}

pub fn launchd_stdout_log(home: &Path, unit: &str) -> PathBuf {
    launchd_logs_dir(home).join(format!("{unit}.log"))
}

pub fn launchd_stderr_log(home: &Path, unit: &str) -> PathBuf {
    launchd_logs_dir(home).join(format!("{unit}.err.log"))
}

pub fn systemd_user_dir(home: &Path) -> PathBuf {
    home.join(".config").join("systemd").join("user")
}

/// `<unit>.<suffix>` under the systemd user directory, e.g. `zoekt-indexer.timer`.
pub fn systemd_unit_path(home: &Path, unit: &str, suffix: &str) -> PathBuf {
    systemd_user_dir(home).join(format!("{unit}.{suffix}"))
}
