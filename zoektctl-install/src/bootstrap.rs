//! Directory bootstrap, run to completion before any file is installed.

use std::path::{Path, PathBuf};

use zoektctl_core::{paths, Config, Platform};

use crate::error::InstallError;

/// Every directory an apply for `config` on `platform` relies on, in creation order.
///
/// Service directories are only listed when the service gate is open; the
/// descriptor's parent only when the discovery entry is enabled.
pub fn required_directories(config: &Config, platform: Platform, home: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![paths::state_dir(home)];

    if config.services_enabled() {
        dirs.push(config.daemon.index_directory.clone());
        dirs.push(config.webserver.log_directory.clone());
        if let Some(parent) = paths::wrapper_path(home).parent() {
            dirs.push(parent.to_path_buf());
        }
        match platform {
            Platform::Launchd => {
                dirs.push(paths::launch_agents_dir(home));
                dirs.push(paths::launchd_logs_dir(home));
            }
            Platform::Systemd => dirs.push(paths::systemd_user_dir(home)),
        }
    }

    if config.mcp.enabled {
        if let Some(parent) = config.mcp.descriptor_path.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    let mut seen = std::collections::BTreeSet::new();
    dirs.retain(|d| seen.insert(d.clone()));
    dirs
}

/// Create every directory in `dirs`. Re-running is a no-op.
///
/// Returns the directories that did not exist before. The first failure
/// aborts with [`InstallError::Bootstrap`].
pub fn ensure_directories(dirs: &[PathBuf]) -> Result<Vec<PathBuf>, InstallError> {
    let mut created = Vec::new();
    for dir in dirs {
        if dir.is_dir() {
            continue;
        }
        std::fs::create_dir_all(dir).map_err(|source| InstallError::Bootstrap {
            path: dir.clone(),
            source,
        })?;
        tracing::info!("created directory: {}", dir.display());
        created.push(dir.clone());
    }
    Ok(created)
}
