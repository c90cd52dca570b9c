//! Platform-neutral description of the two supervised units.
//!
//! [`plan`] produces one [`ServicePlan`] per generation pass. Renderers for
//! launchd and systemd consume the same plan, so argument construction lives
//! here exactly once.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::args::SynthesizedArguments;
use crate::paths::{self, INDEXER_LABEL, INDEXER_UNIT, WEBSERVER_LABEL, WEBSERVER_UNIT};
use crate::types::{Config, Platform, UnitName};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What the supervisor does when the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Keep alive indefinitely.
    Always,
    /// Run to completion; the next trigger starts it again.
    Never,
}

/// Lifecycle shape of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitKind {
    Persistent,
    Periodic {
        interval_seconds: u64,
        /// Unit this one is ordered after, where the platform can express it.
        after: Option<UnitName>,
    },
}

/// One supervised process, independent of unit-file syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalUnit {
    /// Stem shared across platforms, e.g. `zoekt-webserver`.
    pub name: UnitName,
    /// Supervisor identifier: launchd label or systemd unit file name.
    pub id: String,
    pub description: String,
    pub kind: UnitKind,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub working_directory: PathBuf,
    /// `None` means the supervisor's own log sink (the journal on systemd).
    pub stdout_log: Option<PathBuf>,
    pub stderr_log: Option<PathBuf>,
    pub restart: RestartPolicy,
}

impl LogicalUnit {
    pub fn interval_seconds(&self) -> Option<u64> {
        match self.kind {
            UnitKind::Periodic {
                interval_seconds, ..
            } => Some(interval_seconds),
            UnitKind::Persistent => None,
        }
    }

    pub fn after(&self) -> Option<&UnitName> {
        match &self.kind {
            UnitKind::Periodic { after, .. } => after.as_ref(),
            UnitKind::Persistent => None,
        }
    }
}

/// Thin launcher for the indexer: prepare logs and `PATH`, then `exec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperScript {
    /// Where the script is installed.
    pub path: PathBuf,
    /// Files emptied (or created) before each run.
    pub truncate_logs: Vec<PathBuf>,
    /// Directories prepended to the inherited `PATH`, in lookup order.
    pub path_prefix: Vec<PathBuf>,
    pub executable: PathBuf,
    pub args: Vec<String>,
}

/// Everything the renderers need for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePlan {
    pub platform: Platform,
    pub server: LogicalUnit,
    pub indexer: LogicalUnit,
    pub wrapper: WrapperScript,
}

impl ServicePlan {
    pub fn units(&self) -> [&LogicalUnit; 2] {
        [&self.server, &self.indexer]
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Supervisor identifier for a unit stem on `platform`.
pub fn unit_id(platform: Platform, stem: &str) -> String {
    match (platform, stem) {
        (Platform::Launchd, WEBSERVER_UNIT) => WEBSERVER_LABEL.to_string(),
        (Platform::Launchd, INDEXER_UNIT) => INDEXER_LABEL.to_string(),
        (Platform::Launchd, other) => format!("org.zoekt.{other}"),
        (Platform::Systemd, other) => format!("{other}.service"),
    }
}

fn log_files(platform: Platform, home: &Path, stem: &str) -> (Option<PathBuf>, Option<PathBuf>) {
    match platform {
        Platform::Launchd => (
            Some(paths::launchd_stdout_log(home, stem)),
            Some(paths::launchd_stderr_log(home, stem)),
        ),
        Platform::Systemd => (None, None),
    }
}

/// Build the indexer launcher for `platform`.
pub fn wrapper_script(config: &Config, platform: Platform, home: &Path) -> WrapperScript {
    let truncate_logs = match log_files(platform, home, INDEXER_UNIT) {
        (Some(out), Some(err)) => vec![out, err],
        _ => Vec::new(),
    };

    // The indexer probes PATH for ctags and git by name.
    let mut path_prefix = Vec::new();
    if config.ctags.enabled {
        if let Some(dir) = &config.packages.ctags_bin_dir {
            path_prefix.push(dir.clone());
        }
    }
    path_prefix.push(config.packages.zoekt_bin_dir.clone());
    path_prefix.push(config.packages.git_bin_dir.clone());

    WrapperScript {
        path: paths::wrapper_path(home),
        truncate_logs,
        path_prefix,
        executable: config.packages.indexer_executable(),
        args: SynthesizedArguments::from_config(config).indexer,
    }
}

/// Logical units for `config` on `platform`.
///
/// Returns `None` unless the daemon is enabled and has repositories; both
/// units are produced together or not at all.
pub fn plan(config: &Config, platform: Platform, home: &Path) -> Option<ServicePlan> {
    if !config.services_enabled() {
        return None;
    }

    let args = SynthesizedArguments::from_config(config);
    let index_dir = config.daemon.index_directory.clone();

    let (stdout_log, stderr_log) = log_files(platform, home, WEBSERVER_UNIT);
    let server = LogicalUnit {
        name: UnitName::from(WEBSERVER_UNIT),
        id: unit_id(platform, WEBSERVER_UNIT),
        description: "Zoekt code search webserver".to_string(),
        kind: UnitKind::Persistent,
        command: config.packages.webserver_executable(),
        args: args.webserver,
        working_directory: index_dir.clone(),
        stdout_log,
        stderr_log,
        restart: RestartPolicy::Always,
    };

    let after = match platform {
        Platform::Systemd => Some(UnitName::from(server.id.clone())),
        Platform::Launchd => None,
    };
    let wrapper = wrapper_script(config, platform, home);
    let (stdout_log, stderr_log) = log_files(platform, home, INDEXER_UNIT);
    let indexer = LogicalUnit {
        name: UnitName::from(INDEXER_UNIT),
        id: unit_id(platform, INDEXER_UNIT),
        description: "Zoekt periodic git indexer".to_string(),
        kind: UnitKind::Periodic {
            interval_seconds: config.daemon.index_interval_seconds,
            after,
        },
        command: wrapper.path.clone(),
        args: Vec::new(),
        working_directory: index_dir,
        stdout_log,
        stderr_log,
        restart: RestartPolicy::Never,
    };

    Some(ServicePlan {
        platform,
        server,
        indexer,
        wrapper,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
