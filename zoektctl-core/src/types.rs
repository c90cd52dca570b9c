//! Configuration model for the Zoekt service generator.
//!
//! Every struct deserializes with `#[serde(default, deny_unknown_fields)]`:
//! missing fields take the defaults declared in this module and unknown
//! fields are rejected at parse time. Paths may start with `~`; they are
//! expanded by [`crate::config`] before validation.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Branch selector Zoekt indexes when none is given.
pub const DEFAULT_BRANCHES: &str = "HEAD";
pub const DEFAULT_PORT: u16 = 6070;
pub const DEFAULT_INDEX_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_PARALLELISM: u32 = 4;
/// Zoekt's own `-file_limit` default (2 MiB).
pub const DEFAULT_FILE_LIMIT_BYTES: u64 = 2 * 1024 * 1024;
pub const DEFAULT_LOG_REFRESH: &str = "24h";
pub const DEFAULT_MCP_EXECUTABLE: &str = "zoekt-mcp";
pub const DEFAULT_MCP_SERVER_NAME: &str = "zoekt";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a supervised unit (launchd label or systemd unit stem).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitName(pub String);

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UnitName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UnitName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Host process supervisor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS user agents under `~/Library/LaunchAgents`.
    Launchd,
    /// systemd user units under `~/.config/systemd/user`.
    Systemd,
}

impl Platform {
    /// Supervisor family of the machine this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Launchd
        } else {
            Platform::Systemd
        }
    }

    pub fn all() -> &'static [Platform] {
        &[Platform::Launchd, Platform::Systemd]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Launchd => write!(f, "launchd"),
            Platform::Systemd => write!(f, "systemd"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// Persistent server + periodic indexer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    pub enabled: bool,
    /// Git checkouts to index, in the order they are passed to the indexer.
    pub repositories: Vec<PathBuf>,
    /// Shard directory shared by indexer (writer) and webserver (reader).
    pub index_directory: PathBuf,
    pub port: u16,
    pub index_interval_seconds: u64,
    pub delta_indexing: bool,
    /// Comma-joined branch list; `HEAD` is Zoekt's implicit default.
    pub branches: String,
    pub large_file_patterns: Vec<String>,
    pub parallelism: u32,
    pub file_size_limit_bytes: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            enabled: false,
            repositories: Vec::new(),
            index_directory: PathBuf::from("~/.zoekt"),
            port: DEFAULT_PORT,
            index_interval_seconds: DEFAULT_INDEX_INTERVAL_SECS,
            delta_indexing: false,
            branches: DEFAULT_BRANCHES.to_string(),
            large_file_patterns: Vec::new(),
            parallelism: DEFAULT_PARALLELISM,
            file_size_limit_bytes: DEFAULT_FILE_LIMIT_BYTES,
        }
    }
}

/// universal-ctags integration for symbol indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CtagsConfig {
    pub enabled: bool,
    /// Fail the indexing run when symbol extraction fails.
    pub require_success: bool,
}

impl Default for CtagsConfig {
    fn default() -> Self {
        CtagsConfig {
            enabled: true,
            require_success: false,
        }
    }
}

/// `zoekt-webserver` behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebserverConfig {
    /// Must stay on for the MCP entry to be usable.
    pub rpc_enabled: bool,
    pub html_enabled: bool,
    pub pprof_enabled: bool,
    pub log_directory: PathBuf,
    /// Go duration string, e.g. `24h` or `1h30m`.
    pub log_refresh_interval: String,
}

impl Default for WebserverConfig {
    fn default() -> Self {
        WebserverConfig {
            rpc_enabled: true,
            html_enabled: true,
            pprof_enabled: false,
            log_directory: PathBuf::from("~/.zoekt/logs"),
            log_refresh_interval: DEFAULT_LOG_REFRESH.to_string(),
        }
    }
}

/// Discovery entry for the `zoekt-mcp` query-translation process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McpEntryConfig {
    pub enabled: bool,
    /// Bare name (resolved on the host's `PATH`) or absolute path.
    pub executable_path: PathBuf,
    /// Key under `mcpServers` in the published descriptor.
    pub server_name: String,
    pub descriptor_path: PathBuf,
}

impl Default for McpEntryConfig {
    fn default() -> Self {
        McpEntryConfig {
            enabled: false,
            executable_path: PathBuf::from(DEFAULT_MCP_EXECUTABLE),
            server_name: DEFAULT_MCP_SERVER_NAME.to_string(),
            descriptor_path: PathBuf::from("~/.config/zoektctl/mcp-servers.json"),
        }
    }
}

/// Where the external executables live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagesConfig {
    /// Directory holding `zoekt-git-index` and `zoekt-webserver`.
    pub zoekt_bin_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctags_bin_dir: Option<PathBuf>,
    pub git_bin_dir: PathBuf,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        PackagesConfig {
            zoekt_bin_dir: PathBuf::from("/usr/local/bin"),
            ctags_bin_dir: None,
            git_bin_dir: PathBuf::from("/usr/bin"),
        }
    }
}

impl PackagesConfig {
    pub fn indexer_executable(&self) -> PathBuf {
        self.zoekt_bin_dir.join("zoekt-git-index")
    }

    pub fn webserver_executable(&self) -> PathBuf {
        self.zoekt_bin_dir.join("zoekt-webserver")
    }
}

/// Root of the zoektctl YAML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub daemon: DaemonConfig,
    pub ctags: CtagsConfig,
    pub webserver: WebserverConfig,
    pub mcp: McpEntryConfig,
    pub packages: PackagesConfig,
}

impl Config {
    /// The single enable gate for service units: enabled and something to index.
    pub fn services_enabled(&self) -> bool {
        self.daemon.enabled && !self.daemon.repositories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
