//! YAML configuration: load, resolve, validate, save.
//!
//! # Storage layout
//!
//! ```text
//! ~/.config/zoektctl/
//!   config.yaml      (mode 0600, created by `zoektctl init`)
//!   templates/       (optional `.tera` overrides)
//! ```
//!
//! # API pattern
//!
//! Every function that touches the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Loading always runs [`resolve`] then [`validate`], so a [`Config`] handed
//! to the generators is absolute-pathed and pre-validated.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use globset::Glob;

use crate::error::{io_err, ConfigError};
use crate::paths;
use crate::types::Config;

const CONFIG_HEADER: &str = "\
# zoektctl configuration.
#
# `zoektctl apply` turns this file into a zoekt-webserver service, a periodic
# zoekt-git-index job and (optionally) an MCP server descriptor.
# Paths may start with `~`. Unknown keys are rejected.
";

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// `<home>/.config/zoektctl/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    paths::config_path(home)
}

/// Load, resolve and validate the config at its default location.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home), home)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Load, resolve and validate a config at an explicit `path`.
pub fn load_from(path: &Path, home: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let raw: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = resolve(raw, home);
    validate(&config)?;
    for warning in warnings(&config) {
        tracing::warn!("{warning}");
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// 2. Resolve
// ---------------------------------------------------------------------------

/// Expand a leading `~` component against `home`.
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Expand `~` in every path-valued field.
pub fn resolve(mut config: Config, home: &Path) -> Config {
    let expand = |p: &mut PathBuf| *p = expand_home(p, home);

    expand(&mut config.daemon.index_directory);
    config.daemon.repositories.iter_mut().for_each(expand);
    expand(&mut config.webserver.log_directory);
    expand(&mut config.mcp.executable_path);
    expand(&mut config.mcp.descriptor_path);
    expand(&mut config.packages.zoekt_bin_dir);
    expand(&mut config.packages.git_bin_dir);
    if let Some(dir) = config.packages.ctags_bin_dir.as_mut() {
        expand(dir);
    }
    config
}

// ---------------------------------------------------------------------------
// 3. Validate
// ---------------------------------------------------------------------------

/// Reject configurations the generators cannot turn into valid units.
///
/// Must run before any generation pass; a failure here blocks the whole pass.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let daemon = &config.daemon;

    if daemon.port == 0 {
        return Err(ConfigError::invalid("daemon.port", "must be in 1..=65535"));
    }
    if daemon.index_interval_seconds == 0 {
        return Err(ConfigError::invalid(
            "daemon.index_interval_seconds",
            "must be positive",
        ));
    }
    if daemon.parallelism == 0 {
        return Err(ConfigError::invalid("daemon.parallelism", "must be positive"));
    }
    if daemon.file_size_limit_bytes == 0 {
        return Err(ConfigError::invalid(
            "daemon.file_size_limit_bytes",
            "must be positive",
        ));
    }
    validate_branches(&daemon.branches)?;

    for pattern in &daemon.large_file_patterns {
        if pattern.trim().is_empty() {
            return Err(ConfigError::invalid(
                "daemon.large_file_patterns",
                "patterns must not be empty",
            ));
        }
        Glob::new(pattern).map_err(|e| {
            ConfigError::invalid("daemon.large_file_patterns", format!("`{pattern}`: {e}"))
        })?;
    }

    require_absolute("daemon.index_directory", &daemon.index_directory)?;
    for repo in &daemon.repositories {
        require_absolute("daemon.repositories", repo)?;
    }

    let webserver = &config.webserver;
    require_absolute("webserver.log_directory", &webserver.log_directory)?;
    match parse_go_duration(&webserver.log_refresh_interval) {
        Some(d) if !d.is_zero() => {}
        _ => {
            return Err(ConfigError::invalid(
                "webserver.log_refresh_interval",
                format!(
                    "`{}` is not a positive duration like `24h` or `1h30m`",
                    webserver.log_refresh_interval
                ),
            ))
        }
    }

    let mcp = &config.mcp;
    if mcp.server_name.trim().is_empty() {
        return Err(ConfigError::invalid("mcp.server_name", "must not be empty"));
    }
    if !mcp.executable_path.is_absolute() && mcp.executable_path.components().count() != 1 {
        return Err(ConfigError::invalid(
            "mcp.executable_path",
            "must be an absolute path or a bare command name",
        ));
    }
    require_absolute("mcp.descriptor_path", &mcp.descriptor_path)?;

    let packages = &config.packages;
    require_absolute("packages.zoekt_bin_dir", &packages.zoekt_bin_dir)?;
    require_absolute("packages.git_bin_dir", &packages.git_bin_dir)?;
    if let Some(dir) = &packages.ctags_bin_dir {
        require_absolute("packages.ctags_bin_dir", dir)?;
    }

    Ok(())
}

/// Non-fatal observations about a valid config.
pub fn warnings(config: &Config) -> Vec<String> {
    let mut out = Vec::new();
    if config.mcp.enabled && !config.webserver.rpc_enabled {
        out.push(
            "mcp.enabled is set but webserver.rpc_enabled is false; zoekt-mcp needs the RPC endpoint"
                .to_string(),
        );
    }
    if config.daemon.enabled && config.daemon.repositories.is_empty() {
        out.push("daemon.enabled is set but daemon.repositories is empty; no services will be generated".to_string());
    }
    if config.ctags.require_success && !config.ctags.enabled {
        out.push("ctags.require_success has no effect while ctags.enabled is false".to_string());
    }
    out
}

fn validate_branches(branches: &str) -> Result<(), ConfigError> {
    if branches.is_empty() {
        return Err(ConfigError::invalid("daemon.branches", "must not be empty"));
    }
    if branches
        .split(',')
        .any(|b| b.is_empty() || b.chars().any(char::is_whitespace))
    {
        return Err(ConfigError::invalid(
            "daemon.branches",
            format!("`{branches}` must be a comma-joined list without spaces"),
        ));
    }
    Ok(())
}

fn require_absolute(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if !path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
        return Err(ConfigError::invalid(
            field,
            format!("`{}` must be an absolute path", path.display()),
        ));
    }
    Ok(())
}

/// Parse a Go `time.ParseDuration` string (`300ms`, `1h30m`, `24h`).
///
/// Signs are not accepted; the webserver flags using this only take
/// positive intervals.
pub fn parse_go_duration(input: &str) -> Option<Duration> {
    if input == "0" {
        return Some(Duration::ZERO);
    }
    if input.is_empty() {
        return None;
    }

    let mut rest = input;
    let mut nanos = 0f64;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return None;
        }
        let value: f64 = rest[..num_len].parse().ok()?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        nanos += value * scale;
        rest = &rest[unit_len..];
    }
    Some(Duration::from_nanos(nanos as u64))
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<home>/.config/zoektctl/config.yaml`.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    save_to(&config_path_at(home), config)
}

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// A parent directory created here gets mode 0700.
pub fn save_to(path: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
            set_dir_permissions(dir)?;
        }
    }
    let tmp_path = path.with_extension("yaml.tmp");

    let yaml = format!("{CONFIG_HEADER}{}", serde_yaml::to_string(config)?);
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    Ok(path.to_path_buf())
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Result of [`init_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Write the default config unless one already exists (or `force` is set).
pub fn init_at(home: &Path, force: bool) -> Result<InitOutcome, ConfigError> {
    init_to(&config_path_at(home), force)
}

/// Write the default config to an explicit `path` (`--config`).
pub fn init_to(path: &Path, force: bool) -> Result<InitOutcome, ConfigError> {
    if path.exists() && !force {
        return Ok(InitOutcome::AlreadyExists(path.to_path_buf()));
    }
    let path = save_to(path, &Config::default())?;
    Ok(InitOutcome::Created(path))
}

/// `init_at` convenience wrapper.
pub fn init(force: bool) -> Result<InitOutcome, ConfigError> {
    init_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The current user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
