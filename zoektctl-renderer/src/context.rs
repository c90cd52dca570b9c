//! Template contexts: serializable rendering payloads built from a [`ServicePlan`].
//!
//! String fields are prepared for the target syntax here, before they reach
//! a template: systemd values get specifier escaping and `ExecStart` quoting,
//! wrapper values get POSIX shell quoting. Plist values stay raw and are
//! XML-escaped by the template.

use serde::{Deserialize, Serialize};

use zoektctl_core::units::{LogicalUnit, RestartPolicy, UnitKind, WrapperScript};
use zoektctl_core::Platform;

use crate::error::RenderError;

/// Shared header data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub version: String,
    pub platform: String,
}

impl MetaCtx {
    pub fn new(platform: Platform) -> Self {
        MetaCtx {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: platform.to_string(),
        }
    }
}

/// One supervised unit, prepared for a specific platform's syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCtx {
    pub id: String,
    pub description: String,
    pub program: String,
    pub args: Vec<String>,
    /// Full quoted command line (systemd only; empty on launchd).
    pub exec_start: String,
    pub working_directory: String,
    pub stdout_log: Option<String>,
    pub stderr_log: Option<String>,
    pub keep_alive: bool,
    pub restart: String,
    pub periodic: bool,
    pub interval_seconds: Option<u64>,
    pub after: Option<String>,
}

impl UnitCtx {
    pub fn from_unit(unit: &LogicalUnit, platform: Platform) -> Self {
        let program = unit.command.display().to_string();
        let working_directory = unit.working_directory.display().to_string();
        let (exec_start, working_directory) = match platform {
            Platform::Systemd => {
                let line = std::iter::once(program.as_str())
                    .chain(unit.args.iter().map(String::as_str))
                    .map(systemd_quote)
                    .collect::<Vec<_>>()
                    .join(" ");
                (line, escape_specifiers(&working_directory))
            }
            Platform::Launchd => (String::new(), working_directory),
        };

        UnitCtx {
            id: unit.id.clone(),
            description: unit.description.clone(),
            program,
            args: unit.args.clone(),
            exec_start,
            working_directory,
            stdout_log: unit.stdout_log.as_ref().map(|p| p.display().to_string()),
            stderr_log: unit.stderr_log.as_ref().map(|p| p.display().to_string()),
            keep_alive: unit.restart == RestartPolicy::Always,
            restart: match unit.restart {
                RestartPolicy::Always => "always".to_string(),
                RestartPolicy::Never => "no".to_string(),
            },
            periodic: matches!(unit.kind, UnitKind::Periodic { .. }),
            interval_seconds: unit.interval_seconds(),
            after: unit.after().map(|name| name.0.clone()),
        }
    }
}

/// Rendering payload for unit templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitContext {
    pub meta: MetaCtx,
    pub unit: UnitCtx,
}

impl UnitContext {
    pub fn new(unit: &LogicalUnit, platform: Platform) -> Self {
        UnitContext {
            meta: MetaCtx::new(platform),
            unit: UnitCtx::from_unit(unit, platform),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Shell-quoted wrapper fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperCtx {
    pub truncate_logs: Vec<String>,
    /// Quoted `dir:dir:dir` prefix, without the inherited `$PATH`.
    pub path_prefix: String,
    pub exec_line: String,
}

/// Rendering payload for the indexer wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperContext {
    pub meta: MetaCtx,
    pub wrapper: WrapperCtx,
}

impl WrapperContext {
    pub fn new(wrapper: &WrapperScript, platform: Platform) -> Result<Self, RenderError> {
        let truncate_logs = wrapper
            .truncate_logs
            .iter()
            .map(|p| shell_quote(&p.display().to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        let prefix = wrapper
            .path_prefix
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(":");

        let executable = wrapper.executable.display().to_string();
        let exec_line = std::iter::once(executable.as_str())
            .chain(wrapper.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Result<Vec<_>, _>>()?
            .join(" ");

        Ok(WrapperContext {
            meta: MetaCtx::new(platform),
            wrapper: WrapperCtx {
                truncate_logs,
                path_prefix: shell_quote(&prefix)?,
                exec_line,
            },
        })
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

// ---------------------------------------------------------------------------
// Quoting
// ---------------------------------------------------------------------------

/// POSIX shell quoting; arguments with spaces stay one word.
pub fn shell_quote(value: &str) -> Result<String, RenderError> {
    shlex::try_quote(value)
        .map(|quoted| quoted.into_owned())
        .map_err(|_| RenderError::Quote {
            value: value.to_string(),
        })
}

/// Quote one `ExecStart=` word per systemd.service(5) command-line rules.
pub fn systemd_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@*".contains(c));
    if plain {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("%%"),
            '$' => out.push_str("$$"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Escape `%` specifiers in a systemd value that is not a command line.
pub fn escape_specifiers(value: &str) -> String {
    value.replace('%', "%%")
}
