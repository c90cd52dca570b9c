//! zoektctl core library: configuration model, argument synthesis, unit plans.
//!
//! - [`types`]: config sections with central defaults
//! - [`config`]: load / resolve / validate / init
//! - [`args`]: `zoekt-git-index` and `zoekt-webserver` argv
//! - [`units`]: platform-neutral [`ServicePlan`]
//! - [`discovery`]: MCP server descriptor
//! - [`paths`]: filesystem conventions

pub mod args;
pub mod config;
pub mod discovery;
pub mod error;
pub mod paths;
pub mod types;
pub mod units;

pub use args::SynthesizedArguments;
pub use discovery::{build_server_entry, McpServers, ServerEntry};
pub use error::ConfigError;
pub use types::{
    Config, CtagsConfig, DaemonConfig, McpEntryConfig, PackagesConfig, Platform, UnitName,
    WebserverConfig,
};
pub use units::{plan, LogicalUnit, RestartPolicy, ServicePlan, UnitKind, WrapperScript};
