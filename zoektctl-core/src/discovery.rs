//! MCP discovery descriptor for `zoekt-mcp`.
//!
//! The descriptor is a static declaration: it says how to start the
//! auxiliary process and where the webserver listens, with no knowledge of
//! whether the webserver is actually running.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{Config, McpEntryConfig};

/// Environment variable `zoekt-mcp` reads its endpoint from.
pub const ENDPOINT_ENV_VAR: &str = "ZOEKT_URL";

/// Base URL of the webserver as seen from the local host.
pub fn endpoint_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// One entry under `mcpServers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub command: PathBuf,
    pub env: BTreeMap<String, String>,
}

/// Document consumed by the MCP host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServers {
    #[serde(rename = "mcpServers")]
    pub servers: BTreeMap<String, ServerEntry>,
}

/// Build the entry, or `None` when the MCP entry is disabled.
pub fn build_server_entry(mcp: &McpEntryConfig, port: u16) -> Option<ServerEntry> {
    if !mcp.enabled {
        return None;
    }
    let mut env = BTreeMap::new();
    env.insert(ENDPOINT_ENV_VAR.to_string(), endpoint_url(port));
    Some(ServerEntry {
        command: mcp.executable_path.clone(),
        env,
    })
}

/// Full descriptor document for `config`, keyed by `mcp.server_name`.
pub fn descriptor(config: &Config) -> Option<McpServers> {
    let entry = build_server_entry(&config.mcp, config.daemon.port)?;
    let mut servers = BTreeMap::new();
    servers.insert(config.mcp.server_name.clone(), entry);
    Some(McpServers { servers })
}
