//! `zoektctl mcp`: print the discovery descriptor.

use anyhow::{Context, Result};
use clap::Args;

use zoektctl_core::discovery;

use super::Global;

/// Arguments for `zoektctl mcp`.
#[derive(Args, Debug)]
pub struct McpArgs {}

impl McpArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let cfg = global.load_config()?;
        let Some(descriptor) = discovery::descriptor(&cfg) else {
            eprintln!("discovery entry is disabled (set `mcp.enabled: true`)");
            return Ok(());
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&descriptor).context("failed to serialize descriptor")?
        );
        Ok(())
    }
}
