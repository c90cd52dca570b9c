//! `zoektctl logs`: recent indexer and webserver output.

use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use zoektctl_core::Platform;
use zoektctl_service::{logs, systemd};

use crate::{platform_or_host, PlatformArg};

use super::Global;

/// Arguments for `zoektctl logs`.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Lines per log file.
    #[arg(long, default_value_t = 50)]
    pub lines: usize,

    /// Only show the `.err.log` files (launchd).
    #[arg(long)]
    pub stderr_only: bool,

    /// Target supervisor (default: this host's).
    #[arg(long)]
    pub platform: Option<PlatformArg>,
}

impl LogsArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        match platform_or_host(self.platform) {
            Platform::Launchd => {
                for path in logs::log_files(&global.home, self.stderr_only) {
                    let lines = logs::tail(&path, self.lines)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    println!("{}", format!("==> {} <==", path.display()).bold());
                    if lines.is_empty() {
                        println!("{}", "(empty)".bright_black());
                    }
                    for line in lines {
                        println!("{line}");
                    }
                }
                Ok(())
            }
            Platform::Systemd => {
                let status = Command::new("journalctl")
                    .args(systemd::journal_args(self.lines))
                    .status()
                    .context("failed to run journalctl")?;
                if !status.success() {
                    bail!("journalctl exited with {status}");
                }
                Ok(())
            }
        }
    }
}
