//! `zoektctl uninstall`: stop services and remove managed files.

use anyhow::{Context, Result};
use clap::Args;

use zoektctl_install::{manifest, WriteResult};

use super::Global;

/// Arguments for `zoektctl uninstall`.
#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Show what would be removed without touching anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl UninstallArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let Some(previous) = manifest::load_at(&global.home).context("failed to read manifest")?
        else {
            println!("Nothing installed.");
            return Ok(());
        };

        if !self.dry_run {
            if let Err(err) = zoektctl_service::deactivate(previous.platform) {
                tracing::warn!("failed to stop services: {err}");
            }
        }

        let removed =
            zoektctl_install::uninstall(&global.home, self.dry_run).context("uninstall failed")?;
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!("{prefix}✓ {} file(s) removed", removed.len());
        for r in &removed {
            match r {
                WriteResult::WouldRemove { path } => println!("  -  {}", path.display()),
                other => println!("  ✗  {}", other.path().display()),
            }
        }
        Ok(())
    }
}
