//! `zoektctl init`: write the default config.

use anyhow::{Context, Result};
use clap::Args;

use zoektctl_core::config::{self, InitOutcome};

use super::Global;

/// Arguments for `zoektctl init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config with defaults.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let path = global.config_path();
        match config::init_to(&path, self.force).context("failed to write config")? {
            InitOutcome::Created(path) => {
                println!("✓ wrote default config to {}", path.display());
                println!("  add repositories under `daemon.repositories`, set `daemon.enabled: true`,");
                println!("  then run `zoektctl apply`.");
            }
            InitOutcome::AlreadyExists(path) => {
                println!(
                    "config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
        }
        Ok(())
    }
}
