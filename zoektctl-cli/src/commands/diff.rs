//! `zoektctl diff`: show unified diffs for what apply would write.

use anyhow::{Context, Result};
use clap::Args;

use zoektctl_install::diff::diff;

use crate::{platform_or_host, PlatformArg};

use super::Global;

/// Arguments for `zoektctl diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Target supervisor (default: this host's).
    #[arg(long)]
    pub platform: Option<PlatformArg>,
}

impl DiffArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let cfg = global.load_config()?;
        let platform = platform_or_host(self.platform);

        let diffs = diff(&cfg, platform, &global.home, &global.renderer()?)
            .with_context(|| format!("diff failed for {platform}"))?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
