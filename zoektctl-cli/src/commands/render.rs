//! `zoektctl render`: print every generated file without writing.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::{platform_or_host, PlatformArg};

use super::Global;

/// Arguments for `zoektctl render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Target supervisor (default: this host's).
    #[arg(long)]
    pub platform: Option<PlatformArg>,
}

impl RenderArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let cfg = global.load_config()?;
        let platform = platform_or_host(self.platform);
        let generation = global
            .renderer()?
            .render_config(&cfg, platform, &global.home)
            .with_context(|| format!("render failed for {platform}"))?;

        if generation.files.is_empty() {
            println!("Nothing to generate: services and discovery are both disabled.");
            return Ok(());
        }

        for file in &generation.files {
            println!("{}", format!("==> {} <==", file.path.display()).bold());
            print!("{}", file.content);
            if !file.content.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
