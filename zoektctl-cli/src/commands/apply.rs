//! `zoektctl apply`: install generated files and reload the services.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use zoektctl_core::Platform;
use zoektctl_install::{manifest, ApplyReport, Manifest, WriteResult};

use crate::{platform_or_host, PlatformArg};

use super::Global;

/// Arguments for `zoektctl apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Show what would change without writing or activating anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Write files but leave the supervisor alone.
    #[arg(long)]
    pub no_activate: bool,

    /// Target supervisor (default: this host's).
    #[arg(long)]
    pub platform: Option<PlatformArg>,
}

impl ApplyArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let cfg = global.load_config()?;
        let platform = platform_or_host(self.platform);
        let renderer = global.renderer()?;

        // Units of another platform are about to be pruned; unload them first.
        let previous = manifest::load_at(&global.home).context("failed to read manifest")?;
        if let Some(old) = replaced_platform(previous.as_ref(), platform) {
            if self.dry_run {
                println!("[dry-run] would stop {old} services");
            } else if !self.no_activate {
                if let Err(err) = zoektctl_service::deactivate(old) {
                    tracing::warn!("failed to stop {old} services: {err}");
                }
            }
        }

        let report =
            zoektctl_install::apply(&cfg, platform, &global.home, &renderer, self.dry_run)
                .with_context(|| format!("apply failed for {platform}"))?;
        print_report(&report);

        if self.dry_run {
            if let Some(plan) = &report.generation.plan {
                println!("[dry-run] would run:");
                for call in zoektctl_service::planned_activation(plan, &global.home) {
                    println!("  $ {call}");
                }
            }
            return Ok(());
        }
        if self.no_activate {
            return Ok(());
        }

        match &report.generation.plan {
            Some(plan) => {
                zoektctl_service::activate(plan, &global.home)
                    .with_context(|| format!("failed to activate {platform} services"))?;
                println!("{} services loaded ({platform})", "✓".green());
            }
            None if removed_any(&report) => {
                if let Err(err) = zoektctl_service::deactivate(platform) {
                    tracing::warn!("failed to stop services: {err}");
                }
            }
            None => {}
        }
        Ok(())
    }
}

/// Platform of the previous apply when it differs from `platform`.
fn replaced_platform(previous: Option<&Manifest>, platform: Platform) -> Option<Platform> {
    previous
        .map(|m| m.platform)
        .filter(|old| *old != platform)
}

fn removed_any(report: &ApplyReport) -> bool {
    report
        .writes
        .iter()
        .any(|w| matches!(w, WriteResult::Removed { .. }))
}

fn print_report(report: &ApplyReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    for dir in &report.created_dirs {
        println!("{prefix}  +  {}/", dir.display());
    }

    let changed = report.writes.iter().filter(|w| w.is_change()).count();
    let unchanged = report.writes.len() - changed;
    if report.writes.is_empty() {
        println!("{prefix}✓ nothing to do: services and discovery are both disabled");
        return;
    }

    println!(
        "{prefix}✓ {} ({changed} changed, {unchanged} unchanged)",
        report.platform()
    );
    for w in &report.writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
            WriteResult::Removed { path } => println!("  ✗  {}", path.display()),
            WriteResult::WouldRemove { path } => println!("  -  {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_switch_names_the_old_supervisor() {
        let launchd = Manifest::new(Platform::Launchd);
        assert_eq!(
            replaced_platform(Some(&launchd), Platform::Systemd),
            Some(Platform::Launchd)
        );
        assert_eq!(replaced_platform(Some(&launchd), Platform::Launchd), None);
        assert_eq!(replaced_platform(None, Platform::Systemd), None);
    }
}
