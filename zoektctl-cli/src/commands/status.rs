//! `zoektctl status`: managed-file visibility.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use zoektctl_core::Platform;
use zoektctl_install::{manifest, status, FileState, FileStatus};

use crate::{platform_or_host, PlatformArg};

use super::Global;

/// Arguments for `zoektctl status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Target supervisor (default: the last applied one, else this host's).
    #[arg(long)]
    pub platform: Option<PlatformArg>,
}

#[derive(Serialize)]
struct StatusReportJson {
    platform: Platform,
    applied_at: Option<DateTime<Utc>>,
    services_enabled: bool,
    discovery_enabled: bool,
    files: Vec<FileStatus>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "state")]
    state: String,
}

impl StatusArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let cfg = global.load_config()?;
        let previous = manifest::load_at(&global.home).context("failed to read manifest")?;
        let platform = match (self.platform, &previous) {
            (Some(arg), _) => arg.into(),
            (None, Some(m)) => m.platform,
            (None, None) => platform_or_host(None),
        };

        let generation = global
            .renderer()?
            .render_config(&cfg, platform, &global.home)
            .with_context(|| format!("render failed for {platform}"))?;
        let files = status::check(&generation, previous.as_ref()).context("status check failed")?;

        let report = StatusReportJson {
            platform,
            applied_at: previous.as_ref().map(|m| m.applied_at),
            services_enabled: generation.plan.is_some(),
            discovery_enabled: generation.descriptor.is_some(),
            files,
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(report);
        Ok(())
    }
}

fn print_table(report: StatusReportJson) {
    let applied = report
        .applied_at
        .map(format_age)
        .unwrap_or_else(|| "never".to_string());
    println!(
        "zoektctl v{} | {} | services {} | discovery {} | applied {}",
        env!("CARGO_PKG_VERSION"),
        report.platform,
        on_off(report.services_enabled),
        on_off(report.discovery_enabled),
        applied,
    );

    if report.files.is_empty() {
        println!("No managed files.");
        return;
    }

    let needs_apply = report
        .files
        .iter()
        .any(|f| f.state != FileState::Current);
    let rows: Vec<StatusTableRow> = report
        .files
        .into_iter()
        .map(|f| StatusTableRow {
            file: f.path.display().to_string(),
            state: state_label(f.state),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if needs_apply {
        println!("Run 'zoektctl apply' to bring managed files up to date.");
    }
}

fn on_off(enabled: bool) -> String {
    if enabled {
        "on".green().to_string()
    } else {
        "off".bright_black().to_string()
    }
}

fn state_label(state: FileState) -> String {
    let label = state.to_string().to_uppercase();
    match state {
        FileState::Current => label.green().to_string(),
        FileState::Pending => label.yellow().to_string(),
        FileState::Modified => label.red().to_string(),
        FileState::Missing => label.red().bold().to_string(),
        FileState::Orphan => label.magenta().to_string(),
    }
}

fn format_age(at: DateTime<Utc>) -> String {
    let secs = (Utc::now() - at).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}
