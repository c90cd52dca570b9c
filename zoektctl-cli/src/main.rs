//! zoektctl: Zoekt code-search service manager.
//!
//! # Usage
//!
//! ```text
//! zoektctl init [--force]
//! zoektctl check
//! zoektctl render [--platform launchd|systemd]
//! zoektctl apply [--dry-run] [--no-activate] [--platform launchd|systemd]
//! zoektctl diff [--platform launchd|systemd]
//! zoektctl status [--json]
//! zoektctl mcp
//! zoektctl uninstall [--dry-run]
//! zoektctl logs [--lines N] [--stderr-only]
//! ```

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    apply::ApplyArgs, check::CheckArgs, diff::DiffArgs, init::InitArgs, logs::LogsArgs,
    mcp::McpArgs, render::RenderArgs, status::StatusArgs, uninstall::UninstallArgs, Global,
};
use zoektctl_core::Platform;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "zoektctl",
    version,
    about = "Generate and manage Zoekt indexer and webserver user services",
    long_about = None,
)]
struct Cli {
    /// Read the config from this file instead of ~/.config/zoektctl/config.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the default config to ~/.config/zoektctl/config.yaml.
    Init(InitArgs),

    /// Validate the config and print both synthesized command lines.
    Check(CheckArgs),

    /// Print every file a generation pass would produce.
    Render(RenderArgs),

    /// Install generated files and (re)load the services.
    Apply(ApplyArgs),

    /// Show a unified diff of what apply would change.
    Diff(DiffArgs),

    /// Show the state of every managed file.
    Status(StatusArgs),

    /// Print the MCP discovery descriptor.
    Mcp(McpArgs),

    /// Stop the services and remove every managed file.
    Uninstall(UninstallArgs),

    /// Show recent indexer and webserver output.
    Logs(LogsArgs),
}

// ---------------------------------------------------------------------------
// Shared Platform argument: parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `Platform` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct PlatformArg(pub Platform);

impl FromStr for PlatformArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "launchd" | "macos" => Ok(Self(Platform::Launchd)),
            "systemd" | "linux" => Ok(Self(Platform::Systemd)),
            other => Err(format!(
                "unknown platform '{other}'; expected: launchd, systemd"
            )),
        }
    }
}

impl fmt::Display for PlatformArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<PlatformArg> for Platform {
    fn from(p: PlatformArg) -> Self {
        p.0
    }
}

/// `--platform` value, or the host's supervisor family.
pub fn platform_or_host(arg: Option<PlatformArg>) -> Platform {
    arg.map(Platform::from).unwrap_or_else(Platform::current)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    let global = Global {
        home,
        config: cli.config,
    };

    match cli.command {
        Commands::Init(args) => args.run(&global),
        Commands::Check(args) => args.run(&global),
        Commands::Render(args) => args.run(&global),
        Commands::Apply(args) => args.run(&global),
        Commands::Diff(args) => args.run(&global),
        Commands::Status(args) => args.run(&global),
        Commands::Mcp(args) => args.run(&global),
        Commands::Uninstall(args) => args.run(&global),
        Commands::Logs(args) => args.run(&global),
    }
}
