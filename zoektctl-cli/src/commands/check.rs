//! `zoektctl check`: validate the config and show the synthesized argv.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use zoektctl_core::{config, discovery, SynthesizedArguments};
use zoektctl_renderer::shell_quote;

use super::Global;

/// Arguments for `zoektctl check`.
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let cfg = global.load_config()?;
        println!("{} {}", "✓".green(), global.config_path().display());

        let args = SynthesizedArguments::from_config(&cfg);
        let indexer = command_line(
            &cfg.packages.indexer_executable().display().to_string(),
            &args.indexer,
        )?;
        let webserver = command_line(
            &cfg.packages.webserver_executable().display().to_string(),
            &args.webserver,
        )?;
        println!("{}", "indexer:".bold());
        println!("  {indexer}");
        println!("{}", "webserver:".bold());
        println!("  {webserver}");

        if cfg.services_enabled() {
            println!(
                "services: {} (indexer every {}s)",
                "enabled".green(),
                cfg.daemon.index_interval_seconds
            );
        } else if cfg.daemon.enabled {
            println!("services: {} (no repositories)", "skipped".yellow());
        } else {
            println!("services: {}", "disabled".bright_black());
        }

        match discovery::descriptor(&cfg) {
            Some(_) => println!(
                "discovery: {} → {}",
                "enabled".green(),
                cfg.mcp.descriptor_path.display()
            ),
            None => println!("discovery: {}", "disabled".bright_black()),
        }

        let warnings = config::warnings(&cfg);
        if !warnings.is_empty() {
            println!("{} {} warning(s), see above", "!".yellow(), warnings.len());
        }
        Ok(())
    }
}

fn command_line(program: &str, args: &[String]) -> Result<String> {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|word| shell_quote(word).context("argument cannot be shell-quoted"))
        .collect::<Result<Vec<_>>>()
        .map(|words| words.join(" "))
}
