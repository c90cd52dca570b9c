pub mod apply;
pub mod check;
pub mod diff;
pub mod init;
pub mod logs;
pub mod mcp;
pub mod render;
pub mod status;
pub mod uninstall;

use std::path::PathBuf;

use anyhow::{Context, Result};

use zoektctl_core::{config, Config};
use zoektctl_renderer::Renderer;

/// Options every subcommand sees.
#[derive(Debug)]
pub struct Global {
    pub home: PathBuf,
    pub config: Option<PathBuf>,
}

impl Global {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| config::config_path_at(&self.home))
    }

    /// Load, resolve and validate the config.
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        config::load_from(&path, &self.home)
            .with_context(|| format!("failed to load config from {}", path.display()))
    }

    /// Renderer with the user's template overrides applied.
    pub fn renderer(&self) -> Result<Renderer> {
        Renderer::with_user_templates(&self.home).context("failed to load templates")
    }
}
