//! Apply and uninstall pipelines shared by the CLI commands.
//!
//! An apply is: render → bootstrap directories → write changed files →
//! prune files the previous apply installed but this one no longer
//! generates → save manifest. Bootstrap failures abort before any write.
//! The MCP descriptor is merged into, and withdrawn from, whatever
//! `mcpServers` document already sits at its path.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::Utc;

use zoektctl_core::{Config, Platform};
use zoektctl_renderer::{ArtifactKind, Generation, Renderer};

use crate::bootstrap;
use crate::descriptor;
use crate::error::InstallError;
use crate::manifest::{self, Manifest};
use crate::writer::{self, WriteResult};

/// Outcome of one apply.
#[derive(Debug)]
pub struct ApplyReport {
    pub generation: Generation,
    /// Directories created (or, on dry-run, that would be created).
    pub created_dirs: Vec<PathBuf>,
    pub writes: Vec<WriteResult>,
    pub dry_run: bool,
}

impl ApplyReport {
    pub fn platform(&self) -> Platform {
        self.generation.platform
    }

    /// True when at least one file was (or would be) written or removed.
    pub fn changed(&self) -> bool {
        self.writes.iter().any(WriteResult::is_change)
    }

    /// True when a supervised unit is installed after this apply.
    pub fn has_services(&self) -> bool {
        self.generation.plan.is_some()
    }
}

/// Render, bootstrap, install and prune for `config` on `platform`.
///
/// If a write fails midway the manifest is still saved with every file
/// installed so far, so a later apply or uninstall can find them.
pub fn apply(
    config: &Config,
    platform: Platform,
    home: &Path,
    renderer: &Renderer,
    dry_run: bool,
) -> Result<ApplyReport, InstallError> {
    let generation = renderer.render_config(config, platform, home)?;

    let dirs = bootstrap::required_directories(config, platform, home);
    let created_dirs = if dry_run {
        dirs.into_iter().filter(|d| !d.is_dir()).collect()
    } else {
        bootstrap::ensure_directories(&dirs)?
    };

    let previous = manifest::load_at(home)?;
    let mut next = Manifest::new(platform);
    if let Some(prev) = &previous {
        next.files = prev.files.clone();
        next.shared = prev.shared.clone();
    }

    let mut writes = Vec::new();
    let installed = install(
        &generation,
        previous.as_ref(),
        &config.mcp.server_name,
        &mut next,
        &mut writes,
        dry_run,
    );

    if !dry_run {
        next.applied_at = Utc::now();
        if let Err(err) = installed {
            if let Err(save_err) = manifest::save_at(home, &next) {
                tracing::warn!("could not record partial apply: {save_err}");
            }
            return Err(err);
        }
        manifest::save_at(home, &next)?;
    } else {
        installed?;
    }

    Ok(ApplyReport {
        generation,
        created_dirs,
        writes,
        dry_run,
    })
}

/// Write every generated file, then prune what the previous apply left behind.
fn install(
    generation: &Generation,
    previous: Option<&Manifest>,
    server_name: &str,
    next: &mut Manifest,
    writes: &mut Vec<WriteResult>,
    dry_run: bool,
) -> Result<(), InstallError> {
    let mut generated = BTreeSet::new();
    for file in &generation.files {
        let key = manifest::key(&file.path);
        let owned = previous.and_then(|m| m.shared.get(&key)).map(String::as_str);
        let file = descriptor::effective(file, owned)?;
        writes.push(writer::atomic_write(&file, &mut next.files, dry_run)?);
        if file.kind == ArtifactKind::McpDescriptor && !dry_run {
            next.shared.insert(key.clone(), server_name.to_string());
        }
        generated.insert(key);
    }

    let stale: Vec<PathBuf> = previous
        .iter()
        .flat_map(|m| m.paths())
        .filter(|p| !generated.contains(&manifest::key(p)))
        .collect();
    for path in stale {
        writes.push(release(&path, next, dry_run)?);
    }
    Ok(())
}

/// Remove one managed file, or only zoektctl's key from a shared document.
fn release(
    path: &Path,
    manifest: &mut Manifest,
    dry_run: bool,
) -> Result<WriteResult, InstallError> {
    let key = manifest::key(path);
    let result = match manifest.shared.get(&key).cloned() {
        Some(server) => descriptor::withdraw(path, &server, &mut manifest.files, dry_run)?,
        None => writer::remove(path, &mut manifest.files, dry_run)?,
    };
    if !dry_run {
        manifest.shared.remove(&key);
    }
    Ok(result)
}

/// Remove every file recorded in the manifest, then the manifest itself.
///
/// Shared descriptor documents lose only zoektctl's entry. Returns an empty
/// list when nothing was ever applied.
pub fn uninstall(home: &Path, dry_run: bool) -> Result<Vec<WriteResult>, InstallError> {
    let Some(mut manifest) = manifest::load_at(home)? else {
        return Ok(Vec::new());
    };

    let paths: Vec<PathBuf> = manifest.paths().collect();
    let mut results = Vec::new();
    for path in paths {
        results.push(release(&path, &mut manifest, dry_run)?);
    }

    if !dry_run {
        manifest::remove_at(home)?;
    }
    Ok(results)
}
