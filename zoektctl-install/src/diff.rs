//! Dry-run unified diff support for `zoektctl diff`.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use zoektctl_core::{Config, Platform};
use zoektctl_renderer::Renderer;

use crate::descriptor;
use crate::error::{io_err, InstallError};
use crate::manifest;

/// A single pending file change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render what `apply` would install and compare it to on-disk content.
///
/// Files the previous apply installed but the current config no longer
/// generates appear as full deletions; a shared descriptor shows only its
/// zoektctl entry going away. No files are written.
pub fn diff(
    config: &Config,
    platform: Platform,
    home: &Path,
    renderer: &Renderer,
) -> Result<Vec<FileDiff>, InstallError> {
    let generation = renderer.render_config(config, platform, home)?;

    let previous = manifest::load_at(home)?;
    let owned = |key: &str| {
        previous
            .as_ref()
            .and_then(|m| m.shared.get(key))
            .map(String::as_str)
    };

    let mut diffs = Vec::new();
    let mut generated = BTreeSet::new();
    for file in &generation.files {
        let key = manifest::key(&file.path);
        let installed = descriptor::effective(file, owned(key.as_str()))?;
        generated.insert(key);
        let rendered = normalize_line_endings(&installed.content);
        let existing = read_existing_or_empty(&file.path)?;
        if existing == rendered {
            continue;
        }
        diffs.push(unified(&file.path, &existing, &rendered));
    }

    if let Some(previous) = &previous {
        for path in previous.paths() {
            let key = manifest::key(&path);
            if generated.contains(&key) {
                continue;
            }
            let existing = read_existing_or_empty(&path)?;
            if existing.is_empty() {
                continue;
            }
            let left = match owned(key.as_str()) {
                Some(server) => descriptor::remaining(&path, server)?.unwrap_or_default(),
                None => String::new(),
            };
            diffs.push(unified(&path, &existing, &left));
        }
    }

    Ok(diffs)
}

fn unified(path: &Path, old: &str, new: &str) -> FileDiff {
    let old_header = format!("a{}", path.display());
    let new_header = format!("b{}", path.display());
    let unified_diff = TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    FileDiff {
        path: path.to_path_buf(),
        unified_diff,
    }
}

fn read_existing_or_empty(path: &Path) -> Result<String, InstallError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
