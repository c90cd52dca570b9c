//! Managed-file status for `zoektctl status`.
//!
//! State precedence per file:
//! 1. `Missing` (recorded in the manifest, absent on disk)
//! 2. `Modified` (on-disk content differs from the hash the last apply wrote)
//! 3. `Orphan` (recorded, but no longer generated; next apply removes it)
//! 4. `Pending` (generated content differs from disk)
//! 5. `Current`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use zoektctl_renderer::Generation;

use crate::descriptor;
use crate::error::InstallError;
use crate::manifest::{self, Manifest};
use crate::writer::existing_digest;

/// State of one managed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Current,
    Pending,
    Modified,
    Missing,
    Orphan,
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileState::Current => "current",
            FileState::Pending => "pending",
            FileState::Modified => "modified",
            FileState::Missing => "missing",
            FileState::Orphan => "orphan",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub path: PathBuf,
    pub state: FileState,
}

/// Classify every generated file plus every file the manifest still records.
pub fn check(
    generation: &Generation,
    manifest: Option<&Manifest>,
) -> Result<Vec<FileStatus>, InstallError> {
    let recorded = |path: &Path| manifest.and_then(|m| m.files.get(&manifest::key(path)));

    let mut out = Vec::new();
    let mut generated = BTreeSet::new();
    for file in &generation.files {
        let key = manifest::key(&file.path);
        let owned = manifest.and_then(|m| m.shared.get(&key)).map(String::as_str);
        let installed = descriptor::effective(file, owned)?;
        generated.insert(key);
        let on_disk = existing_digest(&file.path)?;
        let wanted = manifest::digest(&installed.content.replace("\r\n", "\n"));
        let state = classify(
            on_disk.as_deref(),
            recorded(&file.path).map(String::as_str),
            false,
            &wanted,
        );
        out.push(FileStatus {
            path: file.path.clone(),
            state,
        });
    }

    if let Some(m) = manifest {
        for path in m.paths() {
            if generated.contains(&manifest::key(&path)) {
                continue;
            }
            let on_disk = existing_digest(&path)?;
            let state = classify(
                on_disk.as_deref(),
                recorded(&path).map(String::as_str),
                true,
                "",
            );
            out.push(FileStatus { path, state });
        }
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

fn classify(
    on_disk: Option<&str>,
    recorded: Option<&str>,
    orphan: bool,
    wanted: &str,
) -> FileState {
    match (on_disk, recorded) {
        (None, Some(_)) => FileState::Missing,
        (Some(disk), Some(hash)) if disk != hash => FileState::Modified,
        _ if orphan => FileState::Orphan,
        (Some(disk), _) if disk == wanted => FileState::Current,
        _ => FileState::Pending,
    }
}
