//! Apply manifest: SHA-256 record of every file the last apply installed.
//!
//! Persists a [`Manifest`] JSON document at
//! `<home>/.local/state/zoektctl/manifest.json`.
//! Writes use an atomic `.tmp` + rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use zoektctl_core::{paths, Platform};

use crate::error::{io_err, InstallError};

/// Maps absolute file path strings to the SHA-256 hex digest last written.
pub type FileHashes = BTreeMap<String, String>;

/// On-disk manifest payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub platform: Platform,
    pub applied_at: DateTime<Utc>,
    pub files: FileHashes,
    /// Shared `mcpServers` documents: path → the server key zoektctl owns there.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shared: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(platform: Platform) -> Self {
        Manifest {
            platform,
            applied_at: Utc::now(),
            files: BTreeMap::new(),
            shared: BTreeMap::new(),
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.keys().map(PathBuf::from)
    }
}

/// Key used for `path` in [`FileHashes`].
pub fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// SHA-256 hex digest of `content`.
pub fn digest(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    hex::encode(h.finalize())
}

/// `~/.local/state/zoektctl/manifest.json`
pub fn manifest_path_at(home: &Path) -> PathBuf {
    paths::manifest_path(home)
}

/// Load the manifest; `None` when nothing has been applied yet.
pub fn load_at(home: &Path) -> Result<Option<Manifest>, InstallError> {
    let path = manifest_path_at(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save the manifest atomically.
pub fn save_at(home: &Path, manifest: &Manifest) -> Result<(), InstallError> {
    let path = manifest_path_at(home);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid manifest path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(manifest)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Delete the manifest. Missing is fine.
pub fn remove_at(home: &Path) -> Result<(), InstallError> {
    let path = manifest_path_at(home);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(&path, e)),
    }
}
