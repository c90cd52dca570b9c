//! Atomic writer for generated files.
//!
//! ## `atomic_write` protocol
//!
//! 1. Normalise line endings and SHA-256 hash the rendered content.
//! 2. Hash the file currently on disk → skip if identical.
//! 3. Write to `<path>.zoektctl.tmp` and set its mode (0755 / 0644).
//! 4. Rename to final path (atomic on POSIX).
//! 5. Update the manifest entry (caller saves the manifest).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use zoektctl_renderer::RenderedFile;

use crate::error::{io_err, InstallError};
use crate::manifest::{self, FileHashes};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; on-disk content already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
    /// File from a previous apply that is no longer generated was deleted.
    Removed { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been deleted.
    WouldRemove { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path }
            | WriteResult::Removed { path }
            | WriteResult::WouldRemove { path } => path,
        }
    }

    /// True for anything other than [`WriteResult::Unchanged`].
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Atomically install one rendered file and record its hash.
pub fn atomic_write(
    file: &RenderedFile,
    hashes: &mut FileHashes,
    dry_run: bool,
) -> Result<WriteResult, InstallError> {
    let tmp = PathBuf::from(format!("{}.zoektctl.tmp", file.path.display()));
    atomic_write_with_tmp(file, hashes, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    file: &RenderedFile,
    hashes: &mut FileHashes,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, InstallError> {
    let path = file.path.as_path();
    let normalized = file.content.replace("\r\n", "\n");
    let digest = manifest::digest(&normalized);
    let key = manifest::key(path);

    if existing_digest(path)?.as_deref() == Some(digest.as_str())
        && mode_matches(path, file.executable)
    {
        tracing::debug!("unchanged: {}", path.display());
        hashes.insert(key, digest);
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, &normalized).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = set_mode(tmp, file.executable) {
        let _ = std::fs::remove_file(tmp);
        return Err(e);
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    hashes.insert(key, digest);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Delete a previously installed file and drop it from the manifest.
pub fn remove(
    path: &Path,
    hashes: &mut FileHashes,
    dry_run: bool,
) -> Result<WriteResult, InstallError> {
    if dry_run {
        tracing::info!("[dry-run] would remove: {}", path.display());
        return Ok(WriteResult::WouldRemove {
            path: path.to_path_buf(),
        });
    }

    match std::fs::remove_file(path) {
        Ok(()) => tracing::info!("removed: {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("already gone: {}", path.display())
        }
        Err(e) => return Err(io_err(path, e)),
    }
    hashes.remove(&manifest::key(path));
    Ok(WriteResult::Removed {
        path: path.to_path_buf(),
    })
}

/// Digest of the file at `path`, or `None` when it does not exist.
pub fn existing_digest(path: &Path) -> Result<Option<String>, InstallError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(manifest::digest(&content.replace("\r\n", "\n")))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

#[cfg(unix)]
fn file_mode(executable: bool) -> u32 {
    if executable {
        0o755
    } else {
        0o644
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, executable: bool) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(file_mode(executable));
    std::fs::set_permissions(path, perms).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _executable: bool) -> Result<(), InstallError> {
    Ok(())
}

#[cfg(unix)]
fn mode_matches(path: &Path, executable: bool) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777 == file_mode(executable))
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn mode_matches(_path: &Path, _executable: bool) -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
