//! launchd log files written through `StandardOutPath` / `StandardErrorPath`.
//!
//! systemd units log to the journal instead; see [`crate::systemd::journal_args`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zoektctl_core::paths::{self, INDEXER_UNIT, WEBSERVER_UNIT};

use crate::error::{io_err, ServiceError};

/// Log files for both units, server first.
pub fn log_files(home: &Path, stderr_only: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for unit in [WEBSERVER_UNIT, INDEXER_UNIT] {
        if !stderr_only {
            files.push(paths::launchd_stdout_log(home, unit));
        }
        files.push(paths::launchd_stderr_log(home, unit));
    }
    files
}

/// Last `lines` lines of `path`; an absent file has no lines.
///
/// Invalid UTF-8 (non-UTF-8 repository file names) is replaced, not fatal.
pub fn tail(path: &Path, lines: usize) -> Result<Vec<String>, ServiceError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_err(path, err)),
    };
    let content = String::from_utf8_lossy(&bytes);
    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines);
    Ok(all[start..].iter().map(|l| l.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stderr_only_skips_stdout_logs() {
        let home = Path::new("/Users/tester");
        let files = log_files(home, true);
        assert_eq!(
            files,
            vec![
                home.join("Library/Logs/zoekt-webserver.err.log"),
                home.join("Library/Logs/zoekt-indexer.err.log"),
            ]
        );
        assert_eq!(log_files(home, false).len(), 4);
    }

    #[test]
    fn tail_returns_last_lines() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("zoekt-indexer.log");
        fs::write(&log, "one\ntwo\nthree\nfour\n").unwrap();
        assert_eq!(tail(&log, 2).unwrap(), vec!["three", "four"]);
        assert_eq!(tail(&log, 10).unwrap().len(), 4);
    }

    #[test]
    fn tail_survives_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("zoekt-indexer.err.log");
        fs::write(&log, b"indexing /code/\xff\xfe bad\ndone\n").unwrap();

        let lines = tail(&log, 5).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("indexing /code/"));
        assert!(lines[0].contains('\u{FFFD}'));
        assert_eq!(lines[1], "done");
    }

    #[test]
    fn tail_of_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(tail(&tmp.path().join("nope.log"), 5).unwrap().is_empty());
    }
}
