use std::path::PathBuf;

use thiserror::Error;

/// Error surface for supervisor activation and log access.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("launchd error: {0}")]
    Launchctl(String),

    #[error("systemd error: {0}")]
    Systemctl(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ServiceError {
    ServiceError::Io {
        path: path.into(),
        source,
    }
}
