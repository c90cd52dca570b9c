//! Error types for zoektctl-install.

use std::path::PathBuf;

use thiserror::Error;

use zoektctl_renderer::RenderError;

/// All errors that can arise while installing generated files.
#[derive(Debug, Error)]
pub enum InstallError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A required directory could not be created; nothing was installed.
    #[error("cannot create directory {path}: {source}")]
    Bootstrap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing `mcpServers` document zoektctl cannot merge into.
    #[error("cannot merge MCP descriptor into {path}: {reason}")]
    SharedDocument { path: PathBuf, reason: String },

    /// JSON serialization/deserialization error (manifest).
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`InstallError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InstallError {
    InstallError::Io {
        path: path.into(),
        source,
    }
}
