//! # zoektctl-install
//!
//! Hash-gated atomic installation of generated files.
//!
//! Call [`apply`] to bootstrap directories, write every rendered file and
//! prune files the previous apply left behind; [`uninstall`] removes
//! everything the manifest records.

pub mod bootstrap;
pub mod descriptor;
pub mod diff;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod status;
pub mod writer;

pub use error::InstallError;
pub use manifest::Manifest;
pub use pipeline::{apply, uninstall, ApplyReport};
pub use status::{FileState, FileStatus};
pub use writer::WriteResult;
