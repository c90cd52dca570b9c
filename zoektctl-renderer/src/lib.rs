//! zoektctl-renderer: turns a [`zoektctl_core::ServicePlan`] into launchd
//! plists, systemd units, the indexer wrapper and the MCP descriptor.

pub mod context;
pub mod engine;
pub mod error;

pub use context::{shell_quote, systemd_quote, UnitContext, WrapperContext};
pub use engine::{ArtifactKind, Generation, RenderedFile, Renderer, TemplateEngine};
pub use error::RenderError;
