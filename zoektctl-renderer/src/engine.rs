//! Tera rendering engine: [`ArtifactKind`] and [`Renderer`].
//!
//! # Output mapping
//!
//! | Platform | Unit       | Output path(s)                                              |
//! |----------|------------|-------------------------------------------------------------|
//! | launchd  | webserver  | `~/Library/LaunchAgents/org.zoekt.webserver.plist`          |
//! | launchd  | indexer    | `~/Library/LaunchAgents/org.zoekt.indexer.plist`            |
//! | systemd  | webserver  | `~/.config/systemd/user/zoekt-webserver.service`            |
//! | systemd  | indexer    | `~/.config/systemd/user/zoekt-indexer.{service,timer}`      |
//! | both     | wrapper    | `~/.local/share/zoektctl/bin/zoekt-index-wrapper`           |
//! | both     | descriptor | `mcp.descriptor_path`                                       |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use zoektctl_core::paths;
use zoektctl_core::units::{LogicalUnit, UnitKind, WrapperScript};
use zoektctl_core::{discovery, plan, Config, McpServers, Platform, ServicePlan};

use crate::context::{UnitContext, WrapperContext};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("shared/_header.tera", include_str!("templates/shared/_header.tera")),
    ("shared/wrapper.sh.tera", include_str!("templates/shared/wrapper.sh.tera")),
    ("launchd/agent.plist.tera", include_str!("templates/launchd/agent.plist.tera")),
    ("systemd/service.tera", include_str!("templates/systemd/service.tera")),
    ("systemd/timer.tera", include_str!("templates/systemd/timer.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// Every file kind a generation pass can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    LaunchdAgent,
    SystemdService,
    SystemdTimer,
    Wrapper,
    McpDescriptor,
}

impl ArtifactKind {
    /// Unit-file artifacts for one logical unit on `platform`.
    /// A periodic systemd unit needs a timer next to its service.
    pub fn for_unit(platform: Platform, unit: &LogicalUnit) -> &'static [ArtifactKind] {
        match (platform, &unit.kind) {
            (Platform::Launchd, _) => &[ArtifactKind::LaunchdAgent],
            (Platform::Systemd, UnitKind::Persistent) => &[ArtifactKind::SystemdService],
            (Platform::Systemd, UnitKind::Periodic { .. }) => {
                &[ArtifactKind::SystemdService, ArtifactKind::SystemdTimer]
            }
        }
    }

    /// Embedded template name; `None` for artifacts serialized directly.
    pub fn template_name(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::LaunchdAgent => Some("launchd/agent.plist.tera"),
            ArtifactKind::SystemdService => Some("systemd/service.tera"),
            ArtifactKind::SystemdTimer => Some("systemd/timer.tera"),
            ArtifactKind::Wrapper => Some("shared/wrapper.sh.tera"),
            ArtifactKind::McpDescriptor => None,
        }
    }

    /// Official output path of this artifact for `unit`.
    pub fn unit_output_path(&self, unit: &LogicalUnit, home: &Path) -> Option<PathBuf> {
        match self {
            ArtifactKind::LaunchdAgent => Some(paths::launchd_plist_path(home, &unit.id)),
            ArtifactKind::SystemdService => {
                Some(paths::systemd_unit_path(home, &unit.name.0, "service"))
            }
            ArtifactKind::SystemdTimer => Some(paths::systemd_unit_path(home, &unit.name.0, "timer")),
            ArtifactKind::Wrapper | ArtifactKind::McpDescriptor => None,
        }
    }
}

/// One generated file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub content: String,
    /// Install with mode 0755.
    pub executable: bool,
}

/// Output of one generation pass.
#[derive(Debug, Clone)]
pub struct Generation {
    pub platform: Platform,
    /// `None` when the service gate is closed.
    pub plan: Option<ServicePlan>,
    pub descriptor: Option<McpServers>,
    pub files: Vec<RenderedFile>,
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded defaults
/// by relative name (e.g. `systemd/service.tera`).
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render every unit file for `unit`.
    pub fn render_unit(
        &self,
        unit: &LogicalUnit,
        platform: Platform,
        home: &Path,
    ) -> Result<Vec<RenderedFile>, RenderError> {
        let tera_ctx = UnitContext::new(unit, platform).to_tera_context()?;
        let mut results = Vec::new();
        for kind in ArtifactKind::for_unit(platform, unit) {
            let (Some(name), Some(path)) = (kind.template_name(), kind.unit_output_path(unit, home))
            else {
                continue;
            };
            let content = self.tera.render(name, &tera_ctx)?;
            results.push(RenderedFile {
                kind: *kind,
                path,
                content,
                executable: false,
            });
        }
        Ok(results)
    }

    pub fn render_wrapper(
        &self,
        wrapper: &WrapperScript,
        platform: Platform,
    ) -> Result<RenderedFile, RenderError> {
        let tera_ctx = WrapperContext::new(wrapper, platform)?.to_tera_context()?;
        let content = self.tera.render("shared/wrapper.sh.tera", &tera_ctx)?;
        Ok(RenderedFile {
            kind: ArtifactKind::Wrapper,
            path: wrapper.path.clone(),
            content,
            executable: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders whole generation passes. Create once and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer {
            engine: TemplateEngine::new(None)?,
        })
    }

    /// Embedded templates plus overrides from `~/.config/zoektctl/templates/`.
    pub fn with_user_templates(home: &Path) -> Result<Self, RenderError> {
        let dir = paths::templates_dir(home);
        Ok(Renderer {
            engine: TemplateEngine::new(Some(&dir))?,
        })
    }

    /// Wrapper script plus both units' files, in that order.
    pub fn render_plan(
        &self,
        plan: &ServicePlan,
        home: &Path,
    ) -> Result<Vec<RenderedFile>, RenderError> {
        let mut files = vec![self.engine.render_wrapper(&plan.wrapper, plan.platform)?];
        for unit in plan.units() {
            files.extend(self.engine.render_unit(unit, plan.platform, home)?);
        }
        Ok(files)
    }

    /// Pretty JSON descriptor at `path`.
    pub fn render_descriptor(
        &self,
        descriptor: &McpServers,
        path: &Path,
    ) -> Result<RenderedFile, RenderError> {
        let mut content = serde_json::to_string_pretty(descriptor)?;
        content.push('\n');
        Ok(RenderedFile {
            kind: ArtifactKind::McpDescriptor,
            path: path.to_path_buf(),
            content,
            executable: false,
        })
    }

    /// One full generation pass for a validated `config`.
    ///
    /// Service files and the descriptor are gated independently.
    pub fn render_config(
        &self,
        config: &Config,
        platform: Platform,
        home: &Path,
    ) -> Result<Generation, RenderError> {
        let plan = plan(config, platform, home);
        let descriptor = discovery::descriptor(config);

        let mut files = Vec::new();
        if let Some(plan) = &plan {
            files.extend(self.render_plan(plan, home)?);
        }
        if let Some(descriptor) = &descriptor {
            files.push(self.render_descriptor(descriptor, &config.mcp.descriptor_path)?);
        }

        Ok(Generation {
            platform,
            plan,
            descriptor,
            files,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
