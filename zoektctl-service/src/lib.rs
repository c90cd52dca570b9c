//! Supervisor activation for generated units: `launchctl` on macOS,
//! `systemctl --user` on Linux.

pub mod command;
mod error;
pub mod launchd;
pub mod logs;
pub mod systemd;

use std::path::Path;

use zoektctl_core::{Platform, ServicePlan};

pub use command::Invocation;
pub use error::ServiceError;

/// Load or reload every unit in `plan` with its platform's supervisor.
pub fn activate(plan: &ServicePlan, home: &Path) -> Result<(), ServiceError> {
    match plan.platform {
        Platform::Launchd => launchd::activate(plan, home),
        Platform::Systemd => systemd::activate(plan),
    }
}

/// Stop and unload every unit zoektctl manages on `platform`.
pub fn deactivate(platform: Platform) -> Result<(), ServiceError> {
    match platform {
        Platform::Launchd => launchd::deactivate(),
        Platform::Systemd => systemd::deactivate(),
    }
}

/// Supervisor calls `activate` would run, for `--dry-run` output.
pub fn planned_activation(plan: &ServicePlan, home: &Path) -> Vec<Invocation> {
    match plan.platform {
        Platform::Launchd => launchd::activation(plan, "gui/<uid>", home),
        Platform::Systemd => systemd::activation(plan),
    }
}
