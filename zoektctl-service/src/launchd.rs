use std::path::Path;
use std::process::Command;

use zoektctl_core::paths::{self, INDEXER_LABEL, WEBSERVER_LABEL};
use zoektctl_core::{ServicePlan, UnitKind};

use crate::command::{run_all, Invocation};
use crate::error::{io_err, ServiceError};

/// Labels zoektctl manages, server first.
pub const LABELS: [&str; 2] = [WEBSERVER_LABEL, INDEXER_LABEL];

/// Reload every agent in `plan` from its installed plist.
///
/// Each job is booted out first so changed plists take effect; the persistent
/// server is then kickstarted so it restarts with the new arguments.
pub fn activation(plan: &ServicePlan, domain: &str, home: &Path) -> Vec<Invocation> {
    let mut calls = Vec::new();
    for unit in plan.units() {
        let service = format!("{domain}/{}", unit.id);
        let plist = paths::launchd_plist_path(home, &unit.id);
        calls.push(
            Invocation::new("launchctl", ["bootout".to_string(), service.clone()]).tolerant(),
        );
        calls.push(Invocation::new(
            "launchctl",
            [
                "bootstrap".to_string(),
                domain.to_string(),
                plist.display().to_string(),
            ],
        ));
        if matches!(unit.kind, UnitKind::Persistent) {
            calls.push(Invocation::new(
                "launchctl",
                ["kickstart".to_string(), "-k".to_string(), service],
            ));
        }
    }
    calls
}

/// Boot out every managed label; jobs that are not loaded are fine.
pub fn deactivation(domain: &str) -> Vec<Invocation> {
    LABELS
        .iter()
        .map(|label| {
            Invocation::new("launchctl", ["bootout".to_string(), format!("{domain}/{label}")])
                .tolerant()
        })
        .collect()
}

pub fn activate(plan: &ServicePlan, home: &Path) -> Result<(), ServiceError> {
    ensure_macos()?;
    let domain = launchctl_domain()?;
    run_all(&activation(plan, &domain, home))?;
    tracing::info!("launchd agents loaded in {domain}");
    Ok(())
}

pub fn deactivate() -> Result<(), ServiceError> {
    ensure_macos()?;
    let domain = launchctl_domain()?;
    run_all(&deactivation(&domain))?;
    tracing::info!("launchd agents booted out of {domain}");
    Ok(())
}

#[cfg(target_os = "macos")]
fn ensure_macos() -> Result<(), ServiceError> {
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn ensure_macos() -> Result<(), ServiceError> {
    Err(ServiceError::Launchctl(
        "launchd management is only supported on macOS".to_string(),
    ))
}

fn launchctl_domain() -> Result<String, ServiceError> {
    let output = Command::new("id")
        .arg("-u")
        .output()
        .map_err(|e| io_err("id -u", e))?;
    if !output.status.success() {
        return Err(ServiceError::Launchctl(format!(
            "failed to resolve current uid (status {})",
            output.status
        )));
    }

    let uid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if uid.is_empty() {
        return Err(ServiceError::Launchctl(
            "current uid from `id -u` was empty".to_string(),
        ));
    }
    Ok(format!("gui/{uid}"))
}
