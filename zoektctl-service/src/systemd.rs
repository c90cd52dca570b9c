use zoektctl_core::paths::{INDEXER_UNIT, WEBSERVER_UNIT};
use zoektctl_core::{ServicePlan, UnitKind};

use crate::command::{run_all, Invocation};
use crate::error::ServiceError;

fn systemctl<I, S>(args: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut all = vec!["--user".to_string()];
    all.extend(args.into_iter().map(Into::into));
    Invocation::new("systemctl", all)
}

/// Units to start for `plan`: persistent services directly, periodic
/// services through their timer.
pub fn start_targets(plan: &ServicePlan) -> Vec<String> {
    plan.units()
        .iter()
        .map(|unit| match unit.kind {
            UnitKind::Persistent => unit.id.clone(),
            UnitKind::Periodic { .. } => format!("{}.timer", unit.name),
        })
        .collect()
}

/// `daemon-reload`, then enable and (re)start every target.
pub fn activation(plan: &ServicePlan) -> Vec<Invocation> {
    let mut calls = vec![systemctl(["daemon-reload"])];
    for target in start_targets(plan) {
        calls.push(systemctl(["enable".to_string(), target.clone()]));
        calls.push(systemctl(["restart".to_string(), target]));
    }
    calls
}

/// Stop and disable everything zoektctl manages; units that are already
/// gone are fine.
pub fn deactivation() -> Vec<Invocation> {
    vec![
        systemctl([
            "disable".to_string(),
            "--now".to_string(),
            format!("{INDEXER_UNIT}.timer"),
            format!("{INDEXER_UNIT}.service"),
            format!("{WEBSERVER_UNIT}.service"),
        ])
        .tolerant(),
        systemctl(["daemon-reload"]).tolerant(),
    ]
}

pub fn activate(plan: &ServicePlan) -> Result<(), ServiceError> {
    ensure_linux()?;
    run_all(&activation(plan))?;
    tracing::info!("systemd user units enabled");
    Ok(())
}

pub fn deactivate() -> Result<(), ServiceError> {
    ensure_linux()?;
    run_all(&deactivation())?;
    tracing::info!("systemd user units disabled");
    Ok(())
}

/// `journalctl` arguments that follow both units' output.
pub fn journal_args(lines: usize) -> Vec<String> {
    vec![
        "--user".to_string(),
        "-u".to_string(),
        format!("{WEBSERVER_UNIT}.service"),
        "-u".to_string(),
        format!("{INDEXER_UNIT}.service"),
        "-n".to_string(),
        lines.to_string(),
        "--no-pager".to_string(),
    ]
}

#[cfg(target_os = "linux")]
fn ensure_linux() -> Result<(), ServiceError> {
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn ensure_linux() -> Result<(), ServiceError> {
    Err(ServiceError::Systemctl(
        "systemd management is only supported on Linux".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use zoektctl_core::config::resolve;
    use zoektctl_core::{plan, Config, Platform};

    fn systemd_plan(home: &Path) -> ServicePlan {
        let mut cfg = resolve(Config::default(), home);
        cfg.daemon.enabled = true;
        cfg.daemon.repositories = vec![PathBuf::from("/code/api")];
        plan(&cfg, Platform::Systemd, home).expect("plan")
    }

    #[test]
    fn indexer_is_started_through_its_timer() {
        let plan = systemd_plan(Path::new("/home/tester"));
        assert_eq!(
            start_targets(&plan),
            vec!["zoekt-webserver.service", "zoekt-indexer.timer"]
        );
    }

    #[test]
    fn activation_reloads_before_enabling() {
        let calls = activation(&systemd_plan(Path::new("/home/tester")));
        let lines: Vec<String> = calls.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "systemctl --user daemon-reload",
                "systemctl --user enable zoekt-webserver.service",
                "systemctl --user restart zoekt-webserver.service",
                "systemctl --user enable zoekt-indexer.timer",
                "systemctl --user restart zoekt-indexer.timer",
            ]
        );
    }

    #[test]
    fn deactivation_is_tolerant() {
        let calls = deactivation();
        assert!(calls.iter().all(|c| c.ignore_failure));
        assert!(calls[0].args.contains(&"zoekt-indexer.timer".to_string()));
    }

    #[test]
    fn journal_args_follow_both_units() {
        let args = journal_args(50);
        assert!(args.contains(&"zoekt-webserver.service".to_string()));
        assert!(args.contains(&"zoekt-indexer.service".to_string()));
        assert!(args.contains(&"50".to_string()));
    }
}
