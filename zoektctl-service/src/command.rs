//! Supervisor command invocations, built as data and run in order.

use std::fmt;
use std::process::Command;

use crate::error::{io_err, ServiceError};

/// One supervisor CLI call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub args: Vec<String>,
    /// Failure is expected (e.g. `bootout` of a job that is not loaded).
    pub ignore_failure: bool,
}

impl Invocation {
    pub fn new<I, S>(program: &'static str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program,
            args: args.into_iter().map(Into::into).collect(),
            ignore_failure: false,
        }
    }

    pub fn tolerant(mut self) -> Self {
        self.ignore_failure = true;
        self
    }

    pub fn run(&self) -> Result<(), ServiceError> {
        tracing::debug!("running: {self}");
        let output = Command::new(self.program)
            .args(self.args.iter().map(String::as_str))
            .output()
            .map_err(|e| io_err(self.program, e))?;

        if output.status.success() || self.ignore_failure {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let message = format!(
            "`{self}` failed (status {}): {} {}",
            output.status, stdout, stderr
        );
        Err(match self.program {
            "launchctl" => ServiceError::Launchctl(message),
            _ => ServiceError::Systemctl(message),
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Run every invocation in order, stopping at the first hard failure.
pub fn run_all(invocations: &[Invocation]) -> Result<(), ServiceError> {
    for invocation in invocations {
        invocation.run()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let inv = Invocation::new("systemctl", ["--user", "daemon-reload"]);
        assert_eq!(inv.to_string(), "systemctl --user daemon-reload");
        assert!(!inv.ignore_failure);
        assert!(inv.tolerant().ignore_failure);
    }

    #[test]
    #[cfg(unix)]
    fn failing_command_maps_to_program_error() {
        let err = Invocation::new("false", Vec::<String>::new())
            .run()
            .unwrap_err();
        assert!(matches!(err, ServiceError::Systemctl(_)), "got: {err}");
    }

    #[test]
    #[cfg(unix)]
    fn tolerant_failure_is_ok() {
        Invocation::new("false", Vec::<String>::new())
            .tolerant()
            .run()
            .expect("ignored failure");
    }

    #[test]
    fn missing_program_is_io_error() {
        let err = Invocation::new("zoektctl-no-such-binary", ["x"])
            .run()
            .unwrap_err();
        assert!(matches!(err, ServiceError::Io { .. }));
    }
}
