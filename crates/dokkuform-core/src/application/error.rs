//! Application layer errors.
//!
//! These errors represent failures in orchestration and in talking to the
//! host, not in the domain model. Domain errors are `DomainError` from
//! `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Exit status `apps:exists` uses for a missing app.
pub const APP_MISSING_EXIT_STATUS: i32 = 20;

/// Failure reported by a `RemoteCommandClient`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote session could not be opened.
    #[error("could not open remote session: {reason}")]
    Connect { reason: String },

    /// The command ran and exited with a non-zero status.
    #[error("`{command}` exited with status {status}: {}", .stderr.trim())]
    NonZeroExit {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },

    /// The session ended without an exit status (killed by a signal).
    #[error("`{command}` was terminated before it finished")]
    Terminated { command: String },
}

impl RemoteError {
    /// Exit status of the remote command, when it ran to completion.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the host answered that the app does not exist.
    pub fn is_missing_app(&self) -> bool {
        match self {
            Self::NonZeroExit {
                status,
                stdout,
                stderr,
                ..
            } => {
                *status == APP_MISSING_EXIT_STATUS
                    || stderr.contains("does not exist")
                    || stdout.contains("does not exist")
            }
            _ => false,
        }
    }
}

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A remote command failed.
    #[error("Remote command failed: {0}")]
    Remote(#[from] RemoteError),

    /// Applying a plan stopped part-way through.
    #[error("Apply of '{app}' stopped at step {step}/{total} (`{command}`): {source}")]
    ApplyInterrupted {
        app: String,
        command: String,
        step: usize,
        total: usize,
        #[source]
        source: RemoteError,
    },

    /// The app was expected on the host but is not there.
    #[error("App '{name}' does not exist on the host")]
    AppNotFound { name: String },

    /// Reading or writing the local state failed.
    #[error("State store error: {reason}")]
    StateStore { reason: String },

    /// State store access failed (lock poisoned, etc.).
    #[error("State store is locked")]
    StateLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Remote(RemoteError::Connect { .. }) => vec![
                "Check that the host is reachable: ssh dokku@<host> version".into(),
                "Verify host.address, host.port and host.identity_file in your config".into(),
            ],
            Self::Remote(_) => vec![
                "The host rejected a command; see its message above".into(),
                "Re-run with -vv to see every command sent".into(),
            ],
            Self::ApplyInterrupted { step, total, .. } => vec![
                format!("{} of {} commands were applied before the failure", step - 1, total),
                "Fix the cause and run apply again; completed steps are skipped".into(),
            ],
            Self::AppNotFound { name } => vec![
                format!("No app named '{}' exists on the host", name),
                "Run: dokkuform plan to see what would be created".into(),
            ],
            Self::StateStore { .. } => vec![
                "Check paths.state in your config".into(),
                "Ensure the state directory is writable".into(),
            ],
            Self::StateLockError => vec![
                "The state store is locked".into(),
                "Try again in a moment".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Remote(_) | Self::ApplyInterrupted { .. } => ErrorCategory::Remote,
            Self::AppNotFound { .. } => ErrorCategory::NotFound,
            Self::StateStore { .. } | Self::StateLockError => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(status: i32, stderr: &str) -> RemoteError {
        RemoteError::NonZeroExit {
            command: "apps:exists web".into(),
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn missing_app_is_recognised_by_status() {
        assert!(failed(APP_MISSING_EXIT_STATUS, "").is_missing_app());
    }

    #[test]
    fn missing_app_is_recognised_by_message() {
        assert!(failed(1, " !     App web does not exist").is_missing_app());
    }

    #[test]
    fn other_failures_are_not_missing_apps() {
        assert!(!failed(1, " !     Permission denied").is_missing_app());
        let connect = RemoteError::Connect {
            reason: "no route to host".into(),
        };
        assert!(!connect.is_missing_app());
    }
}
