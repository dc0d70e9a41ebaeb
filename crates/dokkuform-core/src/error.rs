//! The error type returned across the core's public API.
//!
//! Domain and application failures pass through unchanged so their own
//! messages reach the user; the two extra variants cover setup problems
//! found by adapters and broken invariants.

use thiserror::Error;

use crate::application::{ApplicationError, RemoteError};
use crate::domain::{self, DomainError};

#[derive(Debug, Error, Clone)]
pub enum DokkuformError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The manifest, a config file or a path could not be used.
    #[error("{message}")]
    Configuration { message: String },

    /// Something dokkuform itself got wrong.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<RemoteError> for DokkuformError {
    fn from(err: RemoteError) -> Self {
        ApplicationError::Remote(err).into()
    }
}

impl DokkuformError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { .. } => vec![
                "Check the manifest path and its TOML syntax".into(),
                "Paths can be changed under [paths] in the config file".into(),
            ],
            Self::Internal { .. } => vec![
                "Nothing on the host was changed by this failure".into(),
                "Re-run with -vv and include the log when reporting it".into(),
            ],
        }
    }

    /// Coarse classification; the binary maps it to an exit code.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                domain::ErrorCategory::Validation => ErrorCategory::Validation,
                // Unparseable output means the host answered unexpectedly.
                domain::ErrorCategory::Parse => ErrorCategory::Remote,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Remote,
    Configuration,
    Internal,
}

pub type DokkuformResult<T> = Result<T, DokkuformError>;

/// Turns a foreign error into [`DokkuformError::Internal`] with a prefix.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> DokkuformResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> DokkuformResult<T> {
        self.map_err(|e| DokkuformError::Internal {
            message: format!("{}: {e}", msg.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_are_wrapped_as_application() {
        let err: DokkuformError = RemoteError::Connect {
            reason: "timed out".into(),
        }
        .into();
        assert!(matches!(
            err,
            DokkuformError::Application(ApplicationError::Remote(_))
        ));
        assert_eq!(err.category(), ErrorCategory::Remote);
    }

    #[test]
    fn wrapped_errors_keep_their_message() {
        let inner = ApplicationError::AppNotFound { name: "web".into() };
        let outer = DokkuformError::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
        assert_eq!(outer.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn context_prefixes_the_cause() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));
        let err = res.context("writing state").unwrap_err();
        assert_eq!(err.to_string(), "internal error: writing state: disk full");
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
