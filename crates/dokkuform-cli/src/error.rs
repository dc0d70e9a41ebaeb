//! Errors reported by the `dokkuform` binary.
//!
//! Every failure ends up as a [`CliError`], which knows its exit code, the
//! hints to print under it, and how to render itself for a terminal or a
//! pipe.

use std::error::Error as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use dokkuform_core::error::{DokkuformError, ErrorCategory as CoreCategory};

pub type CliResult<T> = Result<T, CliError>;

/// Boxed cause attached to configuration failures.
type Cause = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CliError {
    /// An argument was well-formed for clap but meaningless here.
    #[error("Invalid argument: {message}")]
    InvalidInput { message: String },

    /// `--app` or `destroy` named something the manifest and state do not know.
    #[error("No app '{id}' in the manifest or the state")]
    UnknownApp { id: String },

    /// `show` asked for an app the host does not have.
    #[error("App '{name}' does not exist on the host")]
    AppNotFound { name: String },

    #[error("No Dokku host configured")]
    NoHost,

    /// Reading, parsing or looking up configuration failed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Anything raised by the core services or the adapters.
    #[error(transparent)]
    Core(#[from] DokkuformError),

    /// Local file or terminal I/O failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The user answered no at a confirmation prompt.
    #[error("Aborted at the confirmation prompt")]
    Cancelled,

    /// A destructive command needs confirmation but there is no terminal.
    #[error("Confirmation required but stdin is not a terminal")]
    ConfirmationRequired,
}

impl From<std::io::Error> for CliError {
    fn from(source: std::io::Error) -> Self {
        Self::IoError {
            message: source.to_string(),
            source,
        }
    }
}

/// How a failure is classified for exit codes and log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad arguments, bad manifest content, declined prompts.
    UserError,
    NotFound,
    Configuration,
    /// The host or the connection to it failed.
    Remote,
    Internal,
}

impl ErrorCategory {
    /// Process exit status for this category.
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::UserError => 2,
            Self::NotFound => 3,
            Self::Configuration => 4,
            Self::Remote | Self::Internal => 1,
        }
    }
}

impl From<CoreCategory> for ErrorCategory {
    fn from(category: CoreCategory) -> Self {
        match category {
            CoreCategory::Validation => Self::UserError,
            CoreCategory::NotFound => Self::NotFound,
            CoreCategory::Remote => Self::Remote,
            CoreCategory::Configuration => Self::Configuration,
            CoreCategory::Internal => Self::Internal,
        }
    }
}

impl CliError {
    /// Hints printed under the error message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Fix the argument: {message}"),
                "Run the subcommand with --help for its usage".into(),
            ],
            Self::UnknownApp { id } => vec![
                format!("'{id}' is neither a manifest entry nor a recorded app"),
                "Run: dokkuform plan to list the declared apps".into(),
            ],
            Self::AppNotFound { name } => vec![
                format!("The host has no app named '{name}'"),
                "Check the name with: ssh dokku@<host> apps:list".into(),
            ],
            Self::NoHost => vec![
                "Pass --host <HOST>".into(),
                "Or set host.address in your config file".into(),
                "Or export DOKKUFORM__HOST__ADDRESS=<HOST>".into(),
            ],
            Self::ConfigError { .. } => vec![
                "Show the file in use with: dokkuform config path".into(),
                "Write a fresh one with: dokkuform init --force".into(),
            ],
            Self::Core(core) => core.suggestions(),
            Self::IoError { .. } => vec!["Check that the path exists and is writable".into()],
            Self::Cancelled => vec!["Nothing was sent to the host".into()],
            Self::ConfirmationRequired => {
                vec!["Pass --yes to confirm non-interactively".into()]
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::Cancelled | Self::ConfirmationRequired => {
                ErrorCategory::UserError
            }
            Self::UnknownApp { .. } | Self::AppNotFound { .. } => ErrorCategory::NotFound,
            Self::NoHost | Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => core.category().into(),
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Remote        |  1   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }

    /// Causes below the top-level message, outermost first.
    fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut next = self.source();
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        causes
    }

    /// Render for stderr. `color` adds ANSI styling; `verbose` adds the
    /// cause chain instead of the hint to rerun with `-v`.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: fn(&str) -> String| {
            if color { style(text) } else { text.to_owned() }
        };

        let mut out = format!(
            "\n{} {}\n",
            paint("\u{2717} Error:", |t| t.red().bold().to_string()),
            paint(&self.to_string(), |t| t.red().to_string()),
        );

        if verbose {
            for cause in self.causes() {
                out.push_str(&format!(
                    "  {}\n",
                    paint(&format!("caused by: {cause}"), |t| t.dimmed().to_string())
                ));
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                paint("Suggestions:", |t| t.yellow().bold().to_string())
            ));
            for suggestion in &suggestions {
                out.push_str(&format!("  - {suggestion}\n"));
            }
        }

        if !verbose {
            out.push_str(&format!(
                "\n{}\n",
                paint("Re-run with -v for details.", |t| t.dimmed().to_string())
            ));
        }
        out
    }

    /// Emit a tracing event at a level matching the category.
    pub fn log(&self) {
        let category = self.category();
        match category {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(?category, "{self}")
            }
            _ => tracing::error!(?category, "{self}"),
        }
        for cause in self.causes() {
            tracing::debug!(%cause, "caused by");
        }
    }
}

/// Attach a message to a failed I/O call.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, message: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for std::io::Result<T> {
    fn with_cli_context<F, S>(self, message: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| CliError::IoError {
            message: message().into(),
            source,
        })
    }
}
