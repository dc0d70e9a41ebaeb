// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel inside application errors)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("invalid app name '{name}': {reason}")]
    InvalidAppName { name: String, reason: String },

    #[error("invalid config key '{key}': {reason}")]
    InvalidConfigKey { key: String, reason: String },

    #[error("invalid value for config key '{key}': {reason}")]
    InvalidConfigValue { key: String, reason: String },

    #[error("invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    // ========================================================================
    // Parse Errors (remote output did not look like we expected)
    // ========================================================================
    #[error("unexpected output from `{command}` at line {line}: {reason}")]
    MalformedOutput {
        command: &'static str,
        line: usize,
        reason: String,
    },

    #[error("`{command}` output has no '{field}' entry")]
    MissingReportField {
        command: &'static str,
        field: &'static str,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidAppName { name, .. } => vec![
                format!("'{}' cannot be used as a Dokku app name", name),
                "Use lowercase letters, digits and '-' only".into(),
                "Start with a letter or digit, e.g. my-app, api2".into(),
            ],
            Self::InvalidConfigKey { key, .. } => vec![
                format!("Rename config key '{}'", key),
                "Keys must look like shell variables: letters, digits and '_'".into(),
                "Keys cannot start with a digit".into(),
            ],
            Self::InvalidConfigValue { key, .. } => vec![
                format!("Check the value of '{}' in your manifest", key),
                "Values cannot span multiple lines; base64-encode them instead".into(),
            ],
            Self::InvalidDomain { domain, .. } => vec![
                format!("Check the domain '{}' in your manifest", domain),
                "Domains cannot contain whitespace or shell characters".into(),
            ],
            Self::MalformedOutput { command, .. } | Self::MissingReportField { command, .. } => {
                vec![
                    format!("The host answered `{}` in an unexpected format", command),
                    "Check that the Dokku version on the host is supported".into(),
                    "Re-run with -vv to see the raw command output".into(),
                ]
            }
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAppName { .. }
            | Self::InvalidConfigKey { .. }
            | Self::InvalidConfigValue { .. }
            | Self::InvalidDomain { .. } => ErrorCategory::Validation,
            Self::MalformedOutput { .. } | Self::MissingReportField { .. } => ErrorCategory::Parse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Parse,
}
