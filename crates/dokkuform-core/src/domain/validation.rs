use crate::domain::{
    entities::DokkuApp,
    error::DomainError,
    value_objects::{ConfigVars, Domains},
};

/// Centralized domain validation.
///
/// Declared state is validated here before anything is sent to the host.
/// Observed state is never validated: it is whatever the host says it is.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_app(app: &DokkuApp) -> Result<(), DomainError> {
        Self::validate_config_vars(&app.config_vars)?;
        Self::validate_domains(&app.domains)
    }

    pub fn validate_config_vars(vars: &ConfigVars) -> Result<(), DomainError> {
        for (key, value) in vars.iter() {
            ConfigVars::validate_key(key)?;
            // `config:show` is line-oriented; a newline would corrupt the read-back.
            if value.contains(['\n', '\r', '\0']) {
                return Err(DomainError::InvalidConfigValue {
                    key: key.to_string(),
                    reason: "value contains a line break or NUL".into(),
                });
            }
            // The host reports values trimmed, so padding would never match.
            if value != value.trim() {
                return Err(DomainError::InvalidConfigValue {
                    key: key.to_string(),
                    reason: "value has leading or trailing whitespace".into(),
                });
            }
        }
        Ok(())
    }

    pub fn validate_domains(domains: &Domains) -> Result<(), DomainError> {
        domains.iter().try_for_each(Domains::validate_domain)
    }
}
