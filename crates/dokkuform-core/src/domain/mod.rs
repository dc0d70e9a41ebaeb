// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for dokkuform.
//!
//! This module contains pure logic with no I/O. Talking to the host is the
//! job of the application layer, through the ports it defines.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No network, filesystem, or process calls
//! - **Few external crates**: std, thiserror, serde and chrono
//! - **Value semantics**: All domain objects are Clone + PartialEq
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod parsers;
pub mod reconciler;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{AppRecord, DokkuApp, DokkuCommand, Plan, PlanAction};
pub use error::{DomainError, ErrorCategory};
pub use reconciler::Reconciler;
pub use value_objects::{AppName, ConfigVars, Domains};

pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;
    use entities::command::{config_assignments, shell_quote};

    // ========================================================================
    // Value Object Tests
    // ========================================================================

    #[test]
    fn app_name_accepts_dokku_names() {
        assert!(AppName::new("web").is_ok());
        assert!(AppName::new("api-2").is_ok());
        assert!(AppName::new("9lives").is_ok());
        assert_eq!(AppName::from_str("web").unwrap().as_str(), "web");
    }

    #[test]
    fn app_name_rejects_bad_names() {
        assert!(AppName::new("").is_err());
        assert!(AppName::new("Web").is_err());
        assert!(AppName::new("-web").is_err());
        assert!(AppName::new("web app").is_err());
        assert!(AppName::new("web;rm").is_err());
        assert!(AppName::new("a".repeat(65)).is_err());
    }

    #[test]
    fn app_name_error_names_the_character() {
        let err = AppName::new("my_app").unwrap_err();
        assert!(err.to_string().contains('_'));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn config_key_validation() {
        assert!(ConfigVars::validate_key("DATABASE_URL").is_ok());
        assert!(ConfigVars::validate_key("_private").is_ok());
        assert!(ConfigVars::validate_key("1BAD").is_err());
        assert!(ConfigVars::validate_key("BAD-KEY").is_err());
        assert!(ConfigVars::validate_key("").is_err());
    }

    #[test]
    fn config_vars_retain_keys() {
        let vars = ConfigVars::new().with("A", "1").with("B", "2").with("C", "3");
        let kept = vars.retain_keys(["A", "C", "MISSING"]);

        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn domain_validation() {
        assert!(Domains::validate_domain("www.example.com").is_ok());
        assert!(Domains::validate_domain("*.example.com").is_ok());
        assert!(Domains::validate_domain("").is_err());
        assert!(Domains::validate_domain("a b").is_err());
        assert!(Domains::validate_domain("a;reboot").is_err());
    }

    // ========================================================================
    // Command Rendering Tests
    // ========================================================================

    #[test]
    fn shell_quote_leaves_plain_words() {
        assert_eq!(shell_quote("web.example.com"), "web.example.com");
        assert_eq!(shell_quote("postgres://u@db:5432/x"), "postgres://u@db:5432/x");
    }

    #[test]
    fn shell_quote_wraps_special_words() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$(reboot)"), "'$(reboot)'");
    }

    #[test]
    fn config_assignments_are_ordered_and_quoted() {
        let vars = ConfigVars::new().with("B", "two words").with("A", "1");
        assert_eq!(config_assignments(&vars), "A=1 B='two words'");
    }

    #[test]
    fn commands_render_to_dokku_lines() {
        let app = AppName::new("web").unwrap();

        assert_eq!(
            DokkuCommand::AppsExists { app: app.clone() }.render(),
            "apps:exists web"
        );
        assert_eq!(
            DokkuCommand::ConfigSet {
                app: app.clone(),
                vars: ConfigVars::new().with("A", "1"),
            }
            .render(),
            "config:set web A=1"
        );
        assert_eq!(
            DokkuCommand::ConfigUnset {
                app: app.clone(),
                keys: vec!["A".into(), "B".into()],
            }
            .render(),
            "config:unset web A B"
        );
        assert_eq!(
            DokkuCommand::DomainsAdd {
                app: app.clone(),
                domains: vec!["a.io".into(), "b.io".into()],
            }
            .to_string(),
            "domains:add web a.io b.io"
        );
        assert_eq!(DokkuCommand::DomainsClear { app }.render(), "domains:clear web");
    }

    #[test]
    fn read_commands_are_not_mutating() {
        let app = AppName::new("web").unwrap();
        assert!(!DokkuCommand::ConfigShow { app: app.clone() }.is_mutating());
        assert!(!DokkuCommand::DomainsReport { app: app.clone() }.is_mutating());
        assert!(DokkuCommand::AppsCreate { app }.is_mutating());
    }

    // ========================================================================
    // Entity Tests
    // ========================================================================

    #[test]
    fn managed_view_hides_platform_vars() {
        let observed = DokkuApp::new(AppName::new("web").unwrap())
            .with_config_var("A", "1")
            .with_config_var("DOKKU_PROXY_PORT", "80");

        let managed = observed.managed_view(["A"]);

        assert_eq!(managed.config_vars.len(), 1);
        assert_eq!(managed.config_vars.get("A"), Some("1"));
        assert_eq!(managed.name, observed.name);
    }

    #[test]
    fn record_captures_managed_keys() {
        let app = DokkuApp::new(AppName::new("web").unwrap())
            .with_config_var("A", "1")
            .with_domain("a.io");
        let record = AppRecord::from_applied(&app, Utc::now());

        assert!(record.manages("A"));
        assert!(!record.manages("B"));
        assert!(record.domains.contains("a.io"));
    }

    #[test]
    fn record_describes_only_the_same_managed_view() {
        let app = DokkuApp::new(AppName::new("web").unwrap())
            .with_config_var("A", "1")
            .with_config_var("B", "2");
        let record = AppRecord::from_applied(&app, Utc::now());

        assert!(record.describes(&app.clone().with_config_var("B", "changed")));
        let fewer = DokkuApp::new(AppName::new("web").unwrap()).with_config_var("A", "1");
        assert!(!record.describes(&fewer));
        assert!(!record.describes(&app.clone().with_domain("a.io")));
    }

    #[test]
    fn plan_without_commands_is_noop() {
        let plan = Plan::new(AppName::new("web").unwrap(), PlanAction::Update, vec![]);
        assert!(plan.is_noop());
        assert_eq!(plan.to_string(), "web (no changes)\n");
    }

    // ========================================================================
    // Validator Tests
    // ========================================================================

    #[test]
    fn validator_rejects_multiline_values() {
        let app = DokkuApp::new(AppName::new("web").unwrap()).with_config_var("CERT", "a\nb");
        assert!(matches!(
            DomainValidator::validate_app(&app),
            Err(DomainError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn validator_rejects_bad_domain() {
        let app = DokkuApp::new(AppName::new("web").unwrap()).with_domain("bad domain");
        assert!(DomainValidator::validate_app(&app).is_err());
    }

    #[test]
    fn validator_accepts_clean_app() {
        let app = DokkuApp::new(AppName::new("web").unwrap())
            .with_config_var("A", "x y")
            .with_domain("a.io");
        assert!(DomainValidator::validate_app(&app).is_ok());
    }
}
