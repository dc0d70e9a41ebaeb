//! Recover structured state from Dokku's human-oriented command output.
//!
//! Dokku has no machine-readable mode for the reports we rely on, so these
//! parsers are deliberately narrow: they accept the shapes Dokku prints and
//! reject anything else with a [`DomainError`] pointing at the line.

use crate::domain::{
    error::DomainError,
    value_objects::{ConfigVars, Domains},
};

/// Prefix Dokku puts in front of section headers.
pub const HEADER_PREFIX: &str = "=====>";

/// Key of the `domains:report` line listing the app's own vhosts.
pub const APP_VHOSTS_FIELD: &str = "Domains app vhosts";

const CONFIG_SHOW: &str = "config:show";
const DOMAINS_REPORT: &str = "domains:report";

/// Parse the output of `config:show <app>`.
///
/// ```text
/// =====> web env vars
/// DATABASE_URL:  postgres://u:p@db:5432/web
/// DOKKU_PROXY_PORT: 80
/// ```
///
/// Values are split at the first `:` only and trimmed.
pub fn parse_config_show(output: &str) -> Result<ConfigVars, DomainError> {
    let mut lines = output.lines().enumerate().skip_while(|(_, l)| l.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Ok(ConfigVars::new());
    };
    let header = header.trim();
    if !header.starts_with(HEADER_PREFIX) {
        // Older hosts answer an app without variables with a notice instead
        // of a header.
        if header.contains("no config vars") {
            return Ok(ConfigVars::new());
        }
        return Err(DomainError::MalformedOutput {
            command: CONFIG_SHOW,
            line: 1,
            reason: format!("expected a '{HEADER_PREFIX}' header, got '{header}'"),
        });
    }

    let mut vars = ConfigVars::new();
    for (idx, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(DomainError::MalformedOutput {
                command: CONFIG_SHOW,
                line: idx + 1,
                reason: format!("expected 'KEY: value', got '{line}'"),
            });
        };
        vars.insert(key.trim(), value.trim());
    }

    Ok(vars)
}

/// Parse the output of `domains:report <app>` into the app's vhosts.
///
/// ```text
/// =====> web domains information
///        Domains app enabled:           true
///        Domains app vhosts:            web.example.com www.example.com
///        Domains global enabled:        true
/// ```
pub fn parse_domains_report(output: &str) -> Result<Domains, DomainError> {
    for line in output.lines().skip(1) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim() == APP_VHOSTS_FIELD {
            return Ok(value.split_whitespace().collect());
        }
    }

    Err(DomainError::MissingReportField {
        command: DOMAINS_REPORT,
        field: APP_VHOSTS_FIELD,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_show_parses_pairs() {
        let output = "=====> web env vars\nDATABASE_URL:  postgres://u:p@db:5432/web\nDOKKU_PROXY_PORT: 80\n";
        let vars = parse_config_show(output).unwrap();

        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("DATABASE_URL"), Some("postgres://u:p@db:5432/web"));
        assert_eq!(vars.get("DOKKU_PROXY_PORT"), Some("80"));
    }

    #[test]
    fn config_show_keeps_colons_in_values() {
        let vars = parse_config_show("=====> web env vars\nURL: http://a:b@c:1/x\n").unwrap();
        assert_eq!(vars.get("URL"), Some("http://a:b@c:1/x"));
    }

    #[test]
    fn config_show_empty_outputs() {
        assert!(parse_config_show("").unwrap().is_empty());
        assert!(parse_config_show("=====> web env vars\n").unwrap().is_empty());
        assert!(parse_config_show(" !     web has no config vars\n").unwrap().is_empty());
    }

    #[test]
    fn config_show_allows_empty_value() {
        let vars = parse_config_show("=====> web env vars\nEMPTY:\n").unwrap();
        assert_eq!(vars.get("EMPTY"), Some(""));
    }

    #[test]
    fn config_show_rejects_bad_header() {
        let err = parse_config_show("KEY: value\n").unwrap_err();
        assert!(matches!(err, DomainError::MalformedOutput { line: 1, .. }));
    }

    #[test]
    fn config_show_rejects_line_without_separator() {
        let err = parse_config_show("=====> web env vars\nA: 1\ngarbage\n").unwrap_err();
        assert!(matches!(err, DomainError::MalformedOutput { line: 3, .. }));
    }

    #[test]
    fn domains_report_lists_vhosts() {
        let output = "=====> web domains information\n       Domains app enabled:           true\n       Domains app vhosts:            web.example.com www.example.com\n       Domains global enabled:        true\n       Domains global vhosts:         example.com\n";
        let domains = parse_domains_report(output).unwrap();

        assert_eq!(
            domains.iter().collect::<Vec<_>>(),
            vec!["web.example.com", "www.example.com"]
        );
    }

    #[test]
    fn domains_report_empty_vhosts() {
        let output = "=====> web domains information\n       Domains app vhosts:            \n";
        assert!(parse_domains_report(output).unwrap().is_empty());
    }

    #[test]
    fn domains_report_missing_field_is_error() {
        let output = "=====> web domains information\n       Domains app enabled: true\n";
        assert!(matches!(
            parse_domains_report(output),
            Err(DomainError::MissingReportField { .. })
        ));
    }

    #[test]
    fn domains_report_ignores_header_line() {
        // A header that happens to contain the field name must not match.
        let output = "Domains app vhosts: bogus\n";
        assert!(parse_domains_report(output).is_err());
    }
}
