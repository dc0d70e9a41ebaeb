//! `dokkuform show`: print an app as the host reports it.

use tracing::instrument;

use dokkuform_core::domain::{AppName, DokkuApp};

use crate::{
    cli::ShowArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `dokkuform show` command.
#[instrument(skip_all, fields(app = %args.name))]
pub fn execute(args: ShowArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let name = AppName::new(&args.name).map_err(|e| CliError::InvalidInput {
        message: e.to_string(),
    })?;

    let apps = super::app_service(&config)?;
    let app = apps
        .retrieve(&name)?
        .ok_or_else(|| CliError::AppNotFound {
            name: name.to_string(),
        })?;

    if output.is_json() {
        return output.json(&app);
    }
    for line in describe(&app) {
        output.print(&line)?;
    }
    Ok(())
}

/// Human-readable lines for one app.
fn describe(app: &DokkuApp) -> Vec<String> {
    let mut lines = vec![
        format!("app:     {}", app.name),
        format!("locked:  {}", if app.locked { "yes" } else { "no" }),
    ];

    if app.domains.is_empty() {
        lines.push("domains: (none)".into());
    } else {
        lines.push("domains:".into());
        lines.extend(app.domains.iter().map(|d| format!("  {d}")));
    }

    if app.config_vars.is_empty() {
        lines.push("config:  (none)".into());
    } else {
        lines.push("config:".into());
        lines.extend(app.config_vars.iter().map(|(k, v)| format!("  {k}={v}")));
    }
    lines
}
