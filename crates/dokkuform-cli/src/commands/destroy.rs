//! `dokkuform destroy`: remove an app from the host and forget its record.

use tracing::{info, instrument};

use dokkuform_adapters::Manifest;
use dokkuform_core::{application::StateService, domain::AppName};

use crate::{
    cli::DestroyArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `dokkuform destroy` command.
#[instrument(skip_all, fields(id = %args.id))]
pub fn execute(args: DestroyArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // A missing manifest is fine here: the app may only be in the state.
    let manifest = config
        .paths
        .manifest
        .exists()
        .then(|| super::load_manifest(&config))
        .transpose()?;
    let state = super::state_service(&config);
    let name = resolve(&args.id, &state, manifest.as_ref())?;

    let apps = super::app_service(&config)?;
    let plan = apps.plan_destroy(&name)?;

    if plan.is_noop() {
        state.forget(&args.id)?;
        output.info(&format!("{name} does not exist on the host"))?;
        return Ok(());
    }

    if !output.is_json() {
        output.plan(&args.id, &plan)?;
    }
    if !args.yes {
        let prompt = format!("Destroy {name} on {}?", super::host_label(&config));
        if !output.confirm(&prompt)? {
            return Err(CliError::Cancelled);
        }
    }

    apps.execute(&plan, |_, _| {})?;
    state.forget(&args.id)?;
    info!(app = %name, "App destroyed");

    if output.is_json() {
        return output.json(&serde_json::json!({
            "id": args.id,
            "app": name.as_str(),
            "action": plan.action().as_str(),
        }));
    }
    output.success(&format!("{name} destroyed"))?;
    Ok(())
}

/// Resolve `id` to an app name: recorded name first, then the manifest,
/// then `id` itself as a name.
fn resolve(id: &str, state: &StateService, manifest: Option<&Manifest>) -> CliResult<AppName> {
    if let Some(record) = state.get(id)? {
        return Ok(record.name);
    }
    if let Some(entry) = manifest.and_then(|m| m.get(id)) {
        return Ok(entry.app.name.clone());
    }
    AppName::new(id).map_err(|_| CliError::UnknownApp { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    use dokkuform_adapters::{InMemoryDokku, InMemoryStateStore};
    use dokkuform_core::{application::AppService, domain::DokkuApp};

    #[test]
    fn resolve_prefers_the_recorded_name() {
        let host = InMemoryDokku::new();
        let apps = AppService::new(Box::new(host));
        let state = StateService::new(Box::new(InMemoryStateStore::new()));

        let outcome = apps
            .apply(&DokkuApp::new(AppName::new("web-v2").unwrap()), None)
            .unwrap();
        state.record("web", &outcome).unwrap();

        let manifest = Manifest::parse("[apps.web]\nname = \"web-v3\"\n").unwrap();
        let name = resolve("web", &state, Some(&manifest)).unwrap();
        assert_eq!(name.as_str(), "web-v2");
    }

    #[test]
    fn resolve_falls_back_to_manifest_then_raw_name() {
        let state = StateService::new(Box::new(InMemoryStateStore::new()));
        let manifest = Manifest::parse("[apps.site]\nname = \"site-prod\"\n").unwrap();

        assert_eq!(
            resolve("site", &state, Some(&manifest)).unwrap().as_str(),
            "site-prod"
        );
        assert_eq!(resolve("other", &state, None).unwrap().as_str(), "other");
    }

    #[test]
    fn resolve_rejects_invalid_names() {
        let state = StateService::new(Box::new(InMemoryStateStore::new()));
        let err = resolve("Not Valid", &state, None).unwrap_err();
        assert!(matches!(err, CliError::UnknownApp { .. }));
    }
}
