//! `dokkuform plan`: show what `apply` would run.
//!
//! The planning pass is shared with `apply`, which shows the same plans
//! before asking for confirmation.

use serde::Serialize;
use tracing::{info, instrument};

use dokkuform_adapters::Manifest;
use dokkuform_core::{
    application::{AppService, StateService},
    domain::{AppRecord, DokkuApp, Plan},
};

use crate::{
    cli::PlanArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// One planned change, keyed by resource id.
#[derive(Debug)]
pub struct Change {
    pub id: String,
    /// `None` for a recorded app that left the manifest.
    pub desired: Option<DokkuApp>,
    /// The record for `id`, if one exists.
    pub prior: Option<AppRecord>,
    pub plan: Plan,
}

/// JSON view of a [`Change`].
#[derive(Debug, Serialize)]
pub struct ChangeView<'a> {
    pub id: &'a str,
    pub app: &'a str,
    pub action: &'static str,
    pub commands: Vec<String>,
}

impl Change {
    pub fn view(&self) -> ChangeView<'_> {
        ChangeView {
            id: &self.id,
            app: self.plan.app().as_str(),
            action: self.plan.action().as_str(),
            commands: self.plan.commands().iter().map(|c| c.render()).collect(),
        }
    }
}

/// Execute the `dokkuform plan` command.
#[instrument(skip_all)]
pub fn execute(args: PlanArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let manifest = super::load_manifest(&config)?;
    let apps = super::app_service(&config)?;
    let state = super::state_service(&config);

    let changes = compute(&apps, &state, &manifest, args.app.as_deref(), args.prune)?;
    render(&changes, &output)?;

    let pending = changes.iter().filter(|c| !c.plan.is_noop()).count();
    info!(changes = pending, "Plan finished");

    if output.is_json() {
        return Ok(());
    }
    if pending == 0 {
        output.success("No changes. The host matches the manifest.")?;
    } else {
        output.info(&format!(
            "{pending} app(s) to change. Run 'dokkuform apply' to converge."
        ))?;
    }
    Ok(())
}

/// Plan every selected manifest entry, plus orphaned records when pruning.
pub fn compute(
    apps: &AppService,
    state: &StateService,
    manifest: &Manifest,
    only: Option<&str>,
    prune: bool,
) -> CliResult<Vec<Change>> {
    let records = state.list()?;

    if let Some(id) = only {
        let recorded = records.iter().any(|(r, _)| r == id);
        if manifest.get(id).is_none() && !(prune && recorded) {
            return Err(CliError::UnknownApp { id: id.to_string() });
        }
    }
    let selected = |id: &str| only.is_none_or(|o| o == id);

    let mut changes = Vec::new();

    for entry in manifest.entries().iter().filter(|e| selected(&e.id)) {
        let prior = records
            .iter()
            .find(|(id, _)| *id == entry.id)
            .map(|(_, record)| record);

        let plan = apps.plan(&entry.app, prior)?;
        changes.push(Change {
            id: entry.id.clone(),
            desired: Some(entry.app.clone()),
            prior: prior.cloned(),
            plan,
        });
    }

    if prune {
        for (id, record) in &records {
            if manifest.get(id).is_some() || !selected(id) {
                continue;
            }
            let plan = apps.plan_destroy(&record.name)?;
            changes.push(Change {
                id: id.clone(),
                desired: None,
                prior: Some(record.clone()),
                plan,
            });
        }
    }

    Ok(changes)
}

/// Print changes in the selected output format.
pub fn render(changes: &[Change], output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        let views: Vec<_> = changes.iter().map(Change::view).collect();
        return output.json(&views);
    }

    for change in changes {
        output.plan(&change.id, &change.plan)?;
    }
    Ok(())
}
