//! `dokkuform apply`: converge the host to the manifest.
//!
//! Dispatch sequence:
//! 1. Plan every selected app (shared with `plan`)
//! 2. Show the plans and confirm unless `--yes`
//! 3. Run each plan in order, recording state after each app
//! 4. Stop at the first failure; apps already applied keep their records

use tracing::{info, instrument};

use dokkuform_core::{
    application::{AppService, StateService},
    domain::DokkuCommand,
};

use super::plan::{self, Change};
use crate::{
    cli::ApplyArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `dokkuform apply` command.
#[instrument(skip_all)]
pub fn execute(args: ApplyArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let manifest = super::load_manifest(&config)?;
    let apps = super::app_service(&config)?;
    let state = super::state_service(&config);

    let changes = plan::compute(&apps, &state, &manifest, args.app.as_deref(), args.prune)?;

    let pending: Vec<&Change> = changes.iter().filter(|c| !c.plan.is_noop()).collect();

    if !output.is_json() {
        for change in &pending {
            output.plan(&change.id, &change.plan)?;
        }
    }

    if !pending.is_empty() && !args.yes {
        let prompt = format!(
            "Apply {} change(s) to {}?",
            pending.len(),
            super::host_label(&config)
        );
        if !output.confirm(&prompt)? {
            return Err(CliError::Cancelled);
        }
    }

    let mut applied = Vec::new();
    for change in &changes {
        if apply_change(change, &apps, &state, &output)? {
            applied.push(change);
        }
    }

    info!(applied = applied.len(), "Apply finished");

    if output.is_json() {
        let views: Vec<_> = applied.iter().map(|c| c.view()).collect();
        return output.json(&views);
    }
    if pending.is_empty() {
        output.success("No changes. The host matches the manifest.")?;
    } else {
        output.success(&format!("Applied {} change(s).", pending.len()))?;
    }
    Ok(())
}

/// Apply one change and update its record.  Returns whether any remote
/// command ran.
fn apply_change(
    change: &Change,
    apps: &AppService,
    state: &StateService,
    output: &OutputManager,
) -> CliResult<bool> {
    let noop = change.plan.is_noop();

    let Some(desired) = &change.desired else {
        // Orphaned record: the app left the manifest.
        if !noop {
            run_with_progress(change, output, |on_step| {
                apps.execute(&change.plan, on_step).map_err(CliError::from)
            })?;
            output.success(&format!("{} destroyed", change.plan.app()))?;
        }
        state.forget(&change.id)?;
        return Ok(!noop);
    };

    // An unchanged app is read back only to adopt it or to refresh a
    // record that no longer matches the manifest.
    let record_current = change.prior.as_ref().is_some_and(|r| r.describes(desired));
    if noop && record_current {
        return Ok(false);
    }

    let outcome = run_with_progress(change, output, |on_step| {
        apps.apply_plan(desired, change.plan.clone(), on_step)
            .map_err(CliError::from)
    })?;
    state.record(&change.id, &outcome)?;

    if noop && change.prior.is_some() {
        output.info(&format!("{} record refreshed", desired.name))?;
    } else if noop {
        output.info(&format!("{} adopted without changes", desired.name))?;
    } else {
        output.success(&format!("{} {}d", desired.name, change.plan.action()))?;
    }
    Ok(!noop)
}

/// Run `work` with a progress bar that follows each remote command.
fn run_with_progress<T, W>(change: &Change, output: &OutputManager, work: W) -> CliResult<T>
where
    W: FnOnce(&mut dyn FnMut(usize, &DokkuCommand)) -> CliResult<T>,
{
    let bar = output.progress(change.plan.len());
    bar.set_prefix(change.id.clone());

    let mut on_step = |idx: usize, command: &DokkuCommand| {
        bar.set_position(idx as u64);
        bar.set_message(command.render());
    };

    match work(&mut on_step) {
        Ok(value) => {
            bar.finish_and_clear();
            Ok(value)
        }
        Err(e) => {
            bar.abandon();
            Err(e)
        }
    }
}
