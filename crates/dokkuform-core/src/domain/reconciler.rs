//! Desired-vs-observed diffing.
//!
//! Pure functions only: the reconciler never talks to the host. It turns
//! three snapshots (what the user declares, what was last applied, what the
//! host reports) into the minimal ordered list of mutating commands.

use std::collections::BTreeSet;

use crate::domain::{
    entities::{AppRecord, DokkuApp, DokkuCommand, Plan, PlanAction},
    value_objects::{AppName, ConfigVars},
};

/// Computes create / update / delete plans.
pub struct Reconciler;

impl Reconciler {
    /// Plan the commands that make `observed` match `desired`.
    ///
    /// `prior` is the record of the previous apply, if any. Its managed keys
    /// widen the set of config keys this run is allowed to unset.
    pub fn plan(desired: &DokkuApp, prior: Option<&AppRecord>, observed: Option<&DokkuApp>) -> Plan {
        match observed {
            None => Self::create(desired),
            Some(observed) => Self::update(desired, prior, observed),
        }
    }

    /// Plan for an app that does not exist on the host yet.
    pub fn create(desired: &DokkuApp) -> Plan {
        let app = desired.name.clone();
        let mut commands = vec![DokkuCommand::AppsCreate { app: app.clone() }];

        if desired.locked {
            commands.push(DokkuCommand::AppsLock { app: app.clone() });
        }

        if !desired.config_vars.is_empty() {
            commands.push(DokkuCommand::ConfigSet {
                app: app.clone(),
                vars: desired.config_vars.clone(),
            });
        }

        // A fresh app inherits the global vhost; clear it when the user
        // declares no domains so the next read matches.
        if desired.domains.is_empty() {
            commands.push(DokkuCommand::DomainsClear { app: app.clone() });
        } else {
            commands.push(DokkuCommand::DomainsSet {
                app: app.clone(),
                domains: desired.domains.iter().map(str::to_string).collect(),
            });
        }

        Plan::new(app, PlanAction::Create, commands)
    }

    /// Plan for an app that already exists on the host.
    pub fn update(desired: &DokkuApp, prior: Option<&AppRecord>, observed: &DokkuApp) -> Plan {
        let app = desired.name.clone();
        let mut commands = Vec::new();

        if observed.name != desired.name {
            commands.push(DokkuCommand::AppsRename {
                from: observed.name.clone(),
                to: app.clone(),
            });
        }

        match (observed.locked, desired.locked) {
            (false, true) => commands.push(DokkuCommand::AppsLock { app: app.clone() }),
            (true, false) => commands.push(DokkuCommand::AppsUnlock { app: app.clone() }),
            _ => {}
        }

        let stale = Self::stale_keys(desired, prior, observed);
        if !stale.is_empty() {
            commands.push(DokkuCommand::ConfigUnset {
                app: app.clone(),
                keys: stale,
            });
        }

        let changed = Self::changed_vars(desired, observed);
        if !changed.is_empty() {
            commands.push(DokkuCommand::ConfigSet {
                app: app.clone(),
                vars: changed,
            });
        }

        let to_remove = observed.domains.difference(&desired.domains);
        if !to_remove.is_empty() {
            commands.push(DokkuCommand::DomainsRemove {
                app: app.clone(),
                domains: to_remove,
            });
        }

        let to_add = desired.domains.difference(&observed.domains);
        if !to_add.is_empty() {
            commands.push(DokkuCommand::DomainsAdd {
                app: app.clone(),
                domains: to_add,
            });
        }

        Plan::new(app, PlanAction::Update, commands)
    }

    /// Plan that removes an app from the host.
    pub fn delete(name: &AppName) -> Plan {
        Plan::new(
            name.clone(),
            PlanAction::Delete,
            vec![DokkuCommand::AppsDestroy { app: name.clone() }],
        )
    }

    /// Managed keys present on the host that are no longer declared.
    fn stale_keys(desired: &DokkuApp, prior: Option<&AppRecord>, observed: &DokkuApp) -> Vec<String> {
        let mut managed: BTreeSet<&str> = desired.config_vars.keys().collect();
        if let Some(prior) = prior {
            managed.extend(prior.managed_keys.iter().map(String::as_str));
        }

        managed
            .into_iter()
            .filter(|key| observed.config_vars.contains_key(key))
            .filter(|key| !desired.config_vars.contains_key(key))
            .map(str::to_string)
            .collect()
    }

    /// Declared variables that are missing on the host or hold another value.
    fn changed_vars(desired: &DokkuApp, observed: &DokkuApp) -> ConfigVars {
        desired
            .config_vars
            .iter()
            .filter(|(key, value)| observed.config_vars.get(key) != Some(*value))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}
