use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::app::DokkuApp,
    value_objects::{AppName, Domains},
};

/// What was last applied for one declared app.
///
/// The record is the memory that lets a later run tell a key the user
/// stopped declaring apart from a key the platform set on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: AppName,
    pub locked: bool,
    pub managed_keys: BTreeSet<String>,
    pub domains: Domains,
    pub applied_at: DateTime<Utc>,
}

impl AppRecord {
    /// Record the managed view of an app right after it was applied.
    pub fn from_applied(app: &DokkuApp, applied_at: DateTime<Utc>) -> Self {
        Self {
            name: app.name.clone(),
            locked: app.locked,
            managed_keys: app.config_vars.keys().map(str::to_string).collect(),
            domains: app.domains.clone(),
            applied_at,
        }
    }

    pub fn manages(&self, key: &str) -> bool {
        self.managed_keys.contains(key)
    }

    /// Whether recording `app` again would change anything but the timestamp.
    pub fn describes(&self, app: &DokkuApp) -> bool {
        self.name == app.name
            && self.locked == app.locked
            && self.domains == app.domains
            && self.managed_keys.iter().map(String::as_str).eq(app.config_vars.keys())
    }
}
