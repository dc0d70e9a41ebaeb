use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AppName, ConfigVars, Domains};

/// A Dokku application, either as declared or as observed on the host.
///
/// Absence on the host is modelled as `Option<DokkuApp>` by callers, never
/// with a sentinel value inside this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DokkuApp {
    pub name: AppName,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub config_vars: ConfigVars,
    #[serde(default)]
    pub domains: Domains,
}

impl DokkuApp {
    /// An unlocked app with no config and no domains.
    pub fn new(name: AppName) -> Self {
        Self {
            name,
            locked: false,
            config_vars: ConfigVars::new(),
            domains: Domains::new(),
        }
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_config_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_vars.insert(key, value);
        self
    }

    pub fn with_config_vars(mut self, vars: ConfigVars) -> Self {
        self.config_vars = vars;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.insert(domain);
        self
    }

    pub fn with_domains(mut self, domains: Domains) -> Self {
        self.domains = domains;
        self
    }

    /// Observed config restricted to the keys the user declared.
    ///
    /// Variables the platform sets on its own (e.g. `DOKKU_PROXY_PORT`) are
    /// left out so they never show up as drift.
    pub fn managed_config_vars<'a>(&self, declared_keys: impl IntoIterator<Item = &'a str>) -> ConfigVars {
        self.config_vars.retain_keys(declared_keys)
    }

    /// A copy of this (observed) app as seen through the declared keys.
    pub fn managed_view<'a>(&self, declared_keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            config_vars: self.managed_config_vars(declared_keys),
            ..self.clone()
        }
    }
}
