//! Remote Dokku commands and their textual rendering.
//!
//! Every interaction with the host goes through one of these variants. The
//! rendered line is what the remote shell receives, so anything that is not
//! a validated identifier is single-quoted.

use std::borrow::Cow;
use std::fmt;

use crate::domain::value_objects::{AppName, ConfigVars};

/// One command understood by the Dokku host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DokkuCommand {
    AppsExists { app: AppName },
    AppsCreate { app: AppName },
    AppsRename { from: AppName, to: AppName },
    AppsDestroy { app: AppName },
    AppsLock { app: AppName },
    AppsUnlock { app: AppName },
    AppsLocked { app: AppName },
    ConfigShow { app: AppName },
    ConfigSet { app: AppName, vars: ConfigVars },
    ConfigUnset { app: AppName, keys: Vec<String> },
    DomainsReport { app: AppName },
    DomainsSet { app: AppName, domains: Vec<String> },
    DomainsAdd { app: AppName, domains: Vec<String> },
    DomainsRemove { app: AppName, domains: Vec<String> },
    DomainsClear { app: AppName },
}

impl DokkuCommand {
    /// The Dokku subcommand, e.g. `apps:create`.
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::AppsExists { .. } => "apps:exists",
            Self::AppsCreate { .. } => "apps:create",
            Self::AppsRename { .. } => "apps:rename",
            Self::AppsDestroy { .. } => "apps:destroy",
            Self::AppsLock { .. } => "apps:lock",
            Self::AppsUnlock { .. } => "apps:unlock",
            Self::AppsLocked { .. } => "apps:locked",
            Self::ConfigShow { .. } => "config:show",
            Self::ConfigSet { .. } => "config:set",
            Self::ConfigUnset { .. } => "config:unset",
            Self::DomainsReport { .. } => "domains:report",
            Self::DomainsSet { .. } => "domains:set",
            Self::DomainsAdd { .. } => "domains:add",
            Self::DomainsRemove { .. } => "domains:remove",
            Self::DomainsClear { .. } => "domains:clear",
        }
    }

    /// The app this command operates on (the old name for a rename).
    pub fn app(&self) -> &AppName {
        match self {
            Self::AppsRename { from, .. } => from,
            Self::AppsExists { app }
            | Self::AppsCreate { app }
            | Self::AppsDestroy { app }
            | Self::AppsLock { app }
            | Self::AppsUnlock { app }
            | Self::AppsLocked { app }
            | Self::ConfigShow { app }
            | Self::ConfigSet { app, .. }
            | Self::ConfigUnset { app, .. }
            | Self::DomainsReport { app }
            | Self::DomainsSet { app, .. }
            | Self::DomainsAdd { app, .. }
            | Self::DomainsRemove { app, .. }
            | Self::DomainsClear { app } => app,
        }
    }

    /// Whether running this command changes state on the host.
    pub const fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::AppsExists { .. }
                | Self::AppsLocked { .. }
                | Self::ConfigShow { .. }
                | Self::DomainsReport { .. }
        )
    }

    /// The exact command line sent to the host.
    pub fn render(&self) -> String {
        let mut parts: Vec<Cow<'_, str>> = vec![Cow::Borrowed(self.verb())];

        match self {
            Self::AppsRename { from, to } => {
                parts.push(Cow::Borrowed(from.as_str()));
                parts.push(Cow::Borrowed(to.as_str()));
            }
            Self::AppsDestroy { app } => {
                parts.push(Cow::Borrowed(app.as_str()));
                parts.push(Cow::Borrowed("--force"));
            }
            Self::ConfigSet { app, vars } => {
                parts.push(Cow::Borrowed(app.as_str()));
                parts.push(Cow::Owned(config_assignments(vars)));
            }
            Self::ConfigUnset { app, keys: items }
            | Self::DomainsSet { app, domains: items }
            | Self::DomainsAdd { app, domains: items }
            | Self::DomainsRemove { app, domains: items } => {
                parts.push(Cow::Borrowed(app.as_str()));
                parts.extend(items.iter().map(|item| shell_quote(item)));
            }
            other => parts.push(Cow::Borrowed(other.app().as_str())),
        }

        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}

impl fmt::Display for DokkuCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render `KEY='value'` pairs separated by single spaces.
pub fn config_assignments(vars: &ConfigVars) -> String {
    vars.iter()
        .map(|(k, v)| format!("{}={}", shell_quote(k), shell_quote(v)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote `word` for a POSIX shell, leaving plain words untouched.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | ',' | '+'));

    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}
