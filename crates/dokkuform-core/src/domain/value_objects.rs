//! Domain value objects: AppName, ConfigVars, Domains.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity.
//! `AppName` validates at construction because it is interpolated into every
//! remote command. `ConfigVars` and `Domains` accept anything so that
//! observed state read back from the host can always be represented; the
//! declared side is checked by `DomainValidator` before it is applied.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Longest app name Dokku accepts.
pub const MAX_APP_NAME_LEN: usize = 64;

// ── AppName ──────────────────────────────────────────────────────────────────

/// A Dokku application name.
///
/// Invariant: non-empty, at most [`MAX_APP_NAME_LEN`] characters, only
/// lowercase ASCII letters, digits and `-`, starting with a letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppName(String);

impl AppName {
    /// Fallible constructor.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let invalid = |reason: &str| DomainError::InvalidAppName {
            name: name.clone(),
            reason: reason.into(),
        };

        let Some(first) = name.chars().next() else {
            return Err(invalid("name cannot be empty"));
        };
        if name.len() > MAX_APP_NAME_LEN {
            return Err(invalid("name is longer than 64 characters"));
        }
        if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
            return Err(invalid("name must start with a lowercase letter or digit"));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(invalid(&format!("character '{bad}' is not allowed")));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AppName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AppName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AppName> for String {
    fn from(name: AppName) -> Self {
        name.0
    }
}

impl AsRef<str> for AppName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── ConfigVars ───────────────────────────────────────────────────────────────

/// Environment variables of an app, ordered by key.
///
/// Ordering keeps rendered commands and diffs deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigVars(BTreeMap<String, String>);

impl ConfigVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a variable, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the variables whose key is in `keys`.
    pub fn retain_keys<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: BTreeSet<&str> = keys.into_iter().collect();
        self.iter()
            .filter(|(k, _)| keys.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Validate a single declared key.
    pub fn validate_key(key: &str) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidConfigKey {
            key: key.to_string(),
            reason: reason.into(),
        };

        let Some(first) = key.chars().next() else {
            return Err(invalid("key cannot be empty"));
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(invalid("key must start with a letter or '_'"));
        }
        if key.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
            return Err(invalid("only letters, digits and '_' are allowed"));
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for ConfigVars {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for ConfigVars {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a ConfigVars {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Domains ──────────────────────────────────────────────────────────────────

/// Virtual hosts attached to an app. Set semantics, ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domains(BTreeSet<String>);

impl Domains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, domain: impl Into<String>) -> bool {
        self.0.insert(domain.into())
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.0.contains(domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Domains in `self` that are not in `other`, in order.
    pub fn difference(&self, other: &Domains) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Validate a single declared domain.
    pub fn validate_domain(domain: &str) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidDomain {
            domain: domain.to_string(),
            reason: reason.into(),
        };

        if domain.is_empty() {
            return Err(invalid("domain cannot be empty"));
        }
        if let Some(bad) = domain
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '*')))
        {
            return Err(invalid(&format!("character '{bad}' is not allowed")));
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Domains {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Domains {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
