//! TOML manifest of declared apps.
//!
//! # `dokkuform.toml` format
//!
//! ```toml
//! [apps.web]
//! name    = "web"              # optional; defaults to the table key
//! locked  = false              # optional
//! domains = ["example.com"]    # optional
//!
//! [apps.web.config]
//! DATABASE_URL = "postgres://db/web"
//! WORKERS      = 4             # numbers and booleans are stringified
//! ```
//!
//! The table key (`web` above) is the resource id. It stays the same when
//! `name` changes, which is how a rename is told apart from a replacement.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument};

use dokkuform_core::{
    domain::{AppName, ConfigVars, DokkuApp, DomainValidator, Domains},
    error::{DokkuformError, DokkuformResult},
};

/// Raw `dokkuform.toml`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    apps: BTreeMap<String, RawApp>,
}

/// One `[apps.<id>]` table.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
struct RawApp {
    name: Option<String>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    domains: Vec<String>,
    #[serde(default)]
    config: BTreeMap<String, ConfigValue>,
}

/// Config values may be written as any TOML scalar.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl ConfigValue {
    fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

/// A declared app and the resource id it was declared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    pub app: DokkuApp,
}

/// Validated manifest, ordered by resource id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse and validate manifest text.
    pub fn parse(raw: &str) -> DokkuformResult<Self> {
        let raw: RawManifest = toml::from_str(raw).map_err(|e| invalid(format!("{e}")))?;

        let mut seen_names: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::with_capacity(raw.apps.len());

        for (id, raw_app) in raw.apps {
            let app = build_app(&id, raw_app)?;

            if let Some(other) = seen_names.insert(app.name.to_string(), id.clone()) {
                return Err(invalid(format!(
                    "apps '{other}' and '{id}' both declare the name '{}'",
                    app.name
                )));
            }

            entries.push(ManifestEntry { id, app });
        }

        Ok(Self { entries })
    }
}

fn build_app(id: &str, raw: RawApp) -> DokkuformResult<DokkuApp> {
    let name = AppName::new(raw.name.unwrap_or_else(|| id.to_string()))?;

    let config_vars: ConfigVars = raw
        .config
        .into_iter()
        .map(|(k, v)| (k, v.into_string()))
        .collect();
    let domains: Domains = raw.domains.into_iter().collect();

    let app = DokkuApp::new(name)
        .with_locked(raw.locked)
        .with_config_vars(config_vars)
        .with_domains(domains);

    DomainValidator::validate_app(&app)?;
    Ok(app)
}

fn invalid(message: String) -> DokkuformError {
    DokkuformError::Configuration {
        message: format!("invalid manifest: {message}"),
    }
}

/// Reads a manifest from disk.
pub struct ManifestLoader {
    path: PathBuf,
}

impl ManifestLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the manifest.
    ///
    /// # Errors
    ///
    /// [`DokkuformError::Configuration`] when the file is missing, is not
    /// valid TOML, or declares the same app name twice. Invalid names, keys
    /// and domains surface as domain validation errors.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> DokkuformResult<Manifest> {
        let raw = fs::read_to_string(&self.path).map_err(|e| DokkuformError::Configuration {
            message: format!("failed to read manifest '{}': {e}", self.path.display()),
        })?;

        let manifest = Manifest::parse(&raw).map_err(|e| match e {
            DokkuformError::Configuration { message } => DokkuformError::Configuration {
                message: format!("{} ({})", message, self.path.display()),
            },
            other => other,
        })?;

        debug!(apps = manifest.len(), "manifest loaded");
        Ok(manifest)
    }
}
