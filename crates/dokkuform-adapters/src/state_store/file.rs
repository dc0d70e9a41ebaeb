//! JSON state file on local disk.
//!
//! Every write replaces the whole file through a temporary sibling and a
//! rename, so a crash leaves either the old or the new file behind.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use dokkuform_core::{
    application::{ApplicationError, ports::StateStore},
    domain::AppRecord,
    error::{Context as _, DokkuformError, DokkuformResult},
};

/// Format version written to new state files.
pub const STATE_FILE_VERSION: u32 = 1;

/// On-disk layout of the state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    /// Identifies one state history; kept across writes.
    pub lineage: Uuid,
    /// Incremented on every write.
    pub serial: u64,
    #[serde(default)]
    pub apps: BTreeMap<String, AppRecord>,
}

impl StateFile {
    /// An empty state with a fresh lineage.
    pub fn new() -> Self {
        Self {
            version: STATE_FILE_VERSION,
            lineage: Uuid::new_v4(),
            serial: 0,
            apps: BTreeMap::new(),
        }
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// State store backed by a single JSON file.
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStateStore {
    /// Create a store for `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole state file. A missing file is an empty state.
    pub fn read(&self) -> DokkuformResult<StateFile> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StateFile::new()),
            Err(e) => return Err(map_io_error(&self.path, e, "read")),
        };

        let state: StateFile =
            serde_json::from_str(&content).map_err(|e| ApplicationError::StateStore {
                reason: format!("{} is not a valid state file: {}", self.path.display(), e),
            })?;

        if state.version > STATE_FILE_VERSION {
            return Err(ApplicationError::StateStore {
                reason: format!(
                    "{} has version {}, this build understands up to {}",
                    self.path.display(),
                    state.version,
                    STATE_FILE_VERSION
                ),
            }
            .into());
        }

        Ok(state)
    }

    #[instrument(skip(self, state), fields(path = %self.path.display(), serial = state.serial))]
    fn write(&self, state: &StateFile) -> DokkuformResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory"))?;
        }

        let json = serde_json::to_string_pretty(state).context("failed to serialize state")?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json + "\n").map_err(|e| map_io_error(&tmp, e, "write"))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| map_io_error(&self.path, e, "replace"))?;

        debug!("state written");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn modify<F>(&self, change: F) -> DokkuformResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, AppRecord>) -> bool,
    {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| ApplicationError::StateLockError)?;

        let mut state = self.read()?;
        if !change(&mut state.apps) {
            return Ok(());
        }
        state.version = STATE_FILE_VERSION;
        state.serial += 1;
        self.write(&state)
    }
}

impl StateStore for FileStateStore {
    fn load(&self, id: &str) -> DokkuformResult<Option<AppRecord>> {
        Ok(self.read()?.apps.remove(id))
    }

    fn save(&self, id: &str, record: AppRecord) -> DokkuformResult<()> {
        self.modify(|apps| {
            apps.insert(id.to_string(), record);
            true
        })
    }

    fn remove(&self, id: &str) -> DokkuformResult<()> {
        self.modify(|apps| apps.remove(id).is_some())
    }

    fn list(&self) -> DokkuformResult<Vec<(String, AppRecord)>> {
        Ok(self.read()?.apps.into_iter().collect())
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> DokkuformError {
    ApplicationError::StateStore {
        reason: format!("Failed to {} {}: {}", operation, path.display(), e),
    }
    .into()
}
