//! In-memory state store.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use dokkuform_core::{
    application::{ApplicationError, ports::StateStore},
    domain::AppRecord,
    error::DokkuformResult,
};

/// Thread-safe in-memory state store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    inner: Arc<RwLock<BTreeMap<String, AppRecord>>>,
}

impl InMemoryStateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self, id: &str) -> DokkuformResult<Option<AppRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StateLockError)?;

        Ok(inner.get(id).cloned())
    }

    fn save(&self, id: &str, record: AppRecord) -> DokkuformResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StateLockError)?;

        inner.insert(id.to_string(), record);
        Ok(())
    }

    fn remove(&self, id: &str) -> DokkuformResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StateLockError)?;

        inner.remove(id);
        Ok(())
    }

    fn list(&self) -> DokkuformResult<Vec<(String, AppRecord)>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StateLockError)?;

        Ok(inner
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect())
    }
}
