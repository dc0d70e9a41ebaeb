//! State Service - last-applied record operations.
//!
//! Handles record CRUD for the CLI driver. Separated from AppService for
//! single responsibility: AppService never touches local state.

use crate::{
    application::{ports::StateStore, services::app_service::ApplyOutcome},
    domain::AppRecord,
    error::DokkuformResult,
};

/// Service for state record operations.
pub struct StateService {
    store: Box<dyn StateStore>,
}

impl StateService {
    /// Create a new state service.
    pub fn new(store: Box<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Get the record for a resource id.
    pub fn get(&self, id: &str) -> DokkuformResult<Option<AppRecord>> {
        self.store.load(id)
    }

    /// Persist the record produced by an apply.
    pub fn record(&self, id: &str, outcome: &ApplyOutcome) -> DokkuformResult<()> {
        self.store.save(id, outcome.record.clone())
    }

    /// Forget a resource id.
    pub fn forget(&self, id: &str) -> DokkuformResult<()> {
        self.store.remove(id)
    }

    /// List all records.
    pub fn list(&self) -> DokkuformResult<Vec<(String, AppRecord)>> {
        self.store.list()
    }
}
