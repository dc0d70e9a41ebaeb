//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `dokkuform-adapters` crate provides implementations.

use crate::application::RemoteError;
use crate::domain::AppRecord;
use crate::error::DokkuformResult;

/// Port for running Dokku commands on the host.
///
/// Implemented by:
/// - `dokkuform_adapters::remote::SshClient` (production)
/// - `dokkuform_adapters::remote::InMemoryDokku` (testing)
///
/// ## Design Notes
///
/// - One call is one command line; there is no session reuse
/// - Output is returned raw; parsing belongs to `crate::domain::parsers`
/// - A non-zero exit is an error carrying both output streams, because some
///   answers (e.g. "app does not exist") are only recognisable from them
#[cfg_attr(test, mockall::automock)]
pub trait RemoteCommandClient: Send + Sync {
    /// Execute `command` and return its standard output.
    fn run(&self, command: &str) -> Result<String, RemoteError>;
}

/// Port for the record of what was last applied, keyed by resource id.
///
/// The resource id is the key the user gave the app in the manifest. It
/// stays stable when the app itself is renamed.
///
/// Implemented by:
/// - `dokkuform_adapters::state_store::FileStateStore` (JSON on disk)
/// - `dokkuform_adapters::state_store::InMemoryStateStore` (testing)
pub trait StateStore: Send + Sync {
    /// Record for `id`, if one exists.
    fn load(&self, id: &str) -> DokkuformResult<Option<AppRecord>>;

    /// Insert or replace the record for `id`.
    fn save(&self, id: &str, record: AppRecord) -> DokkuformResult<()>;

    /// Drop the record for `id`. Missing records are not an error.
    fn remove(&self, id: &str) -> DokkuformResult<()>;

    /// All records, ordered by id.
    fn list(&self) -> DokkuformResult<Vec<(String, AppRecord)>>;
}
