//! Infrastructure adapters for dokkuform.
//!
//! This crate implements the ports defined in `dokkuform-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod manifest;
pub mod remote;
pub mod state_store;

// Re-export commonly used adapters
pub use manifest::{Manifest, ManifestEntry, ManifestLoader};
pub use remote::{InMemoryDokku, SshClient, SshConfig};
pub use state_store::{FileStateStore, InMemoryStateStore, StateFile};
