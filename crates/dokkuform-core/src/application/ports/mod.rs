//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `dokkuform-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `RemoteCommandClient`: Command execution on the Dokku host
//!   - `StateStore`: Last-applied records
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{RemoteCommandClient, StateStore};

#[cfg(test)]
pub use output::MockRemoteCommandClient;
