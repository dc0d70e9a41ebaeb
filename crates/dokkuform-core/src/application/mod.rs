//! Application layer for dokkuform.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (AppService, StateService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! diffing or parsing logic itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    AppService,
    ApplyOutcome, // DTO returned by apply/create/update
    StateService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{RemoteCommandClient, StateStore};

pub use error::{APP_MISSING_EXIT_STATUS, ApplicationError, RemoteError};
