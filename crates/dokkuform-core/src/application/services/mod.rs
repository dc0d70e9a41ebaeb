//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "converge this app" or "forget this record".

pub mod app_service;
pub mod state_service;

pub use app_service::{AppService, ApplyOutcome};
pub use state_service::StateService;
