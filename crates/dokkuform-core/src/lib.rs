//! Core of dokkuform, which reconciles declared Dokku apps (name, lock,
//! config vars, domains) against a host reachable only through its command interface.
//!
//! ## Layers
//!
//! - [`domain`]: app model, output parsers and the [`domain::Reconciler`]
//!   that turns observed and desired state into a [`domain::Plan`]. No I/O.
//! - [`application`]: [`application::AppService`] and
//!   [`application::StateService`], plus the ports they drive
//!   ([`application::RemoteCommandClient`], [`application::StateStore`]).
//! - [`error`]: the [`error::DokkuformError`] every public call returns.
//!
//! Ports are implemented in `dokkuform-adapters` (ssh, an in-memory host,
//! the JSON state file) and wired together by `dokkuform-cli`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dokkuform_core::{
//!     application::AppService,
//!     domain::{AppName, DokkuApp},
//! };
//!
//! // 1. Declare the app
//! let desired = DokkuApp::new(AppName::new("web").unwrap())
//!     .with_config_var("RUST_LOG", "info")
//!     .with_domain("web.example.com");
//!
//! // 2. Use application service (with an injected remote client)
//! let service = AppService::new(client);
//! let outcome = service.apply(&desired, None).unwrap();
//! ```

pub mod application;
pub mod domain;
pub mod error;

/// The types a driver needs to plan and apply.
pub mod prelude {
    pub use crate::application::{
        AppService, ApplyOutcome, RemoteError, StateService,
        ports::{RemoteCommandClient, StateStore},
    };
    pub use crate::domain::{
        AppName, AppRecord, ConfigVars, DokkuApp, DokkuCommand, Domains, Plan, PlanAction,
        Reconciler,
    };
    pub use crate::error::{DokkuformError, DokkuformResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
