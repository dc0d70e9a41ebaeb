//! Command handlers.
//!
//! Each handler translates parsed arguments into calls on the core
//! services and renders the result.  Adapter wiring lives here so the
//! handlers never name concrete adapter types.

use tracing::debug;

use dokkuform_adapters::{FileStateStore, Manifest, ManifestLoader, SshClient};
use dokkuform_core::application::{AppService, StateService};

use crate::{
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod apply;
pub mod completions;
pub mod config;
pub mod destroy;
pub mod init;
pub mod plan;
pub mod show;

/// App service talking to the configured host over ssh.
pub(crate) fn app_service(config: &AppConfig) -> CliResult<AppService> {
    let ssh = config.host.ssh_config().ok_or(CliError::NoHost)?;
    debug!(destination = %ssh.destination(), port = ssh.port, "Using ssh host");
    Ok(AppService::new(Box::new(SshClient::new(ssh))))
}

/// State service over the configured state file.
pub(crate) fn state_service(config: &AppConfig) -> StateService {
    debug!(path = %config.paths.state.display(), "Using state file");
    StateService::new(Box::new(FileStateStore::new(&config.paths.state)))
}

/// Load the configured manifest.
pub(crate) fn load_manifest(config: &AppConfig) -> CliResult<Manifest> {
    Ok(ManifestLoader::new(&config.paths.manifest).load()?)
}

/// `host` for messages, or a placeholder when unset.
pub(crate) fn host_label(config: &AppConfig) -> &str {
    config.host.address.as_deref().unwrap_or("<no host>")
}
