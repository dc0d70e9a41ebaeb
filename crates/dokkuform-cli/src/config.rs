//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (`--host`, `--manifest`, `--state`, applied by [`AppConfig::apply_overrides`])
//! 2. Environment variables, e.g. `DOKKUFORM__HOST__ADDRESS=dokku.example.com`
//! 3. Config file (`--config`, else the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use dokkuform_adapters::SshConfig;

use crate::cli::global::GlobalArgs;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "DOKKUFORM";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How to reach the Dokku host.
    pub host: HostConfig,
    /// Where the manifest and state live.
    pub paths: PathsConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Log file settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub address: Option<String>,
    pub port: u16,
    pub user: String,
    pub identity_file: Option<PathBuf>,
    pub strict_host_key_checking: bool,
    pub connect_timeout_secs: u64,
    pub ssh_binary: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub manifest: PathBuf,
    pub state: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append logs to this file in addition to stderr.
    pub file: Option<PathBuf>,
    /// Write the file log as JSON lines.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HostConfig::default(),
            paths: PathsConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        let ssh = SshConfig::new("");
        Self {
            address: None,
            port: ssh.port,
            user: ssh.user,
            identity_file: None,
            strict_host_key_checking: ssh.strict_host_key_checking,
            connect_timeout_secs: ssh.connect_timeout_secs,
            ssh_binary: ssh.ssh_binary,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("dokkuform.toml"),
            state: PathBuf::from(".dokkuform/state.json"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl HostConfig {
    /// Ssh settings for the configured host, if one is set.
    pub fn ssh_config(&self) -> Option<SshConfig> {
        let address = self.address.as_deref().filter(|a| !a.trim().is_empty())?;

        let mut ssh = SshConfig::new(address.trim());
        ssh.port = self.port;
        ssh.user = self.user.clone();
        ssh.identity_file = self.identity_file.clone();
        ssh.strict_host_key_checking = self.strict_host_key_checking;
        ssh.connect_timeout_secs = self.connect_timeout_secs;
        ssh.ssh_binary = self.ssh_binary.clone();
        Some(ssh)
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// `config_file` is the path passed via `--config`.  An explicit file
    /// must exist; the default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    /// Like [`Self::load`], but a missing `--config` file yields defaults.
    /// `init` uses this since it is about to create that file.
    pub fn load_or_default(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let path = config_file.cloned().unwrap_or_else(Self::config_path);
        Self::load_from(&path, false)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Apply per-invocation overrides from the command line.
    pub fn apply_overrides(&mut self, args: &GlobalArgs) {
        if let Some(host) = &args.host {
            self.host.address = Some(host.clone());
        }
        if let Some(manifest) = &args.manifest {
            self.paths.manifest = manifest.clone();
        }
        if let Some(state) = &args.state {
            self.paths.state = state.clone();
        }
        if args.no_color {
            self.output.no_color = true;
        }
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.dokkuform.config.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "dokkuform", "dokkuform")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".dokkuform.config.toml"))
    }

    /// Path of the file in effect: `--config` if given, else the default.
    pub fn active_path(args: &GlobalArgs) -> PathBuf {
        args.config.clone().unwrap_or_else(Self::config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_target_dokku_user_on_port_22() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.host.user, "dokku");
        assert_eq!(cfg.host.port, 22);
        assert!(cfg.host.address.is_none());
        assert_eq!(cfg.paths.manifest, PathBuf::from("dokkuform.toml"));
    }

    #[test]
    fn no_host_means_no_ssh_config() {
        assert!(HostConfig::default().ssh_config().is_none());

        let blank = HostConfig {
            address: Some("  ".into()),
            ..HostConfig::default()
        };
        assert!(blank.ssh_config().is_none());
    }

    #[test]
    fn ssh_config_copies_settings() {
        let host = HostConfig {
            address: Some("dokku.example.com".into()),
            port: 2222,
            identity_file: Some(PathBuf::from("/keys/deploy")),
            ..HostConfig::default()
        };
        let ssh = host.ssh_config().unwrap();

        assert_eq!(ssh.destination(), "dokku@dokku.example.com");
        assert_eq!(ssh.port, 2222);
        assert_eq!(ssh.identity_file, Some(PathBuf::from("/keys/deploy")));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[host]\naddress = \"dokku.example.com\"\nport = 2222\n\n[paths]\nstate = \"/tmp/s.json\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.host.address.as_deref(), Some("dokku.example.com"));
        assert_eq!(cfg.host.port, 2222);
        assert_eq!(cfg.host.user, "dokku");
        assert_eq!(cfg.paths.state, PathBuf::from("/tmp/s.json"));
        assert_eq!(cfg.paths.manifest, PathBuf::from("dokkuform.toml"));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn load_or_default_tolerates_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("new.toml");
        let cfg = AppConfig::load_or_default(Some(&missing)).unwrap();
        assert_eq!(cfg.host.user, "dokku");
        assert!(!missing.exists());
    }

    #[test]
    fn optional_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("nope.toml"), false).unwrap();
        assert_eq!(cfg.host.port, 22);
    }

    #[test]
    fn default_config_serialises_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml::to_string_pretty(&AppConfig::default()).unwrap()).unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.paths, AppConfig::default().paths);
        assert_eq!(cfg.host.port, 22);
    }

    #[test]
    fn overrides_replace_host_and_paths() {
        let mut cfg = AppConfig::default();
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: false,
            config: None,
            host: Some("h.example.com".into()),
            manifest: Some(PathBuf::from("apps.toml")),
            state: None,
            output_format: crate::cli::OutputFormat::Auto,
        };

        cfg.apply_overrides(&args);
        assert_eq!(cfg.host.address.as_deref(), Some("h.example.com"));
        assert_eq!(cfg.paths.manifest, PathBuf::from("apps.toml"));
        assert_eq!(cfg.paths.state, PathBuf::from(".dokkuform/state.json"));
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
