//! Remote command adapter using the system `ssh` binary.
//!
//! Dokku's ssh user maps the remote command line straight onto the `dokku`
//! CLI, so `ssh dokku@host apps:exists web` is all it takes.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use dokkuform_core::application::{RemoteError, ports::RemoteCommandClient};

/// Exit status `ssh` itself uses when the session could not be set up.
const SSH_FAILURE_STATUS: i32 = 255;

/// Connection settings for [`SshClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub identity_file: Option<PathBuf>,
    /// `true` pins host keys strictly, `false` accepts new keys on first use.
    pub strict_host_key_checking: bool,
    pub connect_timeout_secs: u64,
    pub ssh_binary: PathBuf,
}

impl SshConfig {
    /// Defaults for a Dokku host: user `dokku`, port 22.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: "dokku".into(),
            identity_file: None,
            strict_host_key_checking: false,
            connect_timeout_secs: 10,
            ssh_binary: PathBuf::from("ssh"),
        }
    }

    /// `user@host`.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Production remote client: one `ssh` process per command.
#[derive(Debug, Clone)]
pub struct SshClient {
    config: SshConfig,
}

impl SshClient {
    /// Create a new ssh client.
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    /// Arguments passed to the ssh binary for `command`.
    pub fn args(&self, command: &str) -> Vec<OsString> {
        let cfg = &self.config;
        let host_key_policy = if cfg.strict_host_key_checking {
            "yes"
        } else {
            "accept-new"
        };

        let mut args: Vec<OsString> = vec![
            "-p".into(),
            cfg.port.to_string().into(),
            "-o".into(),
            "BatchMode=yes".into(),
            "-o".into(),
            format!("ConnectTimeout={}", cfg.connect_timeout_secs).into(),
            "-o".into(),
            format!("StrictHostKeyChecking={host_key_policy}").into(),
        ];

        if let Some(key) = &cfg.identity_file {
            args.push("-i".into());
            args.push(key.clone().into_os_string());
            args.push("-o".into());
            args.push("IdentitiesOnly=yes".into());
        }

        args.push(cfg.destination().into());
        args.push(command.into());
        args
    }
}

impl RemoteCommandClient for SshClient {
    #[instrument(skip(self), fields(host = %self.config.host))]
    fn run(&self, command: &str) -> Result<String, RemoteError> {
        let output = Command::new(&self.config.ssh_binary)
            .args(self.args(command))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| RemoteError::Connect {
                reason: format!("failed to start {}: {e}", self.config.ssh_binary.display()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(status = ?output.status.code(), "ssh finished");

        interpret_exit(command, output.status.code(), stdout, stderr)
    }
}

/// Map an ssh exit status and its output streams to the port's result.
fn interpret_exit(
    command: &str,
    status: Option<i32>,
    stdout: String,
    stderr: String,
) -> Result<String, RemoteError> {
    match status {
        Some(0) => Ok(stdout),
        Some(SSH_FAILURE_STATUS) => Err(RemoteError::Connect {
            reason: stderr.trim().to_string(),
        }),
        Some(status) => Err(RemoteError::NonZeroExit {
            command: command.to_string(),
            status,
            stdout,
            stderr,
        }),
        None => Err(RemoteError::Terminated {
            command: command.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn args_end_with_destination_and_command() {
        let client = SshClient::new(SshConfig::new("dokku.example.com"));
        let args = strings(client.args("apps:exists web"));

        assert_eq!(args[args.len() - 2], "dokku@dokku.example.com");
        assert_eq!(args[args.len() - 1], "apps:exists web");
        assert!(args.contains(&"BatchMode=yes".to_string()));
        assert!(args.contains(&"StrictHostKeyChecking=accept-new".to_string()));
    }

    #[test]
    fn args_include_port_and_identity() {
        let mut config = SshConfig::new("h");
        config.port = 2222;
        config.identity_file = Some(PathBuf::from("/keys/deploy"));
        config.strict_host_key_checking = true;

        let args = strings(SshClient::new(config).args("version"));

        let port_idx = args.iter().position(|a| a == "-p").unwrap();
        assert_eq!(args[port_idx + 1], "2222");
        let key_idx = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[key_idx + 1], "/keys/deploy");
        assert!(args.contains(&"StrictHostKeyChecking=yes".to_string()));
    }

    #[test]
    fn success_returns_stdout() {
        let out = interpret_exit("version", Some(0), "0.34.0\n".into(), String::new());
        assert_eq!(out.unwrap(), "0.34.0\n");
    }

    #[test]
    fn ssh_failure_is_connect_error() {
        let err = interpret_exit("version", Some(255), String::new(), "Connection refused\n".into())
            .unwrap_err();
        assert_eq!(
            err,
            RemoteError::Connect {
                reason: "Connection refused".into()
            }
        );
    }

    #[test]
    fn remote_failure_keeps_status_and_streams() {
        let err = interpret_exit(
            "apps:exists web",
            Some(20),
            String::new(),
            " !     App web does not exist\n".into(),
        )
        .unwrap_err();

        assert_eq!(err.exit_status(), Some(20));
        assert!(err.is_missing_app());
    }

    #[test]
    fn signal_is_terminated() {
        let err = interpret_exit("version", None, String::new(), String::new()).unwrap_err();
        assert!(matches!(err, RemoteError::Terminated { .. }));
    }

    #[test]
    fn missing_binary_is_connect_error() {
        let mut config = SshConfig::new("h");
        config.ssh_binary = PathBuf::from("/definitely/not/a/real/ssh");

        let err = SshClient::new(config).run("version").unwrap_err();
        assert!(matches!(err, RemoteError::Connect { .. }));
    }
}
