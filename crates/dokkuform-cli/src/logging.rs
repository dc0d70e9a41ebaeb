//! Logging setup for the binary.
//!
//! Events go to stderr at a level picked from the flags: `--quiet` gives
//! `error`, no flag `warn`, then `-v` info, `-vv` debug (every remote
//! command) and `-vvv` trace. `RUST_LOG` replaces that filter entirely.
//! When `logging.file` is set the same events are also appended there.

use std::io::IsTerminal as _;
use std::path::Path;

use anyhow::Context as _;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{cli::GlobalArgs, config::LoggingConfig};

/// Crates whose events are shown.
const CRATES: [&str; 3] = ["dokkuform", "dokkuform_core", "dokkuform_adapters"];

/// Install the global subscriber. Call once from `main`; keep the returned
/// guard alive or buffered file lines are lost.
pub fn init_logging(
    args: &GlobalArgs,
    logging: &LoggingConfig,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level = derive_level(args);

    // RUST_LOG wins; otherwise every dokkuform crate gets the same level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let use_ansi = !args.no_color && std::io::stderr().is_terminal();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let (layer, guard) = file_layer(path, logging.json)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // The boxed file layer is typed against the bare registry, so it goes first.
    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already set: {e}"))?;

    Ok(guard)
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Non-blocking appender writing to `path`, plain text or JSON lines.
fn file_layer(path: &Path, json: bool) -> anyhow::Result<(BoxedLayer, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path '{}' has no file name", path.display()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory '{}'", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };

    Ok((layer, guard))
}

fn filter_directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Level name for the stderr filter.
fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn args_with(verbose: u8, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            no_color: true,
            config: None,
            host: None,
            manifest: None,
            state: None,
            output_format: OutputFormat::Auto,
        }
    }

    #[test]
    fn flags_pick_the_stderr_level() {
        let cases = [
            (0, false, "warn"),
            (1, false, "info"),
            (2, false, "debug"),
            (3, false, "trace"),
            (9, false, "trace"),
            (0, true, "error"),
            (3, true, "error"),
        ];
        for (verbose, quiet, expected) in cases {
            assert_eq!(derive_level(&args_with(verbose, quiet)), expected, "-v x{verbose} quiet={quiet}");
        }
    }

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            filter_directives("debug"),
            "dokkuform=debug,dokkuform_core=debug,dokkuform_adapters=debug"
        );
    }

    #[test]
    fn file_layer_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs/dokkuform.log");

        let (_layer, _guard) = file_layer(&path, false).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
