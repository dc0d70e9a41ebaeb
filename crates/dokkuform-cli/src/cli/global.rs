//! Flags accepted by every subcommand.
//!
//! The host, manifest and state flags override the matching config keys
//! after the config layers have been merged.

use clap::{ArgAction, Args, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Log more; repeat for more detail.
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        long_help = "Log more; repeat for more detail:
    (none)  warnings and errors
    -v      plan and apply milestones
    -vv     every remote command and its output
    -vvv    everything"
    )]
    pub verbose: u8,

    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Never emit ANSI colors. Also set by `NO_COLOR` with any value but a
    /// false one such as `0` or `false`.
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Config file to use instead of the per-user one.
    #[arg(short, long, global = true, env = "DOKKUFORM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dokku host to connect to (overrides host.address).
    #[arg(short = 'H', long, global = true, value_name = "HOST")]
    pub host: Option<String>,

    /// Manifest declaring the apps (overrides paths.manifest).
    #[arg(short, long, global = true, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// State file recording what was last applied (overrides paths.state).
    #[arg(long, global = true, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// How results are printed.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human when stdout is a terminal, plain otherwise.
    #[default]
    Auto,
    /// Colored, with spinners.
    Human,
    /// Uncolored text for pipes and logs.
    Plain,
    /// One JSON document on stdout.
    Json,
}

/// Lets `output.format` in the config file use the same names as the flag.
impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
