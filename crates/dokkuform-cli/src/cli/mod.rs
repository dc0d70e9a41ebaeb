//! Command-line surface of `dokkuform`.
//!
//! Parsing only; each subcommand's args struct is handed to the matching
//! module under `commands`.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name    = "dokkuform",
    bin_name = "dokkuform",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Declarative app management for Dokku hosts",
    long_about = "dokkuform reads a manifest of Dokku apps, compares it with \
                  what the host reports over ssh, and runs only the commands \
                  needed to converge.",
    after_help = "EXAMPLES:\n\
        \x20 dokkuform plan\n\
        \x20 dokkuform apply --yes\n\
        \x20 dokkuform show web --host dokku.example.com\n\
        \x20 dokkuform completions bash > /usr/share/bash-completion/completions/dokkuform",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the commands that would converge the host.
    #[command(
        visible_alias = "p",
        about = "Show what apply would change",
        after_help = "EXAMPLES:\n\
            \x20 dokkuform plan\n\
            \x20 dokkuform plan --app web\n\
            \x20 dokkuform plan --prune --output-format json"
    )]
    Plan(PlanArgs),

    /// Converge the host to the manifest.
    #[command(
        about = "Apply the manifest to the host",
        after_help = "EXAMPLES:\n\
            \x20 dokkuform apply\n\
            \x20 dokkuform apply --app web --yes\n\
            \x20 dokkuform apply --prune"
    )]
    Apply(ApplyArgs),

    /// Print an app as the host reports it.
    #[command(
        about = "Show the remote state of an app",
        after_help = "EXAMPLES:\n\
            \x20 dokkuform show web\n\
            \x20 dokkuform show web --output-format json"
    )]
    Show(ShowArgs),

    /// Destroy an app and forget its record.
    #[command(
        about = "Destroy an app on the host",
        after_help = "EXAMPLES:\n\
            \x20 dokkuform destroy web\n\
            \x20 dokkuform destroy web --yes"
    )]
    Destroy(DestroyArgs),

    /// Initialise a dokkuform configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 dokkuform init\n\
            \x20 dokkuform init --force\n\
            \x20 dokkuform --config ./dokkuform.config.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 dokkuform completions bash > ~/.local/share/bash-completion/completions/dokkuform\n\
            \x20 dokkuform completions zsh  > ~/.zfunc/_dokkuform\n\
            \x20 dokkuform completions fish > ~/.config/fish/completions/dokkuform.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the dokkuform configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 dokkuform config get host.address\n\
            \x20 dokkuform config list\n\
            \x20 dokkuform config path"
    )]
    Config(ConfigCommands),
}

// ── plan / apply ──────────────────────────────────────────────────────────────

/// Arguments for `dokkuform plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Restrict to one manifest entry.
    #[arg(short = 'a', long = "app", value_name = "ID", help = "Only plan this app")]
    pub app: Option<String>,

    /// Include recorded apps that are no longer in the manifest.
    #[arg(long = "prune", help = "Plan destruction of apps removed from the manifest")]
    pub prune: bool,
}

/// Arguments for `dokkuform apply`.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Restrict to one manifest entry.
    #[arg(short = 'a', long = "app", value_name = "ID", help = "Only apply this app")]
    pub app: Option<String>,

    /// Destroy recorded apps that are no longer in the manifest.
    #[arg(long = "prune", help = "Destroy apps removed from the manifest")]
    pub prune: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Apply without asking for confirmation")]
    pub yes: bool,
}

// ── show / destroy ────────────────────────────────────────────────────────────

/// Arguments for `dokkuform show`.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// App name on the host.
    #[arg(value_name = "NAME", help = "App name on the host")]
    pub name: String,
}

/// Arguments for `dokkuform destroy`.
#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Manifest id, recorded id, or app name.
    #[arg(value_name = "ID", help = "App to destroy")]
    pub id: String,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Destroy without asking for confirmation")]
    pub yes: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `dokkuform init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `dokkuform completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `dokkuform config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `host.address`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
