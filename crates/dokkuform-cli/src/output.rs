//! Everything the commands write to stdout goes through [`OutputManager`].

use std::io::{self, IsTerminal};
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use dokkuform_core::domain::{Plan, PlanAction};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

/// Resolved output settings plus the stdout handle.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // The flag wins; an explicit format in the config file comes next.
        let requested = match args.output_format {
            OutputFormat::Auto => config
                .output
                .format
                .parse()
                .unwrap_or(OutputFormat::Auto),
            explicit => explicit,
        };

        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    /// Plain line; dropped with `--quiet`.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.status('\u{2713}', msg, |s| s.green().bold().to_string())
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.status('\u{26a0}', msg, |s| s.yellow().bold().to_string())
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.status('\u{2139}', msg, |s| s.blue().bold().to_string())
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(&self.paint(text, |s| s.cyan().bold().to_string()))
    }

    /// `<symbol> <msg>`, with the whole line styled when colors are on.
    fn status(&self, symbol: char, msg: &str, style: fn(&str) -> String) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(&self.paint(&format!("{symbol} {msg}"), style))
    }

    fn paint(&self, text: &str, style: fn(&str) -> String) -> String {
        if self.no_color { text.to_owned() } else { style(text) }
    }

    /// One plan: a marker line with the resource id, then its commands.
    pub fn plan(&self, id: &str, plan: &Plan) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let marker = action_marker(plan.action());
        let title = if id == plan.app().as_str() {
            format!("{marker} {} ({})", plan.app(), plan.action())
        } else {
            format!("{marker} {} [{}] ({})", plan.app(), id, plan.action())
        };

        let style: fn(&str) -> String = match plan.action() {
            PlanAction::Create => |s| s.green().bold().to_string(),
            PlanAction::Update => |s| s.yellow().bold().to_string(),
            PlanAction::Delete => |s| s.red().bold().to_string(),
            PlanAction::Noop => |s| s.dimmed().to_string(),
        };
        self.term.write_line(&self.paint(&title, style))?;

        for command in plan.commands() {
            self.term.write_line(&format!("    {command}"))?;
        }
        Ok(())
    }

    /// Pretty JSON on stdout.  Written even in quiet mode: the caller asked
    /// for machine-readable output.
    pub fn json<T: Serialize>(&self, value: &T) -> CliResult<()> {
        let rendered = serde_json::to_string_pretty(value).map_err(|e| CliError::IoError {
            message: "failed to render JSON".into(),
            source: e.into(),
        })?;
        self.term.write_line(&rendered)?;
        Ok(())
    }

    /// Progress bar for `len` remote commands; hidden unless interactive.
    pub fn progress(&self, len: usize) -> ProgressBar {
        if self.quiet || self.resolved_format != OutputFormat::Human {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template("{spinner} {prefix} [{pos}/{len}] {wide_msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }

    /// Ask the user to confirm `prompt`.
    ///
    /// Fails with [`CliError::ConfirmationRequired`] when stdin is not a
    /// terminal, so scripts must pass `--yes`.
    pub fn confirm(&self, prompt: &str) -> CliResult<bool> {
        if !io::stdin().is_terminal() {
            return Err(CliError::ConfirmationRequired);
        }
        prompt_confirm(prompt)
    }

    /// Commands print a JSON document instead of text.
    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }
}

fn action_marker(action: PlanAction) -> &'static str {
    match action {
        PlanAction::Create => "+",
        PlanAction::Update => "~",
        PlanAction::Delete => "-",
        PlanAction::Noop => "=",
    }
}

#[cfg(feature = "interactive")]
fn prompt_confirm(prompt: &str) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation".into(),
            source: io::Error::other(e.to_string()),
        })
}

#[cfg(not(feature = "interactive"))]
fn prompt_confirm(prompt: &str) -> CliResult<bool> {
    use std::io::Write;

    print!("{prompt} [y/N] ");
    io::stdout().flush().map_err(|e| CliError::IoError {
        message: "failed to flush stdout".into(),
        source: e,
    })?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: e,
        })?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input == "y" || input == "yes")
}

// ── tests ─────────────────────────────────────────────────────────────────────
