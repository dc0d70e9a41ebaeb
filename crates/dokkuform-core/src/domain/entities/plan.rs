use std::fmt;

use crate::domain::{entities::command::DokkuCommand, value_objects::AppName};

/// What a plan does to the app as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    Create,
    Update,
    Delete,
    Noop,
}

impl PlanAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Noop => "no changes",
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered list of mutating commands that converges one app.
///
/// Invariant: `commands` is empty exactly when `action` is `Noop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    app: AppName,
    action: PlanAction,
    commands: Vec<DokkuCommand>,
}

impl Plan {
    /// Build a plan. An empty command list always yields a `Noop` plan.
    pub fn new(app: AppName, action: PlanAction, commands: Vec<DokkuCommand>) -> Self {
        let action = if commands.is_empty() {
            PlanAction::Noop
        } else {
            action
        };
        Self {
            app,
            action,
            commands,
        }
    }

    pub fn noop(app: AppName) -> Self {
        Self::new(app, PlanAction::Noop, Vec::new())
    }

    /// Name of the app once the plan has been applied.
    pub fn app(&self) -> &AppName {
        &self.app
    }

    pub fn action(&self) -> PlanAction {
        self.action
    }

    pub fn commands(&self) -> &[DokkuCommand] {
        &self.commands
    }

    pub fn is_noop(&self) -> bool {
        self.action == PlanAction::Noop
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.app, self.action)?;
        for command in &self.commands {
            writeln!(f, "  {command}")?;
        }
        Ok(())
    }
}
