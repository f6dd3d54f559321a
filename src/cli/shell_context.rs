//! Shared runtime state for CLI interactions and command execution.

use std::path::PathBuf;

use budtree_config::{Config, ConfigManager};
use dialoguer::theme::ColorfulTheme;

use crate::session::BudgetSession;

use super::{format::AmountFormat, registry::CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub session: BudgetSession,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub amounts: AmountFormat,
    /// Application home holding `config/` and, by default, `data/`.
    pub home: PathBuf,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, pending_save: {} }}",
            self.running,
            self.last_command,
            self.session.has_pending_save()
        )
    }
}
