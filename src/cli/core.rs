//! Dispatch, error reporting and shell context helpers.

use std::{io, path::PathBuf};

use budtree_config::{ConfigError, ConfigManager};
use budtree_core::{CoreError, SystemClock};
use budtree_storage_json::JsonBudgetStorage;
use chrono::Duration;
use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;

pub use crate::errors::CliError;
use crate::{
    errors::BudgetError,
    session::{BudgetSession, SessionSettings},
    utils::paths,
};

use super::commands;
use super::format::AmountFormat;
use super::help;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Largest suggestion distance still worth offering for a mistyped command.
const SUGGESTION_DISTANCE: usize = 3;

impl ShellContext {
    /// Context rooted at `$BUDGET_TREE_HOME` or `~/.budget_tree`.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, paths::app_home())
    }

    pub fn with_home(mode: CliMode, home: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(&home)?;
        let config = config_manager.load()?;
        output::set_preferences(OutputPreferences::from_config(&config));

        let data_root = config.resolve_data_root(&home);
        let storage =
            JsonBudgetStorage::with_retention(data_root.clone(), config.history_retention)?;
        let settings = SessionSettings {
            quiet_period: Duration::milliseconds(
                i64::try_from(config.autosave_quiet_ms).unwrap_or(i64::MAX),
            ),
            root_name: config.root_name.clone(),
        };
        let (session, report) =
            BudgetSession::open(Box::new(storage), Box::new(SystemClock), settings);
        tracing::debug!(data_root = %data_root.display(), "storage ready");

        for warning in &report.warnings {
            output::warning(warning);
        }
        if report.restored {
            output::info(format!(
                "Loaded `{}` ({} categories).",
                session.current().name,
                session.current().node_count() - 1
            ));
        }

        Ok(ShellContext {
            mode,
            registry,
            session,
            theme: ColorfulTheme::default(),
            amounts: AmountFormat::from_config(&config),
            config_manager,
            config,
            home,
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        let marker = if self.session.has_pending_save() { "*" } else { "" };
        format!("budget-tree{marker}> ")
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        let result = handler(self, args);
        self.autosave_if_due();
        tracing::trace!(command, status = %self.status(), "command dispatched");
        match result {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::handle_line(self, line)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= SUGGESTION_DISTANCE {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn print_help(&self, topic: Option<&str>) {
        match topic {
            Some(name) => match self.command(&name.to_lowercase()) {
                Some(entry) => help::print_command(entry),
                None => self.suggest_command(name),
            },
            None => help::print_overview(&self.registry),
        }
    }

    /// Asks before destructive actions; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        self.confirm("Exit shell?").map_err(CliError::from)
    }

    /// Saves pending edits whose quiet period has elapsed.
    pub(crate) fn autosave_if_due(&mut self) {
        if let Err(err) = self.session.tick() {
            output::warning(format!("Autosave failed: {err}"));
        }
    }

    /// Saves any pending edit before the shell exits.
    pub(crate) fn shutdown(&mut self) -> Result<(), CliError> {
        if self.session.flush()? {
            output::success("Changes saved.");
        }
        self.running = false;
        Ok(())
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager
            .save(&self.config)
            .map_err(CommandError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::info("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Io(err) if err.kind() == io::ErrorKind::BrokenPipe => Err(err.into()),
            other => {
                output::error(other.to_string());
                Ok(())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("No category with id `{0}`. Use `show` to list ids.")]
    UnknownCategory(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(err.into())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(err.into())
    }
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Command(message) => CommandError::InvalidArguments(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    home: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(CliMode::Script, home.to_path_buf())?;
    for line in lines {
        match app.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use budtree_core::compute_total;
    use tempfile::tempdir;

    #[test]
    fn script_edits_reach_the_session() {
        let dir = tempdir().unwrap();
        let app = process_script(
            dir.path(),
            &["add 1", "add 1", "set 1.1 500", "set 1.2 300", "rename 1.2 Operations"],
        )
        .unwrap();

        let tree = app.session.current();
        assert_eq!(compute_total(tree), 800.0);
        assert_eq!(tree.children[1].name, "Operations");
    }

    #[test]
    fn exit_flushes_pending_edits() {
        let dir = tempdir().unwrap();
        let mut app = process_script(dir.path(), &["add 1", "set 1.1 42"]).unwrap();
        app.shutdown().unwrap();

        let reopened = ShellContext::with_home(CliMode::Script, dir.path().to_path_buf()).unwrap();
        assert_eq!(compute_total(reopened.session.current()), 42.0);
    }

    #[test]
    fn unknown_commands_do_not_fail_the_script() {
        let dir = tempdir().unwrap();
        let mut app = process_script(dir.path(), &["shwo"]).unwrap();
        assert_eq!(app.process_line("exit").unwrap(), LoopControl::Exit);
    }

    #[test]
    fn bad_arguments_surface_as_errors() {
        let dir = tempdir().unwrap();
        let mut app = ShellContext::with_home(CliMode::Script, dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            app.process_line("set 1.1"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            app.process_line("history restore 4"),
            Err(CommandError::InvalidArguments(_))
        ));
    }
}
