use budtree_config::Config;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::format::AmountFormat;
use crate::cli::output::{self, OutputPreferences};
use crate::cli::registry::CommandEntry;

use super::required;

const USAGE: &str = "config [show|set <key> <value...>]";

/// Settings read once when the shell starts.
const STARTUP_KEYS: &[&str] = &[
    "autosave_quiet_ms",
    "history_retention",
    "root_name",
    "default_data_root",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|sub| sub.to_lowercase()).as_deref() {
        None | Some("show") => show(context),
        Some("set") => {
            let key = required(args, 1, USAGE)?;
            required(args, 2, USAGE)?;
            set(context, key, &args[2..].join(" "))
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}`; usage: {USAGE}"
        ))),
    }
}

fn show(context: &ShellContext) -> CommandResult {
    output::section("Preferences");
    let width = Config::KEYS.iter().map(|key| key.len()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(Config::KEYS.len() + 1);
    for key in Config::KEYS {
        lines.push(format!("  {key:<width$}  {}", context.config.get_value(key)?));
    }
    lines.push(format!(
        "  {:<width$}  {}",
        "config_file",
        context.config_manager.config_path().display()
    ));
    output::lines(lines);
    Ok(())
}

fn set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_lowercase();
    context.config.set_value(&key, value)?;
    context.persist_config()?;

    output::set_preferences(OutputPreferences::from_config(&context.config));
    context.amounts = AmountFormat::from_config(&context.config);
    output::success(format!("{key} = {}", context.config.get_value(&key)?));
    if STARTUP_KEYS.contains(&key.as_str()) {
        output::info("Takes effect the next time the shell starts.");
    }
    Ok(())
}
