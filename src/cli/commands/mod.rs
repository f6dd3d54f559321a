pub mod chart;
pub mod config;
pub mod data;
pub mod history;
pub mod system;
pub mod tree;

use budtree_core::IgnoreReason;

use crate::cli::core::CommandError;
use crate::cli::registry::{CommandEntry, CommandRegistry};

const ROOT_COMMAND_ORDER: &[&str] = &[
    "show", "chart", "add", "rename", "set", "remove", "history", "save", "reset", "export",
    "config", "help", "version", "exit",
];

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(tree::definitions());
    commands.extend(chart::definitions());
    commands.extend(history::definitions());
    commands.extend(data::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let mut entries = all_entries();
    entries.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| entry.name.eq_ignore_ascii_case(name))
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    for entry in entries {
        registry.register(entry);
    }
}

/// Positional argument `index`, or a usage error.
pub(crate) fn required<'a>(
    args: &[&'a str],
    index: usize,
    usage: &str,
) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}

/// Turns an edit that had no effect into the error shown to the user.
pub(crate) fn ignored(reason: IgnoreReason, id: &str) -> CommandError {
    match reason {
        IgnoreReason::NotFound => CommandError::UnknownCategory(id.to_string()),
        other => CommandError::InvalidArguments(format!("`{id}`: {other}.")),
    }
}
