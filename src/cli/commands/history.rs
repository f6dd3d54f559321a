use budtree_config::Theme;
use budtree_core::HistorySummary;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::required;

const USAGE: &str = "history [list|restore <n>|favorite <n>|clear]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "history",
        "List, restore or pin saved versions of the budget",
        USAGE,
        cmd_history,
    )]
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    // Pending edits become the newest entry before anything is listed or replaced.
    context.session.flush()?;
    match args.first().map(|sub| sub.to_lowercase()).as_deref() {
        None | Some("list") => list(context),
        Some("restore") => restore(context, required(args, 1, USAGE)?),
        Some("favorite") | Some("fav") => favorite(context, required(args, 1, USAGE)?),
        Some("clear") => clear(context),
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown history action `{other}`; usage: {USAGE}"
        ))),
    }
}

fn list(context: &ShellContext) -> CommandResult {
    let view = context.session.history_view()?;
    if view.is_empty() {
        output::info("No saved versions yet.");
        return Ok(());
    }
    let star = match output::preferences().theme {
        Theme::Iconic => "★",
        Theme::Plain => "*",
    };
    output::section("Saved versions");
    output::lines(view.iter().enumerate().map(|(index, entry)| {
        format!(
            "{:>3}. {} {}  {}  {}  ({} categories)",
            index + 1,
            if entry.favorite { star } else { " " },
            entry.date.format("%Y-%m-%d %H:%M:%S"),
            entry.name,
            context.amounts.format(entry.total),
            entry.top_level_categories
        )
    }));
    Ok(())
}

/// Entry `n` (1-based) of the favorites-first listing.
fn select(context: &ShellContext, raw: &str) -> Result<HistorySummary, CommandError> {
    let view = context.session.history_view()?;
    let position = raw
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=view.len()).contains(n))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "`{raw}` is not an entry number; run `history` to list {} saved versions",
                view.len()
            ))
        })?;
    Ok(view[position - 1].clone())
}

fn restore(context: &mut ShellContext, raw: &str) -> CommandResult {
    let entry = select(context, raw)?;
    let prompt = format!(
        "Replace the current budget with the version from {}?",
        entry.date.format("%Y-%m-%d %H:%M")
    );
    if !context.confirm(&prompt)? {
        output::info("Nothing restored.");
        return Ok(());
    }
    let restored = context.session.restore(&entry.key)?;
    output::success(format!(
        "Restored `{}` from {}.",
        restored.name,
        entry.date.format("%Y-%m-%d %H:%M:%S")
    ));
    Ok(())
}

fn favorite(context: &mut ShellContext, raw: &str) -> CommandResult {
    let entry = select(context, raw)?;
    if context.session.toggle_favorite(&entry.key)? {
        output::success(format!("Pinned version {}.", entry.key));
    } else {
        output::success(format!("Unpinned version {}.", entry.key));
    }
    Ok(())
}

fn clear(context: &mut ShellContext) -> CommandResult {
    if !context.confirm("Delete all saved versions?")? {
        output::info("History kept.");
        return Ok(());
    }
    context.session.clear_history()?;
    output::success("History cleared.");
    Ok(())
}
