use budtree_core::{EditOutcome, IgnoreReason, TreeCommand};
use budtree_domain::amount::parse_lenient;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::render::render_tree;

use super::{ignored, required};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "show",
            "Show the tree, or the subtree under a category, with totals",
            "show [id]",
            cmd_show,
        ),
        CommandEntry::new(
            "add",
            "Add a new category under a parent",
            "add <parent-id>",
            cmd_add,
        ),
        CommandEntry::new(
            "rename",
            "Rename a category",
            "rename <id> <name...>",
            cmd_rename,
        ),
        CommandEntry::new(
            "set",
            "Set the amount of a category without subcategories",
            "set <id> <amount>",
            cmd_set,
        ),
        CommandEntry::new(
            "remove",
            "Remove a category and everything beneath it",
            "remove <id>",
            cmd_remove,
        ),
    ]
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let node = match args.first() {
        Some(id) => context
            .session
            .find(id)
            .ok_or_else(|| CommandError::UnknownCategory(id.to_string()))?,
        None => context.session.current(),
    };
    let lines = render_tree(node, &context.amounts, output::preferences().theme);
    output::lines(lines);
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parent = required(args, 0, "add <parent-id>")?;
    match context.session.apply(&TreeCommand::AddChild {
        parent_id: parent.to_string(),
    }) {
        EditOutcome::Created { id } => {
            output::success(format!("Added category {id} under {parent}."));
            Ok(())
        }
        EditOutcome::Applied => Ok(()),
        EditOutcome::Ignored(reason) => Err(ignored(reason, parent)),
    }
}

fn cmd_rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "rename <id> <name...>";
    let id = required(args, 0, usage)?;
    let name = args.get(1..).unwrap_or_default().join(" ");
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {usage}")));
    }
    match context.session.apply(&TreeCommand::Rename {
        id: id.to_string(),
        name: name.to_string(),
    }) {
        EditOutcome::Ignored(reason) => Err(ignored(reason, id)),
        _ => {
            output::success(format!("Renamed {id} to `{name}`."));
            Ok(())
        }
    }
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "set <id> <amount>";
    let id = required(args, 0, usage)?;
    let raw = required(args, 1, usage)?;
    let value = parse_lenient(raw);
    if value == 0.0 && !is_numeric(raw) {
        output::warning(format!("`{raw}` is not a number; using 0."));
    }
    match context.session.apply(&TreeCommand::SetAmount {
        id: id.to_string(),
        value,
    }) {
        EditOutcome::Ignored(reason) => Err(ignored(reason, id)),
        _ => {
            output::success(format!("{id} set to {}.", context.amounts.format(value)));
            Ok(())
        }
    }
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = required(args, 0, "remove <id>")?;
    let Some(node) = context.session.find(id) else {
        return Err(CommandError::UnknownCategory(id.to_string()));
    };
    if node.id == context.session.current().id {
        return Err(ignored(IgnoreReason::RootProtected, id));
    }
    let label = node.name.clone();
    let prompt = match node.node_count() - 1 {
        0 => format!("Remove `{label}`?"),
        count => format!("Remove `{label}` and its {count} subcategories?"),
    };
    if !context.confirm(&prompt)? {
        output::info("Nothing removed.");
        return Ok(());
    }
    match context.session.apply(&TreeCommand::Remove { id: id.to_string() }) {
        EditOutcome::Ignored(reason) => Err(ignored(reason, id)),
        _ => {
            output::success(format!("Removed `{label}` ({id})."));
            Ok(())
        }
    }
}

fn is_numeric(raw: &str) -> bool {
    raw.trim().parse::<f64>().map_or(false, f64::is_finite)
}
