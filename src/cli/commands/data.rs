use std::fs;
use std::path::Path;

use budtree_core::export::{flatten, to_csv};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::required;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("save", "Save the budget now", "save", cmd_save),
        CommandEntry::new(
            "reset",
            "Start over from an empty budget; --wipe also erases saved history",
            "reset [--wipe]",
            cmd_reset,
        ),
        CommandEntry::new(
            "export",
            "Write the tree to a CSV file",
            "export <path>",
            cmd_export,
        ),
    ]
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.save_now()?;
    output::success("Budget saved.");
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let wipe = match args.first().copied() {
        None => false,
        Some("--wipe") => true,
        Some(other) => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown reset option `{other}`; usage: reset [--wipe]"
            )))
        }
    };
    let question = if wipe {
        "Erase the budget and every saved version?"
    } else {
        "Discard every category and start over?"
    };
    if !context.confirm(question)? {
        output::info("Budget kept.");
        return Ok(());
    }
    if wipe {
        context.session.wipe()?;
        output::success("Budget and saved versions erased.");
    } else {
        context.session.reset();
        output::success("Started a new budget.");
    }
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = Path::new(required(args, 0, "export <path>")?);
    let tree = context.session.current();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_csv(tree))?;
    output::success(format!(
        "Exported {} rows to {}.",
        flatten(tree).len(),
        path.display()
    ));
    Ok(())
}
