use budtree_core::BreakdownProjector;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::render::{chart_bar_width, render_chart};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "chart",
        "Show how a category's total splits across its subcategories",
        "chart [id]",
        cmd_chart,
    )]
}

fn cmd_chart(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let node = match args.first() {
        Some(id) => context
            .session
            .find(id)
            .ok_or_else(|| CommandError::UnknownCategory(id.to_string()))?,
        None => context.session.current(),
    };
    let segments = BreakdownProjector::project(node);
    if segments.is_empty() {
        output::info(format!(
            "Nothing to chart: `{}` has no subcategories with a positive total.",
            node.name
        ));
        return Ok(());
    }

    let prefs = output::preferences();
    output::section(format!(
        "{} ({})",
        node.name,
        context.amounts.format(BreakdownProjector::grand_total(node))
    ));
    output::lines(render_chart(
        &segments,
        &context.amounts,
        prefs.theme,
        chart_bar_width(),
        prefs.use_color,
    ));
    Ok(())
}
