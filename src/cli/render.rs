//! Text renderings of the tree and of breakdown charts.

use budtree_config::Theme;
use budtree_core::TotalCalculator;
use budtree_domain::{BudgetNode, Displayable, Segment};
use colored::Colorize;

use super::format::AmountFormat;

const DEFAULT_BAR_WIDTH: usize = 30;
const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;
/// Columns reserved for label, amount and percent next to a bar.
const CHART_LABEL_COLUMNS: u16 = 44;

/// Renders `root` and its descendants, one line per node, with totals.
pub fn render_tree(root: &BudgetNode, format: &AmountFormat, theme: Theme) -> Vec<String> {
    let totals = TotalCalculator::totals_by_id(root);
    let mut lines = Vec::with_capacity(totals.len());
    let total_of = |node: &BudgetNode| totals.get(&node.id).copied().unwrap_or_default();

    lines.push(format!("{}  {}", root.display_label(), format.format(total_of(root))));
    let mut stack: Vec<(&BudgetNode, String, bool)> = root
        .children
        .iter()
        .enumerate()
        .rev()
        .map(|(index, child)| (child, String::new(), index + 1 == root.children.len()))
        .collect();

    while let Some((node, prefix, last)) = stack.pop() {
        let (branch, continuation) = match (theme, last) {
            (Theme::Iconic, true) => ("└── ", "    "),
            (Theme::Iconic, false) => ("├── ", "│   "),
            (Theme::Plain, _) => ("- ", "  "),
        };
        let indent = match theme {
            Theme::Plain => "  ",
            Theme::Iconic => "",
        };
        lines.push(format!(
            "{prefix}{indent}{branch}{}  {}",
            node.display_label(),
            format.format(total_of(node))
        ));
        let child_prefix = format!("{prefix}{indent}{continuation}");
        let count = node.children.len();
        for (index, child) in node.children.iter().enumerate().rev() {
            stack.push((child, child_prefix.clone(), index + 1 == count));
        }
    }
    lines
}

/// Bar width that fits the current terminal.
pub fn chart_bar_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols.saturating_sub(CHART_LABEL_COLUMNS)))
        .map(|width| width.clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH))
        .unwrap_or(DEFAULT_BAR_WIDTH)
}

/// One line per segment: a bar scaled to its percent, then label, value and percent.
pub fn render_chart(
    segments: &[Segment],
    format: &AmountFormat,
    theme: Theme,
    bar_width: usize,
    use_color: bool,
) -> Vec<String> {
    let label_width = segments
        .iter()
        .map(|segment| segment.label.chars().count())
        .max()
        .unwrap_or(0);
    let glyph = match theme {
        Theme::Iconic => "█",
        Theme::Plain => "#",
    };

    segments
        .iter()
        .map(|segment| {
            let filled = bar_length(segment.percent, bar_width);
            let bar = glyph.repeat(filled);
            let bar = if use_color {
                let (r, g, b) = segment.color.to_rgb();
                bar.truecolor(r, g, b).to_string()
            } else {
                bar
            };
            format!(
                "{bar}{pad} {label:<label_width$}  {value:>12}  {percent:>3}%",
                pad = " ".repeat(bar_width.saturating_sub(filled)),
                label = segment.label,
                value = format.format(segment.value),
                percent = segment.percent,
            )
        })
        .collect()
}

/// Positive segments always get at least one cell.
fn bar_length(percent: u32, bar_width: usize) -> usize {
    let scaled = (f64::from(percent) / 100.0 * bar_width as f64).round() as usize;
    scaled.clamp(1, bar_width.max(1))
}
