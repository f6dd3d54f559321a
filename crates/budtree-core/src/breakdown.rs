//! Chart projection of a node's direct children.

use budtree_domain::{BudgetNode, HslColor, Segment};

use crate::total::compute_total;

/// Degrees between consecutive segment hues.
pub const GOLDEN_ANGLE: f64 = 137.508;
pub const SEGMENT_SATURATION: u8 = 72;
pub const SEGMENT_LIGHTNESS: u8 = 52;

/// Color of the `index`-th child, by its position among all children.
pub fn color_for_index(index: usize) -> HslColor {
    let hue = (index as f64 * GOLDEN_ANGLE) % 360.0;
    HslColor::new(hue, SEGMENT_SATURATION, SEGMENT_LIGHTNESS)
}

/// Whole-percent share of `value` in `grand_total`; zero when there is nothing to share.
pub fn percent_of(value: f64, grand_total: f64) -> u32 {
    if grand_total <= 0.0 || !grand_total.is_finite() || value <= 0.0 {
        return 0;
    }
    let percent = (value / grand_total * 100.0).round();
    if percent.is_finite() {
        percent as u32
    } else {
        0
    }
}

pub struct BreakdownProjector;

impl BreakdownProjector {
    /// Segments for the children of `node` whose total is strictly positive.
    ///
    /// Colors follow the child's original position, so filtering out a
    /// zero-valued sibling does not shift the colors of the others.
    pub fn project(node: &BudgetNode) -> Vec<Segment> {
        let grand_total = Self::grand_total(node);
        node.children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| {
                let value = compute_total(child);
                (value > 0.0).then(|| Segment {
                    key: child.id.clone(),
                    label: child.name.clone(),
                    value,
                    percent: percent_of(value, grand_total),
                    color: color_for_index(index),
                })
            })
            .collect()
    }

    /// Total of `node`, the denominator for segment percentages.
    pub fn grand_total(node: &BudgetNode) -> f64 {
        compute_total(node)
    }
}

/// Projects the breakdown of `node`.
pub fn project(node: &BudgetNode) -> Vec<Segment> {
    BreakdownProjector::project(node)
}
