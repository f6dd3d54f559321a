//! Bottom-up totals.
//!
//! Totals follow the children-only rule: a leaf contributes its own amount,
//! an internal node contributes the sum of its children and nothing else.
//! Whatever amount an internal node still stores is dormant.

use std::collections::HashMap;

use budtree_domain::{amount::finite_or_zero, BudgetNode};

/// Stateless entry point for total computations.
pub struct TotalCalculator;

impl TotalCalculator {
    /// Aggregate value of `node`. Always finite.
    pub fn total(node: &BudgetNode) -> f64 {
        compute_total(node)
    }

    /// Totals of every node in the tree, keyed by id, in a single pass.
    ///
    /// When a restored snapshot carries duplicate ids the first node computed
    /// keeps the slot.
    pub fn totals_by_id(root: &BudgetNode) -> HashMap<String, f64> {
        let mut totals = HashMap::with_capacity(root.node_count());
        collect_totals(root, &mut totals);
        totals
    }
}

/// Computes the aggregate value of `node`.
pub fn compute_total(node: &BudgetNode) -> f64 {
    if node.is_leaf() {
        return node.numeric_amount();
    }
    finite_or_zero(node.children.iter().map(compute_total).sum())
}

fn collect_totals(node: &BudgetNode, totals: &mut HashMap<String, f64>) -> f64 {
    let total = if node.is_leaf() {
        node.numeric_amount()
    } else {
        let mut sum = 0.0;
        for child in &node.children {
            sum += collect_totals(child, totals);
        }
        finite_or_zero(sum)
    };
    totals.entry(node.id.clone()).or_insert(total);
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_total_is_its_amount() {
        assert_eq!(compute_total(&BudgetNode::new("1.1", "Ads", 125.5)), 125.5);
        assert_eq!(compute_total(&BudgetNode::new("1.1", "Ads", -40.0)), -40.0);
        assert_eq!(compute_total(&BudgetNode::new("1.1", "Ads", f64::NAN)), 0.0);
    }

    #[test]
    fn internal_amount_is_dormant() {
        // Children-only: the parent's stored 200 is never added.
        let tree = BudgetNode::new("1.2", "IT", 200.0)
            .with_child(BudgetNode::new("1.2.1", "Infrastructure", 800.0));
        assert_eq!(compute_total(&tree), 800.0);
    }

    #[test]
    fn overflowing_sums_stay_finite() {
        let tree = BudgetNode::root("Budget").with_children(vec![
            BudgetNode::new("1.1", "A", f64::MAX),
            BudgetNode::new("1.2", "B", f64::MAX),
        ]);
        assert!(compute_total(&tree).is_finite());
    }

    #[test]
    fn totals_by_id_covers_every_node() {
        let tree = BudgetNode::root("Budget").with_children(vec![
            BudgetNode::new("1.1", "Marketing", 0.0).with_children(vec![
                BudgetNode::new("1.1.1", "Ads", 500.0),
                BudgetNode::new("1.1.2", "Events", 300.0),
            ]),
            BudgetNode::new("1.2", "IT", 800.0),
        ]);
        let totals = TotalCalculator::totals_by_id(&tree);
        assert_eq!(totals.len(), 5);
        assert_eq!(totals["1"], 1600.0);
        assert_eq!(totals["1.1"], 800.0);
        assert_eq!(totals["1.1.2"], 300.0);
        assert_eq!(TotalCalculator::total(&tree), totals["1"]);
    }
}
