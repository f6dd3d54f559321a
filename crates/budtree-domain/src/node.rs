//! The recursive budget category tree.

use serde::{Deserialize, Deserializer, Serialize};

use crate::amount;
use crate::common::*;

/// Identifier reserved for the root of every budget tree.
pub const ROOT_ID: &str = "1";

/// Label given to a freshly created root.
pub const DEFAULT_ROOT_NAME: &str = "General budget";

/// Placeholder label for categories created by `add_child`.
pub const DEFAULT_CHILD_NAME: &str = "New category";

/// One budget category and its subtree.
///
/// Leaf-ness is structural: a node is a leaf exactly when `children` is empty.
/// `amount` is only authoritative on leaves; on internal nodes it is dormant
/// and totals are always derived from the children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetNode {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "amount::deserialize_lenient")]
    pub amount: f64,
    #[serde(default, deserialize_with = "deserialize_children")]
    pub children: Vec<BudgetNode>,
}

impl BudgetNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            children: Vec::new(),
        }
    }

    /// Creates an empty tree: the sentinel root with no categories.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(ROOT_ID, name, 0.0)
    }

    pub fn with_children(mut self, children: Vec<BudgetNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: BudgetNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// The stored amount as a finite number; non-finite values read as `0.0`.
    pub fn numeric_amount(&self) -> f64 {
        amount::finite_or_zero(self.amount)
    }

    /// Pre-order traversal of this node and every descendant.
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Number of levels below this node; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

impl Default for BudgetNode {
    fn default() -> Self {
        Self::root(DEFAULT_ROOT_NAME)
    }
}

impl Identifiable for BudgetNode {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for BudgetNode {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for BudgetNode {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.name, self.id)
    }
}

/// Iterator returned by [`BudgetNode::walk`].
pub struct PreOrder<'a> {
    stack: Vec<&'a BudgetNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a BudgetNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn deserialize_children<'de, D>(deserializer: D) -> Result<Vec<BudgetNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<BudgetNode>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BudgetNode {
        BudgetNode::root("Budget").with_children(vec![
            BudgetNode::new("1.1", "Marketing", 0.0).with_children(vec![
                BudgetNode::new("1.1.1", "Ads", 500.0),
                BudgetNode::new("1.1.2", "Events", 300.0),
            ]),
            BudgetNode::new("1.2", "IT", 800.0),
        ])
    }

    #[test]
    fn walk_visits_nodes_in_pre_order() {
        let tree = sample();
        let ids: Vec<&str> = tree.walk().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "1.1", "1.1.1", "1.1.2", "1.2"]);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn leafness_is_structural() {
        let tree = sample();
        assert!(!tree.is_leaf());
        assert!(tree.children[1].is_leaf());
        assert!(tree.is_root());
    }

    #[test]
    fn deserializes_snapshots_with_missing_and_odd_fields() {
        let json = r#"{
            "id": "1",
            "name": "Budget",
            "amount": 0,
            "children": [
                { "id": "1.1", "name": "Ads", "amount": "500" },
                { "id": "1.2", "name": "Events", "amount": null, "children": null },
                { "id": "1.3", "name": "Travel", "amount": "lots" },
                { "id": "1.4", "name": "Misc" }
            ]
        }"#;
        let tree: BudgetNode = serde_json::from_str(json).expect("lenient snapshot");
        let amounts: Vec<f64> = tree.children.iter().map(|c| c.amount).collect();
        assert_eq!(amounts, vec![500.0, 0.0, 0.0, 0.0]);
        assert!(tree.children.iter().all(BudgetNode::is_leaf));
    }

    #[test]
    fn serializes_to_the_plain_record_shape() {
        let node = BudgetNode::new("1.1", "Ads", 12.5);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "1.1", "name": "Ads", "amount": 12.5, "children": [] })
        );
    }

    #[test]
    fn numeric_amount_masks_non_finite_values() {
        let node = BudgetNode::new("1.1", "Broken", f64::NAN);
        assert_eq!(node.numeric_amount(), 0.0);
    }
}
