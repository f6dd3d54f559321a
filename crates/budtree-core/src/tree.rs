//! Immutable structural edits over budget trees.
//!
//! Every operation takes the current root by reference and returns a new root;
//! the input is never touched. Edits address the first node whose id matches
//! in pre-order (root first, then children in order), which is also the node
//! [`find_node`] returns. Unknown ids are never an error: the edit simply has
//! no effect and the returned tree equals the input.

use std::fmt;

use budtree_domain::{amount::finite_or_zero, BudgetNode, DEFAULT_CHILD_NAME};
use serde::{Deserialize, Serialize};

/// A single edit, in the shape a UI event reducer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeCommand {
    SetAmount { id: String, value: f64 },
    Rename { id: String, name: String },
    AddChild { parent_id: String },
    Remove { id: String },
}

impl TreeCommand {
    /// Id the command addresses.
    pub fn target(&self) -> &str {
        match self {
            TreeCommand::SetAmount { id, .. }
            | TreeCommand::Rename { id, .. }
            | TreeCommand::Remove { id } => id,
            TreeCommand::AddChild { parent_id } => parent_id,
        }
    }
}

/// Whether an edit changed the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// A child was appended; carries the id it received.
    Created { id: String },
    Ignored(IgnoreReason),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, EditOutcome::Ignored(_))
    }
}

/// Why an edit left the tree unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotFound,
    /// Amounts of nodes with children are derived, never captured.
    NotALeaf,
    RootProtected,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IgnoreReason::NotFound => "no category with that id",
            IgnoreReason::NotALeaf => "category has subcategories; its amount is computed",
            IgnoreReason::RootProtected => "the root category cannot be removed",
        };
        f.write_str(label)
    }
}

/// Result of [`TreeService::apply`]: the next tree plus what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEdit {
    pub root: BudgetNode,
    pub outcome: EditOutcome,
}

impl TreeEdit {
    fn applied(root: BudgetNode) -> Self {
        Self {
            root,
            outcome: EditOutcome::Applied,
        }
    }

    fn ignored(root: &BudgetNode, reason: IgnoreReason) -> Self {
        tracing::debug!(root = %root.id, ?reason, "tree edit ignored");
        Self {
            root: root.clone(),
            outcome: EditOutcome::Ignored(reason),
        }
    }

    pub fn into_root(self) -> BudgetNode {
        self.root
    }
}

/// Stateless tree editing service.
pub struct TreeService;

impl TreeService {
    /// Applies `command` to `root`, reporting whether it took effect.
    pub fn apply(root: &BudgetNode, command: &TreeCommand) -> TreeEdit {
        match command {
            TreeCommand::SetAmount { id, value } => Self::set_leaf_amount(root, id, *value),
            TreeCommand::Rename { id, name } => Self::rename(root, id, name),
            TreeCommand::AddChild { parent_id } => Self::add_child(root, parent_id),
            TreeCommand::Remove { id } => Self::remove_subtree(root, id),
        }
    }

    pub fn set_leaf_amount(root: &BudgetNode, id: &str, value: f64) -> TreeEdit {
        let value = finite_or_zero(value);
        match edit_first(root, id, &mut |node| {
            node.is_leaf().then(|| BudgetNode {
                amount: value,
                ..node.clone()
            })
        }) {
            Visit::Replaced(next) => TreeEdit::applied(next),
            Visit::Unchanged => TreeEdit::ignored(root, IgnoreReason::NotALeaf),
            Visit::Missing => TreeEdit::ignored(root, IgnoreReason::NotFound),
        }
    }

    pub fn rename(root: &BudgetNode, id: &str, name: &str) -> TreeEdit {
        match edit_first(root, id, &mut |node| {
            Some(BudgetNode {
                id: node.id.clone(),
                name: name.to_string(),
                amount: node.amount,
                children: node.children.clone(),
            })
        }) {
            Visit::Replaced(next) => TreeEdit::applied(next),
            Visit::Unchanged | Visit::Missing => TreeEdit::ignored(root, IgnoreReason::NotFound),
        }
    }

    pub fn add_child(root: &BudgetNode, parent_id: &str) -> TreeEdit {
        let Some(parent) = find_node(root, parent_id) else {
            return TreeEdit::ignored(root, IgnoreReason::NotFound);
        };
        let child_id = fresh_child_id(root, parent);
        let mut created = None;
        let visit = edit_first(root, parent_id, &mut |node| {
            let mut children = node.children.clone();
            children.push(BudgetNode::new(child_id.clone(), DEFAULT_CHILD_NAME, 0.0));
            created = Some(child_id.clone());
            Some(BudgetNode {
                id: node.id.clone(),
                name: node.name.clone(),
                amount: node.amount,
                children,
            })
        });
        match (visit, created) {
            (Visit::Replaced(next), Some(id)) => {
                tracing::trace!(parent = parent_id, child = %id, "category added");
                TreeEdit {
                    root: next,
                    outcome: EditOutcome::Created { id },
                }
            }
            _ => TreeEdit::ignored(root, IgnoreReason::NotFound),
        }
    }

    pub fn remove_subtree(root: &BudgetNode, id: &str) -> TreeEdit {
        if root.id == id {
            return TreeEdit::ignored(root, IgnoreReason::RootProtected);
        }
        match remove_first(root, id) {
            Some(next) => TreeEdit::applied(next),
            None => TreeEdit::ignored(root, IgnoreReason::NotFound),
        }
    }
}

/// Depth-first search, root first, returning the first node with `id`.
pub fn find_node<'a>(root: &'a BudgetNode, id: &str) -> Option<&'a BudgetNode> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|child| find_node(child, id))
}

/// Returns `true` when any node in the tree carries `id`.
pub fn exists_node(root: &BudgetNode, id: &str) -> bool {
    root.id == id || root.children.iter().any(|child| exists_node(child, id))
}

/// Sets the amount of the leaf `id`; internal nodes and unknown ids are left alone.
pub fn set_leaf_amount(root: &BudgetNode, id: &str, value: f64) -> BudgetNode {
    TreeService::set_leaf_amount(root, id, value).into_root()
}

/// Renames node `id`, leaf or internal.
pub fn rename_node(root: &BudgetNode, id: &str, name: &str) -> BudgetNode {
    TreeService::rename(root, id, name).into_root()
}

/// Appends a placeholder leaf under `parent_id`.
pub fn add_child(root: &BudgetNode, parent_id: &str) -> BudgetNode {
    TreeService::add_child(root, parent_id).into_root()
}

/// Removes `id` and everything beneath it; the root itself is never removed.
pub fn remove_subtree(root: &BudgetNode, id: &str) -> BudgetNode {
    TreeService::remove_subtree(root, id).into_root()
}

enum Visit {
    Missing,
    /// The target was found but the edit declined to change it.
    Unchanged,
    Replaced(BudgetNode),
}

fn edit_first<F>(node: &BudgetNode, id: &str, edit: &mut F) -> Visit
where
    F: FnMut(&BudgetNode) -> Option<BudgetNode>,
{
    if node.id == id {
        return match edit(node) {
            Some(next) => Visit::Replaced(next),
            None => Visit::Unchanged,
        };
    }
    for (index, child) in node.children.iter().enumerate() {
        match edit_first(child, id, edit) {
            Visit::Missing => continue,
            Visit::Unchanged => return Visit::Unchanged,
            Visit::Replaced(next) => return Visit::Replaced(replace_child(node, index, next)),
        }
    }
    Visit::Missing
}

fn remove_first(node: &BudgetNode, id: &str) -> Option<BudgetNode> {
    for (index, child) in node.children.iter().enumerate() {
        if child.id == id {
            let mut children = Vec::with_capacity(node.children.len() - 1);
            children.extend_from_slice(&node.children[..index]);
            children.extend_from_slice(&node.children[index + 1..]);
            return Some(BudgetNode {
                id: node.id.clone(),
                name: node.name.clone(),
                amount: node.amount,
                children,
            });
        }
        if let Some(next) = remove_first(child, id) {
            return Some(replace_child(node, index, next));
        }
    }
    None
}

/// Rebuilds `node` with the child at `index` swapped for `next`.
fn replace_child(node: &BudgetNode, index: usize, next: BudgetNode) -> BudgetNode {
    let mut children = Vec::with_capacity(node.children.len());
    children.extend_from_slice(&node.children[..index]);
    children.push(next);
    children.extend_from_slice(&node.children[index + 1..]);
    BudgetNode {
        id: node.id.clone(),
        name: node.name.clone(),
        amount: node.amount,
        children,
    }
}

/// Positional id `{parent}.{len + 1}`, bumped past any id already in the tree.
///
/// Deleting an earlier sibling shrinks `len`, so the positional id alone can
/// collide with a surviving sibling.
fn fresh_child_id(root: &BudgetNode, parent: &BudgetNode) -> String {
    let mut ordinal = parent.children.len() + 1;
    loop {
        let candidate = format!("{}.{}", parent.id, ordinal);
        if !exists_node(root, &candidate) {
            return candidate;
        }
        ordinal += 1;
    }
}
