//! Flat tabular export of a tree.

use budtree_domain::BudgetNode;
use serde::Serialize;

use crate::total::compute_total;

pub const CSV_HEADER: &str = "Level,Category,Amount,Total,Id";

/// One node in pre-order, with its depth below the root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub level: usize,
    pub name: String,
    /// Stored amount on leaves; `None` on internal nodes, whose amount is derived.
    pub amount: Option<f64>,
    pub total: f64,
    pub id: String,
}

pub fn flatten(root: &BudgetNode) -> Vec<ExportRow> {
    let mut rows = Vec::with_capacity(root.node_count());
    push_rows(root, 0, &mut rows);
    rows
}

fn push_rows(node: &BudgetNode, level: usize, rows: &mut Vec<ExportRow>) {
    rows.push(ExportRow {
        level,
        name: node.name.clone(),
        amount: node.is_leaf().then(|| node.numeric_amount()),
        total: compute_total(node),
        id: node.id.clone(),
    });
    for child in &node.children {
        push_rows(child, level + 1, rows);
    }
}

/// Renders the tree as CSV with a header row.
pub fn to_csv(root: &BudgetNode) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in flatten(root) {
        let amount = row.amount.map(|a| a.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            row.level,
            quote(&row.name),
            amount,
            row.total,
            quote(&row.id)
        ));
    }
    out
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
