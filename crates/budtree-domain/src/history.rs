//! Timestamped snapshots of a budget tree.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::node::BudgetNode;

/// A saved version of the whole tree, recorded each time it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub budget: BudgetNode,
}

impl HistoryEntry {
    pub fn new(date: DateTime<Utc>, budget: BudgetNode) -> Self {
        Self { date, budget }
    }

    /// Stable key used to reference the entry (favorites, restore).
    pub fn key(&self) -> String {
        history_key(self.date)
    }
}

/// Formats a timestamp the way history entries are keyed.
pub fn history_key(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl NamedEntity for HistoryEntry {
    fn name(&self) -> &str {
        &self.budget.name
    }
}

impl Displayable for HistoryEntry {
    fn display_label(&self) -> String {
        format!("{} ({})", self.budget.name, self.date.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn key_is_rfc3339_with_millis() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        let entry = HistoryEntry::new(date, BudgetNode::default());
        assert_eq!(entry.key(), "2025-03-01T10:30:00.000Z");
        assert_eq!(entry.display_label(), "General budget (2025-03-01 10:30:00)");
    }
}
