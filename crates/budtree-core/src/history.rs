//! History listing: favorites-first ordering and per-entry summaries.

use budtree_domain::{BudgetNode, HistoryEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::total::compute_total;

/// What the history list shows for one saved snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub key: String,
    pub date: DateTime<Utc>,
    pub name: String,
    pub total: f64,
    /// Number of direct children of the snapshot's root.
    pub top_level_categories: usize,
    pub favorite: bool,
}

pub struct HistoryService;

impl HistoryService {
    /// Favorites first, in history order, then the rest in history order.
    pub fn order_with_favorites(history: &[HistoryEntry], favorites: &[String]) -> Vec<HistoryEntry> {
        let (mut pinned, rest): (Vec<_>, Vec<_>) = history
            .iter()
            .cloned()
            .partition(|entry| favorites.contains(&entry.key()));
        pinned.extend(rest);
        pinned
    }

    pub fn summarize(entry: &HistoryEntry, favorite: bool) -> HistorySummary {
        HistorySummary {
            key: entry.key(),
            date: entry.date,
            name: entry.budget.name.clone(),
            total: compute_total(&entry.budget),
            top_level_categories: entry.budget.children.len(),
            favorite,
        }
    }

    /// Ordered summaries for the whole history.
    pub fn summaries(history: &[HistoryEntry], favorites: &[String]) -> Vec<HistorySummary> {
        Self::order_with_favorites(history, favorites)
            .iter()
            .map(|entry| {
                let favorite = favorites.contains(&entry.key());
                Self::summarize(entry, favorite)
            })
            .collect()
    }

    /// Looks up the snapshot recorded under `key`.
    pub fn find<'a>(history: &'a [HistoryEntry], key: &str) -> Option<&'a BudgetNode> {
        history
            .iter()
            .find(|entry| entry.key() == key)
            .map(|entry| &entry.budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(minute: u32, name: &str) -> HistoryEntry {
        let date = Utc.with_ymd_and_hms(2025, 2, 1, 8, minute, 0).unwrap();
        HistoryEntry::new(
            date,
            BudgetNode::root(name).with_child(BudgetNode::new("1.1", "Rent", 900.0)),
        )
    }

    #[test]
    fn favorites_move_to_front_keeping_relative_order() {
        let history = vec![entry(3, "c"), entry(2, "b"), entry(1, "a")];
        let favorites = vec![history[2].key(), history[1].key()];
        let names: Vec<String> = HistoryService::order_with_favorites(&history, &favorites)
            .into_iter()
            .map(|e| e.budget.name)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn summary_reports_total_and_top_level_count() {
        let history = vec![entry(0, "only")];
        let summaries = HistoryService::summaries(&history, &[]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total, 900.0);
        assert_eq!(summaries[0].top_level_categories, 1);
        assert!(!summaries[0].favorite);
        assert!(HistoryService::find(&history, &summaries[0].key).is_some());
    }
}
