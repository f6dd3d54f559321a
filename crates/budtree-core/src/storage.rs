use std::{collections::HashSet, sync::Mutex};

use budtree_domain::{BudgetNode, HistoryEntry, ROOT_ID};
use chrono::{DateTime, Duration, Utc};

use crate::CoreError;

/// Abstraction over backends that persist the current tree, its history and favorites.
///
/// Loading reports "nothing stored yet" as `Ok(None)`; only genuine backend
/// failures surface as errors.
pub trait BudgetStorage: Send + Sync {
    /// Persists `root` as current and prepends a history entry stamped `at`.
    fn save(&self, root: &BudgetNode, at: DateTime<Utc>) -> Result<HistoryEntry, CoreError>;
    fn load(&self) -> Result<Option<BudgetNode>, CoreError>;
    /// Replaces the current tree without recording history.
    fn restore(&self, root: &BudgetNode) -> Result<(), CoreError>;
    /// Saved snapshots, most recent first.
    fn history(&self) -> Result<Vec<HistoryEntry>, CoreError>;
    fn clear_history(&self) -> Result<(), CoreError>;
    fn favorites(&self) -> Result<Vec<String>, CoreError>;
    /// Adds `key` to the front of the favorites or removes it; returns the new state.
    fn toggle_favorite(&self, key: &str) -> Result<bool, CoreError>;
    fn clear_favorites(&self) -> Result<(), CoreError>;
    /// Forgets the current tree and its history. Favorites are kept.
    fn clear(&self) -> Result<(), CoreError>;
}

impl<S: BudgetStorage + ?Sized> BudgetStorage for std::sync::Arc<S> {
    fn save(&self, root: &BudgetNode, at: DateTime<Utc>) -> Result<HistoryEntry, CoreError> {
        (**self).save(root, at)
    }

    fn load(&self) -> Result<Option<BudgetNode>, CoreError> {
        (**self).load()
    }

    fn restore(&self, root: &BudgetNode) -> Result<(), CoreError> {
        (**self).restore(root)
    }

    fn history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        (**self).history()
    }

    fn clear_history(&self) -> Result<(), CoreError> {
        (**self).clear_history()
    }

    fn favorites(&self) -> Result<Vec<String>, CoreError> {
        (**self).favorites()
    }

    fn toggle_favorite(&self, key: &str) -> Result<bool, CoreError> {
        (**self).toggle_favorite(key)
    }

    fn clear_favorites(&self) -> Result<(), CoreError> {
        (**self).clear_favorites()
    }

    fn clear(&self) -> Result<(), CoreError> {
        (**self).clear()
    }
}

/// Applies a favorite toggle to `favorites`, returning whether `key` is now a favorite.
pub fn toggle_in(favorites: &mut Vec<String>, key: &str) -> bool {
    if let Some(position) = favorites.iter().position(|existing| existing == key) {
        favorites.remove(position);
        false
    } else {
        favorites.insert(0, key.to_string());
        true
    }
}

/// Prepends `entry` and enforces `retention`, if any. Returns the entry as stored.
///
/// Entry keys derive from timestamps, so an entry no newer than the current
/// head is moved one millisecond past it to keep keys unique.
pub fn push_history(
    history: &mut Vec<HistoryEntry>,
    mut entry: HistoryEntry,
    retention: Option<usize>,
) -> HistoryEntry {
    if let Some(head) = history.first() {
        if entry.date <= head.date {
            entry.date = head.date + Duration::milliseconds(1);
        }
    }
    history.insert(0, entry.clone());
    if let Some(limit) = retention {
        history.truncate(limit.max(1));
    }
    entry
}

/// Storage held entirely in memory. Used by tests and as a fallback when no
/// data directory is available.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
    retention: Option<usize>,
}

#[derive(Debug, Default)]
struct MemoryState {
    current: Option<BudgetNode>,
    history: Vec<HistoryEntry>,
    favorites: Vec<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Option<usize>) -> Self {
        Self {
            state: Mutex::default(),
            retention,
        }
    }

    /// Storage that already holds `root` as its current tree.
    pub fn seeded(root: BudgetNode) -> Self {
        let storage = Self::default();
        if let Ok(mut state) = storage.state.lock() {
            state.current = Some(root);
        }
        storage
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, CoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| CoreError::Storage("memory storage lock poisoned".into()))?;
        Ok(f(&mut *guard))
    }
}

impl BudgetStorage for MemoryStorage {
    fn save(&self, root: &BudgetNode, at: DateTime<Utc>) -> Result<HistoryEntry, CoreError> {
        let retention = self.retention;
        self.with_state(|state| {
            state.current = Some(root.clone());
            push_history(
                &mut state.history,
                HistoryEntry::new(at, root.clone()),
                retention,
            )
        })
    }

    fn load(&self) -> Result<Option<BudgetNode>, CoreError> {
        self.with_state(|state| state.current.clone())
    }

    fn restore(&self, root: &BudgetNode) -> Result<(), CoreError> {
        self.with_state(|state| state.current = Some(root.clone()))
    }

    fn history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        self.with_state(|state| state.history.clone())
    }

    fn clear_history(&self) -> Result<(), CoreError> {
        self.with_state(|state| state.history.clear())
    }

    fn favorites(&self) -> Result<Vec<String>, CoreError> {
        self.with_state(|state| state.favorites.clone())
    }

    fn toggle_favorite(&self, key: &str) -> Result<bool, CoreError> {
        self.with_state(|state| toggle_in(&mut state.favorites, key))
    }

    fn clear_favorites(&self) -> Result<(), CoreError> {
        self.with_state(|state| state.favorites.clear())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.with_state(|state| {
            state.current = None;
            state.history.clear();
        })
    }
}

/// Detects anomalies in a restored snapshot. The tree is still usable; these
/// are reported to the user, not rejected.
pub fn snapshot_warnings(root: &BudgetNode) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    if root.id != ROOT_ID {
        warnings.push(format!("root id is '{}' instead of '{}'", root.id, ROOT_ID));
    }
    for node in root.walk() {
        if !seen.insert(node.id.as_str()) {
            warnings.push(format!(
                "duplicate id {}; edits will target its first occurrence",
                node.id
            ));
        }
        if !node.amount.is_finite() {
            warnings.push(format!("category {} has a non-numeric amount", node.id));
        }
        if !node.is_leaf() && node.amount.is_finite() && node.amount != 0.0 {
            warnings.push(format!(
                "category {} stores amount {} that is ignored because it has subcategories",
                node.id, node.amount
            ));
        }
    }
    warnings
}
