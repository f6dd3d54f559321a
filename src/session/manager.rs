//! The editing session: current tree, debounced autosave, history access.

use budtree_core::{
    compute_total, find_node, snapshot_warnings, BreakdownProjector, BudgetStorage, Clock,
    CoreError, EditOutcome, HistoryService, HistorySummary, TreeCommand, TreeService,
};
use budtree_domain::{BudgetNode, Segment, DEFAULT_ROOT_NAME};
use chrono::Duration;

use super::autosave::{SaveDebouncer, DEFAULT_QUIET_MS};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub quiet_period: Duration,
    /// Name given to the root when starting from an empty tree.
    pub root_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            quiet_period: Duration::milliseconds(DEFAULT_QUIET_MS),
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }
}

/// What happened while opening a session.
#[derive(Debug, Clone, Default)]
pub struct OpenReport {
    /// `true` when a stored tree was loaded.
    pub restored: bool,
    pub warnings: Vec<String>,
}

pub struct BudgetSession {
    current: BudgetNode,
    storage: Box<dyn BudgetStorage>,
    clock: Box<dyn Clock>,
    debouncer: SaveDebouncer,
    root_name: String,
}

impl std::fmt::Debug for BudgetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetSession")
            .field("current", &self.current.id)
            .field("pending_save", &self.debouncer.is_pending())
            .finish()
    }
}

impl BudgetSession {
    /// Loads the stored tree, or starts from an empty root when there is none.
    ///
    /// An unreadable store is not fatal: the session starts fresh and the
    /// failure is reported in [`OpenReport::warnings`].
    pub fn open(
        storage: Box<dyn BudgetStorage>,
        clock: Box<dyn Clock>,
        settings: SessionSettings,
    ) -> (Self, OpenReport) {
        let mut report = OpenReport::default();
        let current = match storage.load() {
            Ok(Some(tree)) => {
                report.restored = true;
                report.warnings = snapshot_warnings(&tree);
                tree
            }
            Ok(None) => BudgetNode::root(settings.root_name.clone()),
            Err(err) => {
                tracing::warn!(error = %err, "stored budget could not be loaded");
                report
                    .warnings
                    .push(format!("stored budget could not be loaded: {err}"));
                BudgetNode::root(settings.root_name.clone())
            }
        };
        for warning in &report.warnings {
            tracing::warn!("{warning}");
        }
        tracing::info!(
            restored = report.restored,
            nodes = current.node_count(),
            "budget session opened"
        );
        let session = Self {
            current,
            storage,
            clock,
            debouncer: SaveDebouncer::new(settings.quiet_period),
            root_name: settings.root_name,
        };
        (session, report)
    }

    pub fn current(&self) -> &BudgetNode {
        &self.current
    }

    pub fn storage(&self) -> &dyn BudgetStorage {
        self.storage.as_ref()
    }

    pub fn find(&self, id: &str) -> Option<&BudgetNode> {
        find_node(&self.current, id)
    }

    pub fn total(&self) -> f64 {
        compute_total(&self.current)
    }

    /// Breakdown of the node `id`; `None` when it does not exist.
    pub fn breakdown(&self, id: &str) -> Option<Vec<Segment>> {
        self.find(id).map(BreakdownProjector::project)
    }

    /// Applies an edit and, when it changed the tree, schedules a save.
    pub fn apply(&mut self, command: &TreeCommand) -> EditOutcome {
        let edit = TreeService::apply(&self.current, command);
        if edit.outcome.is_applied() {
            self.current = edit.root;
            self.debouncer.schedule(self.current.clone(), self.clock.now());
        } else {
            tracing::debug!(id = command.target(), outcome = ?edit.outcome, "edit ignored");
        }
        edit.outcome
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Saves the pending snapshot if its quiet period has elapsed.
    pub fn tick(&mut self) -> Result<bool, CoreError> {
        let now = self.clock.now();
        match self.debouncer.take_due(now) {
            Some(snapshot) => self.persist_pending(snapshot).map(|_| true),
            None => Ok(false),
        }
    }

    /// Saves the pending snapshot immediately, if any.
    pub fn flush(&mut self) -> Result<bool, CoreError> {
        match self.debouncer.flush() {
            Some(snapshot) => self.persist_pending(snapshot).map(|_| true),
            None => Ok(false),
        }
    }

    /// Saves the current tree now, pending or not.
    pub fn save_now(&mut self) -> Result<(), CoreError> {
        self.debouncer.cancel();
        let snapshot = self.current.clone();
        self.persist_pending(snapshot)
    }

    /// Replaces the tree with an empty root; the change is saved like any edit.
    pub fn reset(&mut self) {
        self.current = BudgetNode::root(self.root_name.clone());
        self.debouncer.schedule(self.current.clone(), self.clock.now());
    }

    /// Starts over from an empty root and forgets the stored tree, its
    /// history and the favorites. Nothing is left pending.
    pub fn wipe(&mut self) -> Result<(), CoreError> {
        self.storage.clear()?;
        self.storage.clear_favorites()?;
        self.debouncer.cancel();
        self.current = BudgetNode::root(self.root_name.clone());
        tracing::info!("stored budget wiped");
        Ok(())
    }

    pub fn history_view(&self) -> Result<Vec<HistorySummary>, CoreError> {
        let history = self.storage.history()?;
        let favorites = self.storage.favorites()?;
        Ok(HistoryService::summaries(&history, &favorites))
    }

    /// Makes the snapshot saved under `key` current without adding history.
    ///
    /// Pending edits are saved first so they stay reachable from history.
    pub fn restore(&mut self, key: &str) -> Result<&BudgetNode, CoreError> {
        self.flush()?;
        let history = self.storage.history()?;
        let snapshot = HistoryService::find(&history, key)
            .cloned()
            .ok_or_else(|| CoreError::SnapshotNotFound(key.to_string()))?;
        self.storage.restore(&snapshot)?;
        self.current = snapshot;
        tracing::info!(key, "snapshot restored");
        Ok(&self.current)
    }

    pub fn toggle_favorite(&self, key: &str) -> Result<bool, CoreError> {
        self.storage.toggle_favorite(key)
    }

    /// Drops all saved snapshots and the favorites pointing at them.
    pub fn clear_history(&self) -> Result<(), CoreError> {
        self.storage.clear_history()?;
        self.storage.clear_favorites()
    }

    /// Saves `snapshot`; on failure it goes back into the debouncer so a
    /// later tick or flush retries it.
    fn persist_pending(&mut self, snapshot: BudgetNode) -> Result<(), CoreError> {
        let now = self.clock.now();
        match self.storage.save(&snapshot, now) {
            Ok(entry) => {
                tracing::debug!(key = %entry.key(), "budget saved");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "save failed; snapshot kept pending");
                self.debouncer.schedule(snapshot, now);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use budtree_core::{IgnoreReason, ManualClock, MemoryStorage};
    use budtree_domain::HistoryEntry;
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    struct Fixture {
        session: BudgetSession,
        clock: Arc<ManualClock>,
        storage: Arc<MemoryStorage>,
    }

    /// Session over shared handles so tests can inspect storage and move time.
    fn fixture(seed: Option<BudgetNode>) -> (Fixture, OpenReport) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap(),
        ));
        let storage = Arc::new(match seed {
            Some(tree) => MemoryStorage::seeded(tree),
            None => MemoryStorage::new(),
        });
        let (session, report) = BudgetSession::open(
            Box::new(storage.clone()),
            Box::new(clock.clone()),
            SessionSettings::default(),
        );
        (
            Fixture {
                session,
                clock,
                storage,
            },
            report,
        )
    }

    fn add(session: &mut BudgetSession, parent: &str) -> EditOutcome {
        session.apply(&TreeCommand::AddChild {
            parent_id: parent.into(),
        })
    }

    #[test]
    fn opens_empty_root_when_nothing_stored() {
        let (fx, report) = fixture(None);
        assert!(!report.restored);
        assert_eq!(fx.session.current(), &BudgetNode::root(DEFAULT_ROOT_NAME));
    }

    #[test]
    fn opens_stored_tree_and_reports_anomalies() {
        let stored = BudgetNode::root("Saved").with_children(vec![
            BudgetNode::new("1.1", "A", 1.0),
            BudgetNode::new("1.1", "B", 2.0),
        ]);
        let (fx, report) = fixture(Some(stored.clone()));
        assert!(report.restored);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(fx.session.current(), &stored);
    }

    #[test]
    fn edits_are_saved_once_after_quiet_period() {
        let (mut fx, _) = fixture(None);
        add(&mut fx.session, "1");
        fx.clock.advance(Duration::milliseconds(300));
        fx.session.apply(&TreeCommand::SetAmount {
            id: "1.1".into(),
            value: 40.0,
        });

        fx.clock.advance(Duration::milliseconds(700));
        assert!(!fx.session.tick().unwrap());
        fx.clock.advance(Duration::milliseconds(100));
        assert!(fx.session.tick().unwrap());
        assert!(!fx.session.tick().unwrap());

        let history = fx.storage.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(compute_total(&history[0].budget), 40.0);
        assert_eq!(fx.storage.load().unwrap().as_ref(), Some(fx.session.current()));
    }

    #[test]
    fn ignored_edits_do_not_schedule_saves() {
        let (mut fx, _) = fixture(None);
        let outcome = fx.session.apply(&TreeCommand::Remove { id: "1".into() });
        assert_eq!(outcome, EditOutcome::Ignored(IgnoreReason::RootProtected));
        assert!(!fx.session.has_pending_save());
        assert!(!fx.session.flush().unwrap());
    }

    #[test]
    fn restore_replaces_tree_without_new_history() {
        let (mut fx, _) = fixture(None);
        add(&mut fx.session, "1");
        fx.session.flush().unwrap();
        let key = fx.session.history_view().unwrap()[0].key.clone();

        fx.clock.advance(Duration::seconds(5));
        add(&mut fx.session, "1");
        fx.session.flush().unwrap();
        assert_eq!(fx.session.current().children.len(), 2);

        let restored = fx.session.restore(&key).unwrap();
        assert_eq!(restored.children.len(), 1);
        assert_eq!(fx.storage.history().unwrap().len(), 2);
        assert_eq!(fx.storage.load().unwrap().unwrap().children.len(), 1);
    }

    #[test]
    fn restore_of_unknown_key_is_an_error() {
        let (mut fx, _) = fixture(None);
        assert!(matches!(
            fx.session.restore("nope"),
            Err(CoreError::SnapshotNotFound(_))
        ));
    }

    #[test]
    fn history_view_lists_favorites_first() {
        let (mut fx, _) = fixture(None);
        for _ in 0..3 {
            add(&mut fx.session, "1");
            fx.session.flush().unwrap();
            fx.clock.advance(Duration::seconds(1));
        }
        let oldest = fx.session.history_view().unwrap()[2].key.clone();
        assert!(fx.session.toggle_favorite(&oldest).unwrap());

        let view = fx.session.history_view().unwrap();
        assert_eq!(view[0].key, oldest);
        assert!(view[0].favorite);
        assert_eq!(view[0].top_level_categories, 1);
        assert_eq!(view[1].top_level_categories, 3);

        fx.session.clear_history().unwrap();
        assert!(fx.session.history_view().unwrap().is_empty());
        assert!(fx.storage.favorites().unwrap().is_empty());
    }

    #[test]
    fn reset_schedules_an_empty_root() {
        let (mut fx, _) = fixture(Some(
            BudgetNode::root("Old").with_child(BudgetNode::new("1.1", "A", 5.0)),
        ));
        fx.session.reset();
        assert!(fx.session.has_pending_save());
        assert_eq!(fx.session.current(), &BudgetNode::root(DEFAULT_ROOT_NAME));
        assert_eq!(fx.session.total(), 0.0);
    }

    #[test]
    fn restore_saves_pending_edits_first() {
        let (mut fx, _) = fixture(None);
        add(&mut fx.session, "1");
        fx.session.flush().unwrap();
        let first = fx.session.history_view().unwrap()[0].key.clone();

        fx.clock.advance(Duration::seconds(1));
        fx.session.apply(&TreeCommand::Rename {
            id: "1.1".into(),
            name: "Pending".into(),
        });
        fx.session.restore(&first).unwrap();

        let history = fx.storage.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].budget.children[0].name, "Pending");
        assert_eq!(fx.session.current().children[0].name, budtree_domain::DEFAULT_CHILD_NAME);
        assert!(!fx.session.has_pending_save());
    }

    /// Memory storage whose first `failures` saves are rejected.
    struct FlakyStorage {
        inner: MemoryStorage,
        failures: AtomicUsize,
    }

    impl BudgetStorage for FlakyStorage {
        fn save(&self, root: &BudgetNode, at: DateTime<Utc>) -> Result<HistoryEntry, CoreError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(CoreError::Storage("disk full".into()));
            }
            self.inner.save(root, at)
        }

        fn load(&self) -> Result<Option<BudgetNode>, CoreError> {
            self.inner.load()
        }

        fn restore(&self, root: &BudgetNode) -> Result<(), CoreError> {
            self.inner.restore(root)
        }

        fn history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
            self.inner.history()
        }

        fn clear_history(&self) -> Result<(), CoreError> {
            self.inner.clear_history()
        }

        fn favorites(&self) -> Result<Vec<String>, CoreError> {
            self.inner.favorites()
        }

        fn toggle_favorite(&self, key: &str) -> Result<bool, CoreError> {
            self.inner.toggle_favorite(key)
        }

        fn clear_favorites(&self) -> Result<(), CoreError> {
            self.inner.clear_favorites()
        }

        fn clear(&self) -> Result<(), CoreError> {
            self.inner.clear()
        }
    }

    #[test]
    fn failed_save_keeps_the_snapshot_pending() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap(),
        ));
        let storage = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(),
            failures: AtomicUsize::new(1),
        });
        let (mut session, _) = BudgetSession::open(
            Box::new(storage.clone()),
            Box::new(clock.clone()),
            SessionSettings::default(),
        );

        add(&mut session, "1");
        clock.advance(Duration::seconds(2));
        assert!(matches!(session.tick(), Err(CoreError::Storage(_))));
        assert!(session.has_pending_save());

        assert!(session.flush().unwrap());
        let stored = storage.load().unwrap().unwrap();
        assert_eq!(stored.children.len(), 1);
        assert_eq!(storage.history().unwrap().len(), 1);
    }

    #[test]
    fn wipe_forgets_everything_stored() {
        let (mut fx, _) = fixture(None);
        add(&mut fx.session, "1");
        fx.session.flush().unwrap();
        let key = fx.session.history_view().unwrap()[0].key.clone();
        fx.session.toggle_favorite(&key).unwrap();
        add(&mut fx.session, "1");

        fx.session.wipe().unwrap();
        assert_eq!(fx.session.current(), &BudgetNode::root(DEFAULT_ROOT_NAME));
        assert!(!fx.session.has_pending_save());
        assert!(fx.storage.load().unwrap().is_none());
        assert!(fx.storage.history().unwrap().is_empty());
        assert!(fx.storage.favorites().unwrap().is_empty());
    }
}
