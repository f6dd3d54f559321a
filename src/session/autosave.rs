//! Debounced persistence.
//!
//! Edits arrive in bursts (typing an amount digit by digit); the debouncer
//! keeps only the latest snapshot and releases it once no further edit has
//! arrived for the quiet period.

use budtree_domain::BudgetNode;
use chrono::{DateTime, Duration, Utc};

/// Default quiet period before a pending snapshot is saved.
pub const DEFAULT_QUIET_MS: i64 = 800;

#[derive(Debug, Clone)]
struct PendingSave {
    snapshot: BudgetNode,
    last_edit: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    quiet: Duration,
    pending: Option<PendingSave>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::from_millis(DEFAULT_QUIET_MS)
    }
}

impl SaveDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self::new(Duration::milliseconds(millis.max(0)))
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Records `snapshot` as the latest state, restarting the quiet period.
    pub fn schedule(&mut self, snapshot: BudgetNode, now: DateTime<Utc>) {
        self.pending = Some(PendingSave {
            snapshot,
            last_edit: now,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Instant at which the pending snapshot becomes due.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.pending
            .as_ref()
            .map(|pending| pending.last_edit + self.quiet)
    }

    /// Hands out the pending snapshot once the quiet period has elapsed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<BudgetNode> {
        match self.due_at() {
            Some(due) if now >= due => self.flush(),
            _ => None,
        }
    }

    /// Hands out the pending snapshot regardless of timing.
    pub fn flush(&mut self) -> Option<BudgetNode> {
        self.pending.take().map(|pending| pending.snapshot)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn burst_of_edits_yields_latest_snapshot_once() {
        let mut debouncer = SaveDebouncer::default();
        let t0 = start();
        debouncer.schedule(BudgetNode::root("a"), t0);
        debouncer.schedule(BudgetNode::root("b"), t0 + Duration::milliseconds(500));

        assert!(debouncer
            .take_due(t0 + Duration::milliseconds(1000))
            .is_none());
        let saved = debouncer
            .take_due(t0 + Duration::milliseconds(1300))
            .unwrap();
        assert_eq!(saved.name, "b");
        assert!(!debouncer.is_pending());
        assert!(debouncer
            .take_due(t0 + Duration::milliseconds(5000))
            .is_none());
    }

    #[test]
    fn flush_ignores_quiet_period() {
        let mut debouncer = SaveDebouncer::from_millis(10_000);
        debouncer.schedule(BudgetNode::root("a"), start());
        assert_eq!(debouncer.flush().unwrap().name, "a");
        assert!(debouncer.flush().is_none());
    }
}
