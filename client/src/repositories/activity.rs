//! Capped, de-duplicated feed of notable user actions.

use std::sync::Arc;

use tokio::sync::watch;

use super::repository::JsonCollection;
use crate::{
    error::StorageError,
    models::{ActivityEntry, ActivityEvent},
    storage::KeyValueStore,
    utils::time::{now_millis, time_ago_at},
};

pub const ACTIVITY_KEY: &str = "userActivity";
pub const ACTIVITY_LIMIT: usize = 20;
/// Identical actions closer together than this collapse into one entry.
pub const DUPLICATE_WINDOW_MILLIS: i64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(ActivityEntry),
    Duplicate,
}

/// An entry with its relative time, computed when read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityView {
    pub entry: ActivityEntry,
    pub time_ago: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub before: usize,
    pub after: usize,
}

#[derive(Clone)]
pub struct ActivityLog {
    entries: JsonCollection<ActivityEntry>,
    tx: Arc<watch::Sender<Vec<ActivityEntry>>>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = JsonCollection::new(store, ACTIVITY_KEY);
        let (tx, _) = watch::channel(load_valid(&entries));
        Self {
            entries,
            tx: Arc::new(tx),
        }
    }

    pub fn record(&self, action: &str, icon: &str) -> Result<RecordOutcome, StorageError> {
        self.record_at(action, icon, now_millis())
    }

    pub fn record_at(
        &self,
        action: &str,
        icon: &str,
        now: i64,
    ) -> Result<RecordOutcome, StorageError> {
        let mut entries = load_valid(&self.entries);

        let duplicate = entries
            .iter()
            .any(|e| e.action == action && now - e.timestamp < DUPLICATE_WINDOW_MILLIS);
        if duplicate {
            tracing::debug!(action, "skipping duplicate activity");
            return Ok(RecordOutcome::Duplicate);
        }

        let entry = ActivityEntry {
            action: action.to_string(),
            timestamp: now,
            icon: icon.to_string(),
        };
        entries.insert(0, entry.clone());
        entries.truncate(ACTIVITY_LIMIT);
        self.entries.save(&entries)?;
        tracing::debug!(action, "activity logged");
        self.tx.send_replace(entries);
        Ok(RecordOutcome::Recorded(entry))
    }

    pub fn log_event(&self, event: &ActivityEvent) -> Result<RecordOutcome, StorageError> {
        self.record(&event.action(), event.icon())
    }

    /// Newest first.
    pub fn query(&self) -> Vec<ActivityEntry> {
        load_valid(&self.entries)
    }

    pub fn query_with_time_ago(&self, now: i64) -> Vec<ActivityView> {
        self.query()
            .into_iter()
            .map(|entry| ActivityView {
                time_ago: time_ago_at(entry.timestamp, now),
                entry,
            })
            .collect()
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.entries.clear()?;
        self.tx.send_replace(Vec::new());
        Ok(())
    }

    /// Rewrites storage with only the valid entries.
    pub fn clean(&self) -> Result<CleanReport, StorageError> {
        let before = self.entries.stored_len();
        let valid = load_valid(&self.entries);
        let report = CleanReport {
            before,
            after: valid.len(),
        };
        if report.before != report.after {
            self.entries.save(&valid)?;
            self.tx.send_replace(valid);
        }
        tracing::info!(before = report.before, after = report.after, "cleaned activities");
        Ok(report)
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ActivityEntry>> {
        self.tx.subscribe()
    }
}

fn load_valid(entries: &JsonCollection<ActivityEntry>) -> Vec<ActivityEntry> {
    entries
        .load_lenient()
        .into_iter()
        .filter(ActivityEntry::is_valid)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const NOW: i64 = 1_700_000_000_000;

    fn log() -> (Arc<MemoryStore>, ActivityLog) {
        let backend = Arc::new(MemoryStore::new());
        let log = ActivityLog::new(backend.clone());
        (backend, log)
    }

    #[test]
    fn duplicate_inside_window_is_dropped() {
        let (_backend, log) = log();
        assert!(matches!(
            log.record_at("Logged in", "🔓", NOW).unwrap(),
            RecordOutcome::Recorded(_)
        ));
        assert_eq!(
            log.record_at("Logged in", "🔓", NOW + 4_999).unwrap(),
            RecordOutcome::Duplicate
        );
        assert_eq!(log.query().len(), 1);
    }

    #[test]
    fn same_action_after_window_is_kept() {
        let (_backend, log) = log();
        log.record_at("Logged in", "🔓", NOW).unwrap();
        log.record_at("Logged in", "🔓", NOW + 6_000).unwrap();
        let entries = log.query();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, NOW + 6_000);
    }

    #[test]
    fn different_actions_are_not_duplicates() {
        let (_backend, log) = log();
        log.record_at("Logged in", "🔓", NOW).unwrap();
        log.record_at("Changed password", "🔒", NOW + 1).unwrap();
        assert_eq!(log.query().len(), 2);
    }

    #[test]
    fn log_is_capped_at_twenty() {
        let (_backend, log) = log();
        for n in 0..25 {
            log.record_at(&format!("action {n}"), "📋", NOW + n).unwrap();
        }
        let entries = log.query();
        assert_eq!(entries.len(), ACTIVITY_LIMIT);
        assert_eq!(entries[0].action, "action 24");
        assert_eq!(entries[19].action, "action 5");
    }

    #[test]
    fn malformed_entries_are_ignored_when_recording() {
        let (backend, log) = log();
        backend
            .set_item(
                ACTIVITY_KEY,
                r#"[
                    {"action": "Logged in", "timestamp": "soon", "icon": "🔓"},
                    {"action": "Logged in", "timestamp": -4, "icon": "🔓"},
                    {"action": "Released bed 4", "timestamp": 1699999999000, "icon": "✅"}
                ]"#,
            )
            .unwrap();

        assert!(matches!(
            log.record_at("Logged in", "🔓", NOW).unwrap(),
            RecordOutcome::Recorded(_)
        ));
        let actions: Vec<_> = log.query().into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec!["Logged in", "Released bed 4"]);
    }

    #[test]
    fn clean_rewrites_only_valid_entries() {
        let (backend, log) = log();
        backend
            .set_item(
                ACTIVITY_KEY,
                r#"[{"action": "", "timestamp": 10}, {"action": "ok", "timestamp": 10}, 7]"#,
            )
            .unwrap();

        let report = log.clean().unwrap();
        assert_eq!(report, CleanReport { before: 3, after: 1 });
        let stored = backend.get_item(ACTIVITY_KEY).unwrap().unwrap();
        let raw: Vec<serde_json::Value> = serde_json::from_str(&stored).unwrap();
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn clear_empties_and_notifies() {
        let (_backend, log) = log();
        log.record_at("Logged in", "🔓", NOW).unwrap();
        let mut rx = log.subscribe();
        rx.borrow_and_update();

        log.clear().unwrap();
        assert!(log.query().is_empty());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow().is_empty());
    }

    #[test]
    fn time_ago_is_computed_at_read_time() {
        let (_backend, log) = log();
        log.record_at("Logged in", "🔓", NOW).unwrap();

        let views = log.query_with_time_ago(NOW + 45_000);
        assert_eq!(views[0].time_ago, "Just now");
        let views = log.query_with_time_ago(NOW + 5 * 60_000);
        assert_eq!(views[0].time_ago, "5 minutes ago");
    }

    #[test]
    fn events_use_their_wording() {
        let (_backend, log) = log();
        log.log_event(&ActivityEvent::BedReleased { bed: "B-12".into() })
            .unwrap();
        let entry = &log.query()[0];
        assert_eq!(entry.action, "Released bed B-12");
        assert_eq!(entry.icon, "✅");
    }
}
