//! Progress tracker implementation.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::{ProgressSnapshot, ProgressStatus};

/// Thread-safe store of the latest progress snapshot per session.
///
/// Writes are last-write-wins; no history is kept. Entries live until
/// cleared or the tracker is dropped.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    sessions: RwLock<HashMap<String, ProgressSnapshot>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record progress for a session, replacing any previous snapshot.
    ///
    /// Status and time estimate are derived from `percentage`.
    pub fn update(
        &self,
        session_id: &str,
        percentage: f64,
        message: &str,
        current_step: &str,
    ) -> ProgressSnapshot {
        let snapshot = ProgressSnapshot::new(session_id, percentage, message, current_step);
        self.store(snapshot)
    }

    /// Record that a session stopped with an error.
    ///
    /// Keeps the last known percentage so pollers can see how far it got.
    pub fn mark_failed(&self, session_id: &str, message: &str, current_step: &str) -> ProgressSnapshot {
        let mut sessions = self.sessions.write();
        let percentage = sessions.get(session_id).map_or(0.0, |s| s.percentage);
        let snapshot = ProgressSnapshot::failed(session_id, percentage, message, current_step);
        publish(&snapshot);
        sessions.insert(snapshot.session_id.clone(), snapshot.clone());
        snapshot
    }

    /// Get the latest snapshot for a session.
    pub fn get(&self, session_id: &str) -> Option<ProgressSnapshot> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Remove a session's snapshot.
    pub fn clear(&self, session_id: &str) -> Option<ProgressSnapshot> {
        self.sessions.write().remove(session_id)
    }

    /// Whether the session reached the `complete` state.
    pub fn is_complete(&self, session_id: &str) -> bool {
        self.get(session_id)
            .is_some_and(|s| s.status == ProgressStatus::Complete)
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn store(&self, snapshot: ProgressSnapshot) -> ProgressSnapshot {
        publish(&snapshot);
        self.sessions
            .write()
            .insert(snapshot.session_id.clone(), snapshot.clone());
        snapshot
    }
}

/// Emit a snapshot as a `[PROGRESS]` tracing event.
fn publish(snapshot: &ProgressSnapshot) {
    match serde_json::to_string(snapshot) {
        Ok(json) => tracing::info!("[PROGRESS] {}", json),
        Err(e) => tracing::warn!("Failed to serialize progress snapshot: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn status_follows_percentage() {
        let tracker = ProgressTracker::new();

        tracker.update("s", 0.0, "Queued", "start");
        assert_eq!(tracker.get("s").unwrap().status, ProgressStatus::Start);

        tracker.update("s", 55.0, "Halfway", "align-transcript");
        let snapshot = tracker.get("s").unwrap();
        assert_eq!(snapshot.status, ProgressStatus::Processing);
        assert_eq!(snapshot.estimated_time_left, "About 5 minutes");

        tracker.update("s", 100.0, "Done", "complete");
        let snapshot = tracker.get("s").unwrap();
        assert_eq!(snapshot.status, ProgressStatus::Complete);
        assert_eq!(snapshot.estimated_time_left, "Completed");
    }

    #[test]
    fn keeps_only_latest_snapshot() {
        let tracker = ProgressTracker::new();
        tracker.update("s", 10.0, "first", "separate-sources");
        tracker.update("s", 20.0, "second", "separate-sources");

        let snapshot = tracker.get("s").unwrap();
        assert_eq!(snapshot.percentage, 20.0);
        assert_eq!(snapshot.message, "second");
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn unknown_session_is_none() {
        let tracker = ProgressTracker::new();
        assert!(tracker.get("missing").is_none());
        assert!(!tracker.is_complete("missing"));
    }

    #[test]
    fn clear_removes_session() {
        let tracker = ProgressTracker::new();
        tracker.update("s", 40.0, "x", "encode-lossy");
        assert!(tracker.clear("s").is_some());
        assert!(tracker.get("s").is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn mark_failed_keeps_last_percentage() {
        let tracker = ProgressTracker::new();
        tracker.update("s", 50.0, "Aligning", "align-transcript");
        tracker.mark_failed("s", "aligner exited with 1", "align-transcript");

        let snapshot = tracker.get("s").unwrap();
        assert_eq!(snapshot.status, ProgressStatus::Failed);
        assert_eq!(snapshot.percentage, 50.0);
        assert_eq!(snapshot.message, "aligner exited with 1");
    }

    #[test]
    fn mark_failed_without_prior_update_starts_at_zero() {
        let tracker = ProgressTracker::new();
        let snapshot = tracker.mark_failed("s", "bad input", "setup");
        assert_eq!(snapshot.percentage, 0.0);
        assert_eq!(snapshot.status, ProgressStatus::Failed);
    }

    #[test]
    fn nan_update_is_stored_as_zero() {
        let tracker = ProgressTracker::new();
        let snapshot = tracker.update("s", f64::NAN, "odd", "start");
        assert_eq!(snapshot.percentage, 0.0);
        assert_eq!(snapshot.status, ProgressStatus::Start);
        assert_eq!(tracker.get("s").unwrap().percentage, 0.0);
    }

    #[test]
    fn mark_failed_races_with_updates() {
        let tracker = Arc::new(ProgressTracker::new());
        tracker.update("s", 10.0, "start", "separate-sources");

        let writer = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for pct in [20.0, 40.0, 50.0, 60.0] {
                    tracker.update("s", pct, "tick", "step");
                }
            })
        };
        let failed = tracker.mark_failed("s", "crashed", "align-transcript");
        writer.join().unwrap();

        assert!([10.0, 20.0, 40.0, 50.0, 60.0].contains(&failed.percentage));
        let last = tracker.get("s").unwrap();
        if last.status == ProgressStatus::Failed {
            assert_eq!(last, failed);
        }
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let tracker = Arc::new(ProgressTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    let session = format!("session-{}", i % 4);
                    for pct in 0..=10 {
                        tracker.update(&session, (pct * 10) as f64, "tick", "step");
                        let _ = tracker.get(&session);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.len(), 4);
        for i in 0..4 {
            assert!(tracker.is_complete(&format!("session-{}", i)));
        }
    }
}
