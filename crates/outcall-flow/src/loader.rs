//! Batch loading: which tasks are due in this run.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use outcall_core::Result;

use crate::store::CallStore;
use crate::task::ScheduledCallTask;

/// A half-open time window `[start, end)`.
///
/// Half-open so adjacent windows never double-select a task scheduled
/// exactly on a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWindow {
    /// Inclusive start of the window.
    pub start: DateTime<Utc>,
    /// Exclusive end of the window.
    pub end: DateTime<Utc>,
}

impl BatchWindow {
    /// Creates a window from explicit bounds.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Creates a window starting now and spanning the given duration.
    #[must_use]
    pub fn starting_now(span: Duration) -> Self {
        let start = Utc::now();
        Self {
            start,
            end: start + span,
        }
    }

    /// Returns true if the instant falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Loads the pending tasks for one batch run.
///
/// A thin wrapper over the store query that enforces the loader contract:
/// scheduled-time order, no duplicate task IDs, claimed tasks excluded.
/// A store failure here is a whole-batch failure — there is no partial
/// task list to act on.
pub struct BatchLoader<'a> {
    store: &'a dyn CallStore,
}

impl std::fmt::Debug for BatchLoader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLoader").finish_non_exhaustive()
    }
}

impl<'a> BatchLoader<'a> {
    /// Creates a loader over the given store.
    #[must_use]
    pub const fn new(store: &'a dyn CallStore) -> Self {
        Self { store }
    }

    /// Returns the tasks due for `batch_label` within `window`.
    pub async fn load(
        &self,
        batch_label: &str,
        window: BatchWindow,
    ) -> Result<Vec<ScheduledCallTask>> {
        let mut tasks = self.store.pending_tasks(batch_label, window).await?;

        // The store contract already promises uniqueness; dedupe anyway so
        // a buggy store implementation cannot cause duplicate initiation.
        let mut seen = std::collections::HashSet::new();
        tasks.retain(|task| seen.insert(task.task_id));
        tasks.sort_by_key(|task| task.scheduled_at);

        tracing::info!(
            batch = batch_label,
            count = tasks.len(),
            window_start = %window.start,
            window_end = %window.end,
            "loaded scheduled calls"
        );
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let window = BatchWindow::new(start, end);

        assert!(window.contains(start));
        assert!(!window.contains(end));
        assert!(window.contains(start + Duration::minutes(29)));
    }

    #[test]
    fn starting_now_spans_duration() {
        let window = BatchWindow::starting_now(Duration::minutes(30));
        assert_eq!(window.end - window.start, Duration::minutes(30));
    }
}
