//! Batch summary aggregation.

use serde::{Deserialize, Serialize};

use outcall_core::CallTaskId;

use crate::task::CallOutcome;

/// One failed task and the kind of error that terminated it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedTask {
    /// The task that failed.
    pub task_id: CallTaskId,
    /// Stable error-kind label (e.g. `provider_rejected`).
    pub error_kind: String,
}

/// Aggregated result of one batch run.
///
/// Pure data: building a summary has no side effects, and an empty outcome
/// set produces all-zero counts rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// The batch label this run processed.
    pub batch_label: String,
    /// How many tasks were loaded for the window.
    pub loaded: usize,
    /// Calls submitted to the provider.
    pub initiated: usize,
    /// Tasks deliberately not attempted.
    pub skipped: usize,
    /// Tasks whose pipeline failed terminally.
    pub failed: usize,
    /// Detail for every failed task.
    pub failures: Vec<FailedTask>,
}

impl BatchSummary {
    /// Aggregates per-task outcomes into counts.
    #[must_use]
    pub fn from_outcomes(batch_label: impl Into<String>, outcomes: &[CallOutcome]) -> Self {
        let mut summary = Self {
            batch_label: batch_label.into(),
            loaded: outcomes.len(),
            initiated: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
        };

        for outcome in outcomes {
            match outcome {
                CallOutcome::Initiated { .. } => summary.initiated += 1,
                CallOutcome::Skipped { .. } => summary.skipped += 1,
                CallOutcome::Failed { task_id, error } => {
                    summary.failed += 1;
                    summary.failures.push(FailedTask {
                        task_id: *task_id,
                        error_kind: error.kind().to_string(),
                    });
                }
            }
        }
        summary
    }
}
