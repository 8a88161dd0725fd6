//! Pluggable storage for orchestration state.
//!
//! The [`CallStore`] trait is the single seam between the orchestrator and
//! the backing data store. Both flows go through it: the batch path reads
//! pending tasks and contexts and writes claim markers, the webhook path
//! reads existing records and writes new ones. The two flows share no
//! in-memory state; reconciliation happens exclusively here.
//!
//! ## Design Principles
//!
//! - **Claim-before-initiate**: the claim marker is the idempotency guard
//!   against double-initiation when a crashed batch run is re-invoked
//! - **Terminal short-circuit**: an existing record for a provider call ID
//!   makes redelivered webhooks no-ops, without locking
//! - **Testability**: in-memory implementation for tests, production
//!   implementations live behind the trait

pub mod memory;

use async_trait::async_trait;

use outcall_core::{CallTaskId, ProviderCallId, Result, SeriesId};

use crate::context::ConversationContext;
use crate::loader::BatchWindow;
use crate::record::{AnomalyRecord, CallRecord};
use crate::task::ScheduledCallTask;

/// Result of attempting to claim a task for initiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// This caller now owns the task.
    Claimed,
    /// A previous run already claimed it.
    AlreadyClaimed,
}

impl ClaimResult {
    /// Returns true if this caller won the claim.
    #[must_use]
    pub const fn is_claimed(self) -> bool {
        matches!(self, Self::Claimed)
    }
}

/// Storage abstraction for the orchestrator.
///
/// Every method maps an unreachable store to
/// [`outcall_core::Error::StoreUnavailable`]; implementations must carry a
/// timeout on network access so a hung store surfaces as unavailable rather
/// than blocking a batch indefinitely.
///
/// ## Thread Safety
///
/// All methods are `Send + Sync`: the fan-out runs many task pipelines
/// against the store concurrently, and the webhook path runs independently.
#[async_trait]
pub trait CallStore: Send + Sync {
    // --- Batch path (reads + claim) ---

    /// Returns the unclaimed tasks for a batch label whose scheduled time
    /// falls in the window, ordered by scheduled time, with no duplicates.
    async fn pending_tasks(
        &self,
        batch_label: &str,
        window: BatchWindow,
    ) -> Result<Vec<ScheduledCallTask>>;

    /// Atomically claims a task for initiation (first writer wins).
    ///
    /// The claim is the store-side "already processed" marker: a re-invoked
    /// batch entry point sees `AlreadyClaimed` and skips instead of placing
    /// a duplicate call.
    async fn claim_task(&self, task_id: &CallTaskId) -> Result<ClaimResult>;

    /// Returns the latest conversation context for a series.
    ///
    /// Fails with [`outcall_core::Error::ContextNotFound`] when no prior
    /// context exists — an expected state, not a fault.
    async fn fetch_context(&self, series_id: &SeriesId) -> Result<ConversationContext>;

    // --- Webhook path (reconciliation) ---

    /// Looks up a task by ID, for correlation resolution.
    async fn resolve_task(&self, task_id: &CallTaskId) -> Result<Option<ScheduledCallTask>>;

    /// Returns the persisted record for a provider call ID, if one exists.
    async fn find_record(&self, provider_call_id: &ProviderCallId) -> Result<Option<CallRecord>>;

    /// Persists a call record.
    ///
    /// All persisted records are terminal, so the ingestor's
    /// find-then-persist sequence gives at-most-once effective persistence
    /// under at-least-once delivery.
    async fn persist_record(&self, record: &CallRecord) -> Result<()>;

    /// Persists a reconciliation anomaly for alerting.
    async fn record_anomaly(&self, anomaly: &AnomalyRecord) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_result_is_claimed() {
        assert!(ClaimResult::Claimed.is_claimed());
        assert!(!ClaimResult::AlreadyClaimed.is_claimed());
    }
}
