//! In-memory store implementation for testing and local development.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use outcall_core::{CallTaskId, Error, ProviderCallId, Result, SeriesId};

use crate::context::ConversationContext;
use crate::loader::BatchWindow;
use crate::record::{AnomalyRecord, CallRecord};
use crate::store::{CallStore, ClaimResult};
use crate::task::ScheduledCallTask;

/// In-memory [`CallStore`].
///
/// Suitable for tests and local development only: claims and records do not
/// survive a process restart. The `set_unavailable` switch lets tests
/// simulate a store outage without a separate failing implementation.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tasks: RwLock<HashMap<CallTaskId, ScheduledCallTask>>,
    contexts: RwLock<HashMap<SeriesId, ConversationContext>>,
    claims: RwLock<HashSet<CallTaskId>>,
    records: RwLock<HashMap<ProviderCallId, CallRecord>>,
    anomalies: RwLock<Vec<AnomalyRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a scheduled task.
    pub async fn insert_task(&self, task: ScheduledCallTask) {
        self.tasks.write().await.insert(task.task_id, task);
    }

    /// Seeds a conversation context.
    pub async fn insert_context(&self, context: ConversationContext) {
        self.contexts.write().await.insert(context.series_id, context);
    }

    /// Simulates a store outage: while set, every operation fails with
    /// `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns all persisted call records.
    pub async fn records(&self) -> Vec<CallRecord> {
        self.records.read().await.values().cloned().collect()
    }

    /// Returns all recorded anomalies.
    pub async fn anomalies(&self) -> Vec<AnomalyRecord> {
        self.anomalies.read().await.clone()
    }

    /// Returns true if the task has been claimed.
    pub async fn is_claimed(&self, task_id: &CallTaskId) -> bool {
        self.claims.read().await.contains(task_id)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("in-memory store outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl CallStore for InMemoryStore {
    async fn pending_tasks(
        &self,
        batch_label: &str,
        window: BatchWindow,
    ) -> Result<Vec<ScheduledCallTask>> {
        self.check_available()?;
        let claims = self.claims.read().await;
        let mut tasks: Vec<ScheduledCallTask> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| {
                task.batch_label == batch_label
                    && window.contains(task.scheduled_at)
                    && !claims.contains(&task.task_id)
            })
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.scheduled_at, task.task_id.as_ulid()));
        Ok(tasks)
    }

    async fn claim_task(&self, task_id: &CallTaskId) -> Result<ClaimResult> {
        self.check_available()?;
        let mut claims = self.claims.write().await;
        if claims.insert(*task_id) {
            Ok(ClaimResult::Claimed)
        } else {
            Ok(ClaimResult::AlreadyClaimed)
        }
    }

    async fn fetch_context(&self, series_id: &SeriesId) -> Result<ConversationContext> {
        self.check_available()?;
        self.contexts
            .read()
            .await
            .get(series_id)
            .cloned()
            .ok_or_else(|| Error::ContextNotFound {
                series_id: series_id.to_string(),
            })
    }

    async fn resolve_task(&self, task_id: &CallTaskId) -> Result<Option<ScheduledCallTask>> {
        self.check_available()?;
        Ok(self.tasks.read().await.get(task_id).cloned())
    }

    async fn find_record(&self, provider_call_id: &ProviderCallId) -> Result<Option<CallRecord>> {
        self.check_available()?;
        Ok(self.records.read().await.get(provider_call_id).cloned())
    }

    async fn persist_record(&self, record: &CallRecord) -> Result<()> {
        self.check_available()?;
        let mut records = self.records.write().await;
        // First write wins: a record is terminal once persisted.
        records
            .entry(record.provider_call_id.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn record_anomaly(&self, anomaly: &AnomalyRecord) -> Result<()> {
        self.check_available()?;
        self.anomalies.write().await.push(anomaly.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextPolicy;
    use chrono::{Duration, Utc};

    fn task_at(label: &str, offset_minutes: i64) -> ScheduledCallTask {
        ScheduledCallTask {
            task_id: CallTaskId::generate(),
            scheduled_at: Utc::now() + Duration::minutes(offset_minutes),
            customer_number: "+61467807718".into(),
            assistant_id: "assistant-1".into(),
            phone_number_id: "line-1".into(),
            series_id: SeriesId::generate(),
            prompt_name: "daily-checkin".into(),
            batch_label: label.into(),
            context_policy: ContextPolicy::Optional,
        }
    }

    #[tokio::test]
    async fn pending_tasks_filters_label_and_window() {
        let store = InMemoryStore::new();
        store.insert_task(task_at("morning", 5)).await;
        store.insert_task(task_at("morning", 120)).await;
        store.insert_task(task_at("afternoon", 5)).await;

        let window = BatchWindow::starting_now(Duration::minutes(30));
        let tasks = store.pending_tasks("morning", window).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].batch_label, "morning");
    }

    #[tokio::test]
    async fn claim_is_first_writer_wins() {
        let store = InMemoryStore::new();
        let task = task_at("morning", 5);
        let id = task.task_id;
        store.insert_task(task).await;

        assert_eq!(store.claim_task(&id).await.unwrap(), ClaimResult::Claimed);
        assert_eq!(
            store.claim_task(&id).await.unwrap(),
            ClaimResult::AlreadyClaimed
        );
    }

    #[tokio::test]
    async fn claimed_tasks_are_not_pending() {
        let store = InMemoryStore::new();
        let task = task_at("morning", 5);
        let id = task.task_id;
        store.insert_task(task).await;
        store.claim_task(&id).await.unwrap();

        let window = BatchWindow::starting_now(Duration::minutes(30));
        assert!(store.pending_tasks("morning", window).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_context_not_found_is_expected_error() {
        let store = InMemoryStore::new();
        let result = store.fetch_context(&SeriesId::generate()).await;
        assert!(matches!(result, Err(Error::ContextNotFound { .. })));
    }

    #[tokio::test]
    async fn outage_maps_to_store_unavailable() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        let window = BatchWindow::starting_now(Duration::minutes(30));
        let result = store.pending_tasks("morning", window).await;
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn persist_record_first_write_wins() {
        let store = InMemoryStore::new();
        let first = CallRecord {
            task_id: CallTaskId::generate(),
            provider_call_id: ProviderCallId::new("prov-1"),
            series_id: SeriesId::generate(),
            transcript: "first".into(),
            summary: String::new(),
            key_insights: vec![],
            action_items: vec![],
            status: crate::record::TerminalStatus::Completed,
            ended_at: None,
            recorded_at: Utc::now(),
        };
        let mut second = first.clone();
        second.transcript = "second".into();

        store.persist_record(&first).await.unwrap();
        store.persist_record(&second).await.unwrap();

        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transcript, "first");
    }
}
