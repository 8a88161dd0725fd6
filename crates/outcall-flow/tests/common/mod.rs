//! Shared fixtures for outcall-flow integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use outcall_core::{CallTaskId, Error, ProviderCallId, Result, SeriesId};
use outcall_flow::context::{ContextPolicy, ConversationContext};
use outcall_flow::provider::VoiceProvider;
use outcall_flow::task::{CallRequest, ScheduledCallTask};

pub fn task_in_batch(label: &str, offset_minutes: i64) -> ScheduledCallTask {
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

pub fn context_for(series_id: SeriesId) -> ConversationContext {
    ConversationContext {
        series_id,
        summary: "spoke yesterday about the garden".into(),
        key_insights: vec!["prefers morning calls".into()],
        action_items: vec!["ask about the appointment".into()],
        context_summary: "Summary: spoke yesterday about the garden".into(),
    }
}

/// Scriptable provider: rejects configured numbers, optionally fails the
/// first N attempts with a transient error, and captures every request.
#[derive(Default)]
pub struct StubProvider {
    pub reject_numbers: HashSet<String>,
    transient_failures_remaining: AtomicU32,
    requests: Mutex<Vec<CallRequest>>,
    sequence: AtomicU32,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(numbers: &[&str]) -> Self {
        Self {
            reject_numbers: numbers.iter().map(|n| (*n).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_transiently(times: u32) -> Self {
        let provider = Self::default();
        provider
            .transient_failures_remaining
            .store(times, Ordering::SeqCst);
        provider
    }

    pub async fn requests(&self) -> Vec<CallRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl VoiceProvider for StubProvider {
    async fn create_call(&self, request: &CallRequest) -> Result<ProviderCallId> {
        if self
            .transient_failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::provider_unavailable("stubbed timeout"));
        }

        if self.reject_numbers.contains(&request.customer_number) {
            return Err(Error::ProviderRejected {
                message: format!("invalid number: {}", request.customer_number),
            });
        }

        self.requests.lock().await.push(request.clone());
        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderCallId::new(format!("prov-{n}")))
    }
}
