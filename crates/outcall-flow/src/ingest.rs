//! Webhook ingestion: validate, resolve, deduplicate, persist.
//!
//! The ingestor is transport-free; the HTTP adapter in `outcall-api` maps
//! its results onto status codes. Per inbound event the state machine is:
//!
//! 1. **Validate** payload shape — missing required fields fail fast with
//!    `BadPayload`; non-terminal event types are acknowledged and ignored
//! 2. **Resolve** the correlation ID to a known task — unresolvable IDs are
//!    recorded as anomalies, never crashes, and no record is written
//! 3. **Deduplicate** — an existing record for the provider call ID means a
//!    redelivery; acknowledge without rewriting
//! 4. **Persist** — a store failure here propagates so the caller returns
//!    non-2xx and the provider redelivers

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::Instrument;

use outcall_core::observability::ingest_span;
use outcall_core::{CallTaskId, Error, ProviderCallId, Result};

use crate::record::{
    AnomalyRecord, CallRecord, EventCall, TerminalStatus, WebhookEvent, END_OF_CALL_REPORT,
};
use crate::store::CallStore;
use crate::task::ScheduledCallTask;

/// What the ingestor did with an event.
///
/// Everything here is an acknowledgement; redelivery-worthy failures are
/// `Err` values instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestDisposition {
    /// A new call record was persisted.
    Persisted {
        /// The originating task.
        task_id: CallTaskId,
        /// The provider call the record belongs to.
        provider_call_id: ProviderCallId,
    },
    /// A record already existed for this provider call ID.
    Duplicate {
        /// The provider call ID that was redelivered.
        provider_call_id: ProviderCallId,
    },
    /// The event type is not a terminal report; nothing to do.
    Ignored {
        /// The event type that was ignored.
        event_type: String,
    },
    /// The correlation ID did not resolve; anomaly recorded, no record
    /// written.
    UnknownTask {
        /// The unresolvable correlation ID.
        correlation_id: String,
    },
}

/// Processes inbound provider events against the store.
pub struct WebhookIngestor {
    store: Arc<dyn CallStore>,
}

impl std::fmt::Debug for WebhookIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookIngestor").finish()
    }
}

impl WebhookIngestor {
    /// Creates an ingestor over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn CallStore>) -> Self {
        Self { store }
    }

    /// Runs one event through the state machine.
    ///
    /// # Errors
    ///
    /// - [`Error::BadPayload`] when required fields are missing — the
    ///   provider owns resending a well-formed payload
    /// - [`Error::StoreUnavailable`] when persistence fails — the caller
    ///   must not acknowledge, so the provider redelivers
    pub async fn ingest(&self, event: WebhookEvent) -> Result<IngestDisposition> {
        // --- Validate ---
        let message = event
            .message
            .ok_or_else(|| Error::bad_payload("missing message envelope"))?;
        let event_type = message
            .event_type
            .ok_or_else(|| Error::bad_payload("missing event type"))?;

        if event_type != END_OF_CALL_REPORT {
            tracing::debug!(event_type, "ignoring non-terminal event");
            counter!("outcall_ingest_total", "disposition" => "ignored").increment(1);
            return Ok(IngestDisposition::Ignored { event_type });
        }

        let call = message
            .call
            .ok_or_else(|| Error::bad_payload("missing call details"))?;
        let provider_call_id = call
            .id
            .clone()
            .map(ProviderCallId::new)
            .ok_or_else(|| Error::bad_payload("missing provider call id"))?;
        let correlation_id = call
            .metadata
            .as_ref()
            .and_then(|m| m.task_id.clone())
            .ok_or_else(|| Error::bad_payload("missing correlation metadata"))?;

        self.reconcile(call, provider_call_id.clone(), correlation_id)
            .instrument(ingest_span(provider_call_id.as_str()))
            .await
    }

    /// Resolve, deduplicate, persist. Split out so the whole reconciliation
    /// runs inside the ingest span.
    async fn reconcile(
        &self,
        call: EventCall,
        provider_call_id: ProviderCallId,
        correlation_id: String,
    ) -> Result<IngestDisposition> {
        // --- Resolve ---
        let task = match self.resolve(&correlation_id).await? {
            Some(task) => task,
            None => {
                let anomaly = AnomalyRecord {
                    correlation_id: correlation_id.clone(),
                    provider_call_id: Some(provider_call_id.to_string()),
                    reason: "webhook correlation id resolved to no known task".into(),
                    observed_at: Utc::now(),
                };
                self.store.record_anomaly(&anomaly).await?;
                tracing::warn!(
                    correlation = correlation_id,
                    provider_call = %provider_call_id,
                    "unknown task anomaly recorded"
                );
                counter!("outcall_ingest_total", "disposition" => "unknown_task").increment(1);
                return Ok(IngestDisposition::UnknownTask { correlation_id });
            }
        };

        // --- Idempotency check ---
        // All persisted records are terminal, so any hit means redelivery.
        if self.store.find_record(&provider_call_id).await?.is_some() {
            tracing::info!(provider_call = %provider_call_id, "duplicate delivery, acknowledging");
            counter!("outcall_ingest_total", "disposition" => "duplicate").increment(1);
            return Ok(IngestDisposition::Duplicate { provider_call_id });
        }

        // --- Persist ---
        let record = build_record(&task, provider_call_id.clone(), call);
        self.store.persist_record(&record).await?;
        tracing::info!(
            task = %task.task_id,
            provider_call = %provider_call_id,
            "call record persisted"
        );
        counter!("outcall_ingest_total", "disposition" => "persisted").increment(1);
        Ok(IngestDisposition::Persisted {
            task_id: task.task_id,
            provider_call_id,
        })
    }

    /// Maps a correlation string to a known task, treating a parse failure
    /// the same as a lookup miss: unresolvable.
    async fn resolve(&self, correlation_id: &str) -> Result<Option<ScheduledCallTask>> {
        let Ok(task_id) = CallTaskId::from_str(correlation_id) else {
            return Ok(None);
        };
        self.store.resolve_task(&task_id).await
    }
}

fn build_record(
    task: &ScheduledCallTask,
    provider_call_id: ProviderCallId,
    call: EventCall,
) -> CallRecord {
    let analysis = call.analysis.unwrap_or_default();
    CallRecord {
        task_id: task.task_id,
        provider_call_id,
        series_id: task.series_id,
        transcript: call.transcript.unwrap_or_default(),
        summary: analysis.summary,
        key_insights: analysis.key_insights,
        action_items: analysis.action_items,
        status: TerminalStatus::from_provider(call.status.as_deref()),
        ended_at: call.ended_at,
        recorded_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EventAnalysis, EventMessage, EventMetadata};

    fn event_with_type(event_type: &str) -> WebhookEvent {
        WebhookEvent {
            message: Some(EventMessage {
                event_type: Some(event_type.into()),
                call: None,
            }),
        }
    }

    #[tokio::test]
    async fn missing_envelope_is_bad_payload() {
        let store = Arc::new(crate::store::memory::InMemoryStore::new());
        let ingestor = WebhookIngestor::new(store);

        let result = ingestor.ingest(WebhookEvent { message: None }).await;
        assert!(matches!(result, Err(Error::BadPayload { .. })));
    }

    #[tokio::test]
    async fn non_terminal_event_is_ignored() {
        let store = Arc::new(crate::store::memory::InMemoryStore::new());
        let ingestor = WebhookIngestor::new(store);

        let disposition = ingestor
            .ingest(event_with_type("status-update"))
            .await
            .unwrap();
        assert_eq!(
            disposition,
            IngestDisposition::Ignored {
                event_type: "status-update".into()
            }
        );
    }

    #[tokio::test]
    async fn terminal_event_without_call_is_bad_payload() {
        let store = Arc::new(crate::store::memory::InMemoryStore::new());
        let ingestor = WebhookIngestor::new(store);

        let result = ingestor.ingest(event_with_type(END_OF_CALL_REPORT)).await;
        assert!(matches!(result, Err(Error::BadPayload { .. })));
    }

    #[test]
    fn build_record_fills_defaults() {
        let task = ScheduledCallTask {
            task_id: CallTaskId::generate(),
            scheduled_at: Utc::now(),
            customer_number: "+61467807718".into(),
            assistant_id: "assistant-1".into(),
            phone_number_id: "line-1".into(),
            series_id: outcall_core::SeriesId::generate(),
            prompt_name: "daily-checkin".into(),
            batch_label: "morning".into(),
            context_policy: crate::context::ContextPolicy::Optional,
        };
        let call = EventCall {
            id: Some("prov-1".into()),
            status: None,
            transcript: None,
            ended_at: None,
            analysis: Some(EventAnalysis {
                summary: "fine".into(),
                key_insights: vec![],
                action_items: vec![],
            }),
            metadata: Some(EventMetadata {
                task_id: Some(task.task_id.to_string()),
                series_id: None,
            }),
        };

        let record = build_record(&task, ProviderCallId::new("prov-1"), call);
        assert_eq!(record.task_id, task.task_id);
        assert_eq!(record.transcript, "");
        assert_eq!(record.summary, "fine");
        assert_eq!(record.status, TerminalStatus::Completed);
    }
}
