//! Webhook path tests: validation, correlation, idempotence, persistence.

mod common;

use std::sync::Arc;

use outcall_core::{CallTaskId, Error};
use outcall_flow::ingest::{IngestDisposition, WebhookIngestor};
use outcall_flow::record::{
    EventAnalysis, EventCall, EventMessage, EventMetadata, TerminalStatus, WebhookEvent,
    END_OF_CALL_REPORT,
};
use outcall_flow::store::memory::InMemoryStore;
use outcall_flow::store::CallStore;
use outcall_flow::task::CallRequest;

use common::task_in_batch;

fn end_of_call_event(provider_call_id: &str, correlation_id: &str) -> WebhookEvent {
    WebhookEvent {
        message: Some(EventMessage {
            event_type: Some(END_OF_CALL_REPORT.into()),
            call: Some(EventCall {
                id: Some(provider_call_id.into()),
                status: Some("completed".into()),
                transcript: Some("AI: hello\nSubject: hi".into()),
                ended_at: None,
                analysis: Some(EventAnalysis {
                    summary: "pleasant check-in".into(),
                    key_insights: vec!["sleeping better".into()],
                    action_items: vec![],
                }),
                metadata: Some(EventMetadata {
                    task_id: Some(correlation_id.into()),
                    series_id: None,
                }),
            }),
        }),
    }
}

#[tokio::test]
async fn replayed_event_persists_exactly_one_record() {
    let store = Arc::new(InMemoryStore::new());
    let task = task_in_batch("morning", 0);
    store.insert_task(task.clone()).await;
    let ingestor = WebhookIngestor::new(Arc::clone(&store) as Arc<dyn CallStore>);

    let event = end_of_call_event("prov-1", &task.task_id.to_string());

    let first = ingestor.ingest(event.clone()).await.unwrap();
    assert!(matches!(first, IngestDisposition::Persisted { .. }));

    let second = ingestor.ingest(event).await.unwrap();
    assert!(matches!(second, IngestDisposition::Duplicate { .. }));

    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].task_id, task.task_id);
}

#[tokio::test]
async fn correlation_id_round_trips_to_originating_task() {
    let store = Arc::new(InMemoryStore::new());
    let task = task_in_batch("morning", 0);
    store.insert_task(task.clone()).await;

    // The outbound request carries the correlation id...
    let request = CallRequest::from_task(&task, None);
    let echoed = request.correlation_id().to_string();

    // ...and the webhook echoing it resolves to the exact same task.
    let ingestor = WebhookIngestor::new(Arc::clone(&store) as Arc<dyn CallStore>);
    let disposition = ingestor
        .ingest(end_of_call_event("prov-9", &echoed))
        .await
        .unwrap();

    match disposition {
        IngestDisposition::Persisted { task_id, .. } => assert_eq!(task_id, task.task_id),
        other => panic!("expected Persisted, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_correlation_is_acknowledged_with_anomaly() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = WebhookIngestor::new(Arc::clone(&store) as Arc<dyn CallStore>);

    let unknown = CallTaskId::generate().to_string();
    let disposition = ingestor
        .ingest(end_of_call_event("prov-2", &unknown))
        .await
        .unwrap();

    assert_eq!(
        disposition,
        IngestDisposition::UnknownTask {
            correlation_id: unknown.clone()
        }
    );
    assert!(store.records().await.is_empty());

    let anomalies = store.anomalies().await;
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].correlation_id, unknown);
    assert_eq!(anomalies[0].provider_call_id.as_deref(), Some("prov-2"));
}

#[tokio::test]
async fn unparseable_correlation_is_treated_as_unknown() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = WebhookIngestor::new(Arc::clone(&store) as Arc<dyn CallStore>);

    let disposition = ingestor
        .ingest(end_of_call_event("prov-3", "not-a-task-id"))
        .await
        .unwrap();

    assert!(matches!(disposition, IngestDisposition::UnknownTask { .. }));
    assert!(store.records().await.is_empty());
    assert_eq!(store.anomalies().await.len(), 1);
}

#[tokio::test]
async fn missing_provider_call_id_is_bad_payload() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = WebhookIngestor::new(store);

    let mut event = end_of_call_event("prov-4", &CallTaskId::generate().to_string());
    event.message.as_mut().unwrap().call.as_mut().unwrap().id = None;

    let result = ingestor.ingest(event).await;
    assert!(matches!(result, Err(Error::BadPayload { .. })));
}

#[tokio::test]
async fn missing_correlation_metadata_is_bad_payload() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = WebhookIngestor::new(store);

    let mut event = end_of_call_event("prov-5", "ignored");
    event
        .message
        .as_mut()
        .unwrap()
        .call
        .as_mut()
        .unwrap()
        .metadata = None;

    let result = ingestor.ingest(event).await;
    assert!(matches!(result, Err(Error::BadPayload { .. })));
}

#[tokio::test]
async fn store_failure_defers_to_redelivery() {
    let store = Arc::new(InMemoryStore::new());
    let task = task_in_batch("morning", 0);
    store.insert_task(task.clone()).await;
    let ingestor = WebhookIngestor::new(Arc::clone(&store) as Arc<dyn CallStore>);
    let event = end_of_call_event("prov-6", &task.task_id.to_string());

    store.set_unavailable(true);
    let result = ingestor.ingest(event.clone()).await;
    assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    store.set_unavailable(false);
    assert!(store.records().await.is_empty());

    // The provider redelivers after the non-2xx; this time it lands.
    let disposition = ingestor.ingest(event).await.unwrap();
    assert!(matches!(disposition, IngestDisposition::Persisted { .. }));
    assert_eq!(store.records().await.len(), 1);
}

#[tokio::test]
async fn record_captures_transcript_and_analysis() {
    let store = Arc::new(InMemoryStore::new());
    let task = task_in_batch("morning", 0);
    store.insert_task(task.clone()).await;
    let ingestor = WebhookIngestor::new(Arc::clone(&store) as Arc<dyn CallStore>);

    ingestor
        .ingest(end_of_call_event("prov-7", &task.task_id.to_string()))
        .await
        .unwrap();

    let records = store.records().await;
    assert_eq!(records[0].transcript, "AI: hello\nSubject: hi");
    assert_eq!(records[0].summary, "pleasant check-in");
    assert_eq!(records[0].key_insights, vec!["sleeping better".to_string()]);
    assert_eq!(records[0].status, TerminalStatus::Completed);
    assert_eq!(records[0].series_id, task.series_id);
}
