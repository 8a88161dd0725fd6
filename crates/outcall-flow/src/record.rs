//! Inbound webhook events and the persisted call records they become.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use outcall_core::{CallTaskId, ProviderCallId, SeriesId};

/// The event type the provider sends once per terminal call state.
pub const END_OF_CALL_REPORT: &str = "end-of-call-report";

/// A raw inbound provider payload.
///
/// Every field is optional at this level: the provider controls the wire
/// shape, and validation happens in the ingestor so a malformed body maps
/// to a `BadPayload` error instead of a deserialization panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// The event envelope.
    pub message: Option<EventMessage>,
}

/// The provider's event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    /// Event type discriminator (e.g. `end-of-call-report`).
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// The call the event describes.
    pub call: Option<EventCall>,
}

/// Call details carried by a webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCall {
    /// Provider-assigned call ID.
    pub id: Option<String>,
    /// Terminal status as reported by the provider.
    pub status: Option<String>,
    /// Full conversation transcript.
    pub transcript: Option<String>,
    /// When the call ended.
    pub ended_at: Option<DateTime<Utc>>,
    /// Post-call analysis produced by the provider.
    pub analysis: Option<EventAnalysis>,
    /// Correlation metadata echoing what the call request carried.
    pub metadata: Option<EventMetadata>,
}

/// Provider-side post-call analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalysis {
    /// One-paragraph summary of the call.
    #[serde(default)]
    pub summary: String,
    /// Key insights extracted from the conversation.
    #[serde(default)]
    pub key_insights: Vec<String>,
    /// Action items for the next call.
    #[serde(default)]
    pub action_items: Vec<String>,
}

/// Correlation metadata echoed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// The originating task ID, as a string.
    pub task_id: Option<String>,
    /// The interview series, as a string.
    pub series_id: Option<String>,
}

/// A call's terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    /// The call ran to completion.
    Completed,
    /// The subject did not answer.
    NoAnswer,
    /// The call failed mid-flight.
    Failed,
}

impl TerminalStatus {
    /// Maps the provider's status string; anything unrecognized counts as
    /// completed since the provider only reports terminal states here.
    #[must_use]
    pub fn from_provider(status: Option<&str>) -> Self {
        match status {
            Some("no-answer") => Self::NoAnswer,
            Some("failed") => Self::Failed,
            _ => Self::Completed,
        }
    }
}

/// The persisted record of one completed call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// The originating task.
    pub task_id: CallTaskId,
    /// Provider-assigned call ID.
    pub provider_call_id: ProviderCallId,
    /// The interview series the call belongs to.
    pub series_id: SeriesId,
    /// Full conversation transcript.
    pub transcript: String,
    /// Post-call summary.
    pub summary: String,
    /// Key insights extracted from the call.
    pub key_insights: Vec<String>,
    /// Action items for the next call.
    pub action_items: Vec<String>,
    /// Terminal status reported by the provider.
    pub status: TerminalStatus,
    /// When the call ended, if the provider reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// When this record was written.
    pub recorded_at: DateTime<Utc>,
}

/// A reportable reconciliation anomaly, persisted for alerting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    /// The correlation ID that failed to resolve.
    pub correlation_id: String,
    /// The provider call ID the event carried, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_call_id: Option<String>,
    /// Human-readable description of the anomaly.
    pub reason: String,
    /// When the anomaly was observed.
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_status_maps_provider_strings() {
        assert_eq!(
            TerminalStatus::from_provider(Some("no-answer")),
            TerminalStatus::NoAnswer
        );
        assert_eq!(
            TerminalStatus::from_provider(Some("failed")),
            TerminalStatus::Failed
        );
        assert_eq!(
            TerminalStatus::from_provider(Some("ended")),
            TerminalStatus::Completed
        );
        assert_eq!(TerminalStatus::from_provider(None), TerminalStatus::Completed);
    }

    #[test]
    fn webhook_event_tolerates_missing_fields() {
        let event: WebhookEvent = serde_json::from_str(r#"{"message": {"type": null}}"#).unwrap();
        assert!(event.message.unwrap().event_type.is_none());

        let empty: WebhookEvent = serde_json::from_str("{}").unwrap();
        assert!(empty.message.is_none());
    }

    #[test]
    fn webhook_event_parses_provider_shape() {
        let body = r#"{
            "message": {
                "type": "end-of-call-report",
                "call": {
                    "id": "prov-123",
                    "transcript": "hello",
                    "analysis": {"summary": "went well"},
                    "metadata": {"taskId": "01ARZ3NDEKTSV4RRFFQ69G5FAV"}
                }
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(body).unwrap();
        let call = event.message.unwrap().call.unwrap();
        assert_eq!(call.id.as_deref(), Some("prov-123"));
        assert_eq!(call.analysis.unwrap().summary, "went well");
        assert_eq!(
            call.metadata.unwrap().task_id.as_deref(),
            Some("01ARZ3NDEKTSV4RRFFQ69G5FAV")
        );
    }
}
