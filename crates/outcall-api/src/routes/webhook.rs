//! Inbound webhook route.
//!
//! `POST /v1/webhooks/voice` receives one JSON event per call-completion.
//! The response status is the provider's sole redelivery signal:
//!
//! - `200` — acknowledged (persisted, duplicate, ignored, or unknown task)
//! - `400` — malformed payload; the provider owns resending a correct one
//! - `401` — missing/invalid shared secret
//! - `503` — store failure; the provider should redeliver

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use outcall_core::Error;
use outcall_flow::ingest::IngestDisposition;
use outcall_flow::record::WebhookEvent;

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

/// Header the provider presents the shared secret in.
pub const WEBHOOK_SECRET_HEADER: &str = "x-outcall-webhook-secret";

/// Acknowledgement body returned for every accepted event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    /// What the ingestor did with the event.
    pub status: &'static str,
    /// The originating task, when one was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl From<IngestDisposition> for WebhookAck {
    fn from(disposition: IngestDisposition) -> Self {
        match disposition {
            IngestDisposition::Persisted { task_id, .. } => Self {
                status: "persisted",
                task_id: Some(task_id.to_string()),
            },
            IngestDisposition::Duplicate { .. } => Self {
                status: "duplicate",
                task_id: None,
            },
            IngestDisposition::Ignored { .. } => Self {
                status: "ignored",
                task_id: None,
            },
            IngestDisposition::UnknownTask { .. } => Self {
                status: "unknown_task",
                task_id: None,
            },
        }
    }
}

/// Webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/voice", post(receive_event))
}

async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<WebhookEvent>,
) -> ApiResult<Json<WebhookAck>> {
    if let Some(expected) = &state.config.webhook_secret {
        let presented = headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());
        if presented != Some(expected.as_str()) {
            return Err(ApiError::unauthorized("missing or invalid webhook secret"));
        }
    }

    match state.ingestor.ingest(event).await {
        Ok(disposition) => Ok(Json(WebhookAck::from(disposition))),
        Err(error @ Error::BadPayload { .. }) => Err(ApiError::bad_request(error.to_string())),
        Err(error @ Error::StoreUnavailable { .. }) => {
            tracing::error!(error = %error, "webhook persistence failed, requesting redelivery");
            Err(ApiError::service_unavailable(error.to_string()))
        }
        Err(error) => {
            tracing::error!(error = %error, "unexpected ingest failure");
            Err(ApiError::internal(error.to_string()))
        }
    }
}
