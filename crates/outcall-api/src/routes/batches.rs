//! Batch trigger route.
//!
//! `POST /v1/batches/{label}/run` is the trigger boundary: the external
//! scheduler fires it when a batch is due and receives the summary. Timing
//! is owned by the scheduler, not this service.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use outcall_flow::loader::BatchWindow;
use outcall_flow::summary::BatchSummary;

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

/// Optional window override in the trigger body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBatchRequest {
    /// Inclusive window start; defaults to now.
    pub window_start: Option<DateTime<Utc>>,
    /// Exclusive window end; defaults to start + configured window length.
    pub window_end: Option<DateTime<Utc>>,
}

/// Batch routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/batches/{label}/run", post(run_batch))
}

async fn run_batch(
    State(state): State<AppState>,
    Path(label): Path<String>,
    body: Option<Json<RunBatchRequest>>,
) -> ApiResult<Json<BatchSummary>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let window = resolve_window(&request, state.config.batch_window_minutes)?;

    let summary = state.coordinator.run_batch(&label, window).await?;
    Ok(Json(summary))
}

fn resolve_window(request: &RunBatchRequest, default_minutes: i64) -> ApiResult<BatchWindow> {
    let start = request.window_start.unwrap_or_else(Utc::now);
    let end = request
        .window_end
        .unwrap_or_else(|| start + Duration::minutes(default_minutes));
    if end <= start {
        return Err(ApiError::bad_request("window end must be after start"));
    }
    Ok(BatchWindow::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_window_spans_configured_minutes() {
        let window = resolve_window(&RunBatchRequest::default(), 30).unwrap();
        assert_eq!(window.end - window.start, Duration::minutes(30));
    }

    #[test]
    fn explicit_window_is_honored() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 9, 45, 0).unwrap();
        let request = RunBatchRequest {
            window_start: Some(start),
            window_end: Some(end),
        };
        let window = resolve_window(&request, 30).unwrap();
        assert_eq!(window.start, start);
        assert_eq!(window.end, end);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let request = RunBatchRequest {
            window_start: Some(start),
            window_end: Some(start - Duration::minutes(5)),
        };
        assert!(resolve_window(&request, 30).is_err());
    }
}
