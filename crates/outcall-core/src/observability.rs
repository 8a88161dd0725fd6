//! Observability infrastructure for Outcall.
//!
//! Structured logging with consistent spans across the batch and webhook
//! paths. This module provides initialization helpers and span constructors
//! so both paths tag their work the same way.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `outcall_flow=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for one batch run.
#[must_use]
pub fn batch_span(batch_label: &str) -> Span {
    tracing::info_span!("batch", label = batch_label)
}

/// Creates a span for one task's fetch-context/initiate-call pipeline.
#[must_use]
pub fn task_span(task_id: &str, batch_label: &str) -> Span {
    tracing::info_span!("call_task", task = task_id, batch = batch_label)
}

/// Creates a span for one inbound webhook event.
#[must_use]
pub fn ingest_span(provider_call_id: &str) -> Span {
    tracing::info_span!("ingest", provider_call = provider_call_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Json);
    }

    #[test]
    fn spans_are_constructible_without_subscriber() {
        let _batch = batch_span("morning");
        let _task = task_span("01ARZ3", "morning");
        let _ingest = ingest_span("prov-1");
    }
}
