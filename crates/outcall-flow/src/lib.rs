//! # outcall-flow
//!
//! Orchestration domain for the Outcall outbound voice-call system.
//!
//! This crate implements the two independent flows of the system:
//!
//! - **Batch path**: load the call tasks due in a batch window, fan out a
//!   two-step pipeline per task (fetch conversation context, initiate the
//!   call), tolerate per-task failure, and aggregate outcomes into a
//!   summary
//! - **Webhook path**: validate, deduplicate, and reconcile the provider's
//!   call-completion events back to the originating tasks, persisting one
//!   call record per completed call
//!
//! ## Core Concepts
//!
//! - **Task**: one scheduled outbound call, created upstream and read-only here
//! - **Batch**: all tasks due in a labeled time window (e.g. "morning")
//! - **Correlation ID**: the task ID embedded in every outbound call request
//!   and echoed by the completion webhook, linking the two flows
//!
//! ## Guarantees
//!
//! - One [`task::CallOutcome`] per loaded task, always — no silent drops
//! - One task's failure never blocks or aborts another's pipeline
//! - Replayed webhook deliveries persist at most one [`record::CallRecord`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use outcall_flow::coordinator::{FanOutCoordinator, RetryPolicy};
//! use outcall_flow::executor::TokioExecutor;
//! use outcall_flow::loader::BatchWindow;
//! use outcall_flow::provider::http::HttpVoiceProvider;
//! use outcall_flow::store::memory::InMemoryStore;
//!
//! # async fn run() -> outcall_core::Result<()> {
//! let store = Arc::new(InMemoryStore::new());
//! let provider = Arc::new(HttpVoiceProvider::new("https://api.example.com", "api-key"));
//! let executor = Arc::new(TokioExecutor::new(8));
//!
//! let coordinator =
//!     FanOutCoordinator::new(store, provider, executor, RetryPolicy::default());
//! let summary = coordinator
//!     .run_batch("morning", BatchWindow::starting_now(chrono::Duration::minutes(30)))
//!     .await?;
//! println!("initiated {} of {}", summary.initiated, summary.loaded);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod context;
pub mod coordinator;
pub mod executor;
pub mod ingest;
pub mod loader;
pub mod provider;
pub mod record;
pub mod store;
pub mod summary;
pub mod task;
