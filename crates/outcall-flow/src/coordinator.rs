//! Fan-out coordination: one isolated pipeline per task, bounded retries,
//! partial-failure-tolerant aggregation.
//!
//! The coordinator's contract is isolation and accounting, not scheduling:
//! it loads the batch, packages each task's two-step pipeline (claim +
//! fetch context, then initiate call) as a [`UnitOfWork`], hands the set to
//! the executor, and folds the outcomes into a [`BatchSummary`]. One
//! outcome comes back per loaded task, always.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::Instrument;

use outcall_core::observability::{batch_span, task_span};
use outcall_core::{Error, Result};

use crate::context::ContextPolicy;
use crate::executor::{UnitExecutor, UnitOfWork};
use crate::loader::{BatchLoader, BatchWindow};
use crate::provider::VoiceProvider;
use crate::store::CallStore;
use crate::summary::BatchSummary;
use crate::task::{CallOutcome, CallRequest, ScheduledCallTask, SkipReason};

/// Bounded retry policy for transient failures.
///
/// Applies only to failure kinds whose [`Error::is_retryable`] is true;
/// rejection-class failures terminate the task's pipeline on first sight.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts per step (first attempt included).
    pub max_attempts: u32,
    /// Base backoff, doubled per attempt.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Returns the backoff to sleep after a failed attempt (1-indexed).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff * 2_u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Drives the per-task pipelines for one batch.
pub struct FanOutCoordinator {
    store: Arc<dyn CallStore>,
    provider: Arc<dyn VoiceProvider>,
    executor: Arc<dyn UnitExecutor>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for FanOutCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutCoordinator")
            .field("retry", &self.retry)
            .finish()
    }
}

impl FanOutCoordinator {
    /// Creates a coordinator over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn CallStore>,
        provider: Arc<dyn VoiceProvider>,
        executor: Arc<dyn UnitExecutor>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            provider,
            executor,
            retry,
        }
    }

    /// Runs one batch: load, fan out, aggregate.
    ///
    /// # Errors
    ///
    /// Fails only when the batch itself cannot be loaded
    /// (`StoreUnavailable`); per-task failures are absorbed into the
    /// summary, never propagated.
    pub async fn run_batch(&self, batch_label: &str, window: BatchWindow) -> Result<BatchSummary> {
        async {
            let tasks = BatchLoader::new(self.store.as_ref())
                .load(batch_label, window)
                .await?;

            let units: Vec<UnitOfWork> =
                tasks.into_iter().map(|task| self.unit_for(task)).collect();
            let outcomes = self.executor.run_all(units).await;

            for outcome in &outcomes {
                let kind = match outcome {
                    CallOutcome::Initiated { .. } => "initiated",
                    CallOutcome::Skipped { .. } => "skipped",
                    CallOutcome::Failed { .. } => "failed",
                };
                counter!("outcall_batch_outcomes_total", "kind" => kind).increment(1);
            }

            let summary = BatchSummary::from_outcomes(batch_label, &outcomes);
            tracing::info!(
                batch = batch_label,
                loaded = summary.loaded,
                initiated = summary.initiated,
                skipped = summary.skipped,
                failed = summary.failed,
                "batch run complete"
            );
            Ok(summary)
        }
        .instrument(batch_span(batch_label))
        .await
    }

    /// Packages one task's pipeline as a re-invokable unit of work.
    ///
    /// The pipeline claims the task first, so a re-invocation (orchestrator
    /// crash replay) short-circuits to a skip instead of double-initiating.
    fn unit_for(&self, task: ScheduledCallTask) -> UnitOfWork {
        let store = Arc::clone(&self.store);
        let provider = Arc::clone(&self.provider);
        let retry = self.retry;
        let task_id = task.task_id;

        UnitOfWork::new(task_id, move || {
            let store = Arc::clone(&store);
            let provider = Arc::clone(&provider);
            let task = task.clone();
            let span = task_span(&task_id.to_string(), &task.batch_label);
            Box::pin(run_pipeline(store, provider, retry, task).instrument(span))
        })
    }
}

/// The two-step pipeline for one task. Never returns an error: every
/// failure folds into the task's own outcome.
async fn run_pipeline(
    store: Arc<dyn CallStore>,
    provider: Arc<dyn VoiceProvider>,
    retry: RetryPolicy,
    task: ScheduledCallTask,
) -> CallOutcome {
    let task_id = task.task_id;

    // Claim marker: the store-side idempotency guard across batch retries.
    let claim = with_retries(retry, "claim_task", || store.claim_task(&task_id)).await;
    match claim {
        Ok(result) if !result.is_claimed() => {
            tracing::info!(task = %task_id, "task already claimed, skipping");
            return CallOutcome::Skipped {
                task_id,
                reason: SkipReason::AlreadyClaimed,
            };
        }
        Ok(_) => {}
        Err(error) => return CallOutcome::Failed { task_id, error },
    }

    // Step 1: fetch the latest context. NotFound is an expected state.
    let context = match with_retries(retry, "fetch_context", || {
        store.fetch_context(&task.series_id)
    })
    .await
    {
        Ok(context) => Some(context),
        Err(Error::ContextNotFound { .. }) => {
            if task.context_policy == ContextPolicy::Required {
                tracing::info!(task = %task_id, "required context missing, skipping");
                return CallOutcome::Skipped {
                    task_id,
                    reason: SkipReason::MissingRequiredContext,
                };
            }
            tracing::debug!(task = %task_id, "no prior context, proceeding with default");
            None
        }
        Err(error) => return CallOutcome::Failed { task_id, error },
    };

    // Step 2: initiate the call.
    let request = CallRequest::from_task(&task, context.as_ref());
    match with_retries(retry, "create_call", || provider.create_call(&request)).await {
        Ok(provider_call_id) => {
            tracing::info!(task = %task_id, provider_call = %provider_call_id, "call initiated");
            CallOutcome::Initiated {
                task_id,
                provider_call_id,
            }
        }
        Err(error) => {
            tracing::warn!(task = %task_id, error = %error, "call initiation failed");
            CallOutcome::Failed { task_id, error }
        }
    }
}

/// Runs an operation with bounded retries for retryable failure kinds.
async fn with_retries<T, F, Fut>(policy: RetryPolicy, op: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < policy.max_attempts => {
                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    op,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %error,
                    "transient failure, retrying"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
