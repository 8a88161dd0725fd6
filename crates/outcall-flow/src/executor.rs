//! Unit-of-work execution boundary.
//!
//! The coordinator does not run task pipelines itself: it packages each
//! task's pipeline as a [`UnitOfWork`] and hands the set to a
//! [`UnitExecutor`]. The executor owns the concurrency substrate — an
//! in-process tokio pool here, a durable-execution service in deployments
//! that need crash recovery. Units must be safe to re-invoke, since a
//! durable substrate may replay a step after a crash.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use outcall_core::{CallTaskId, Error};

use crate::task::CallOutcome;

/// The boxed future a unit of work produces per invocation.
pub type UnitFuture = Pin<Box<dyn Future<Output = CallOutcome> + Send>>;

/// One independently runnable, re-invokable task pipeline.
///
/// Holds a factory rather than a future so the substrate can invoke the
/// work again after a crash; each invocation produces a fresh future.
pub struct UnitOfWork {
    task_id: CallTaskId,
    work: Box<dyn Fn() -> UnitFuture + Send + Sync>,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("task_id", &self.task_id)
            .finish()
    }
}

impl UnitOfWork {
    /// Packages a pipeline factory as a unit of work.
    pub fn new(
        task_id: CallTaskId,
        work: impl Fn() -> UnitFuture + Send + Sync + 'static,
    ) -> Self {
        Self {
            task_id,
            work: Box::new(work),
        }
    }

    /// The task this unit belongs to.
    #[must_use]
    pub const fn task_id(&self) -> CallTaskId {
        self.task_id
    }

    /// Starts one invocation of the work.
    #[must_use]
    pub fn invoke(&self) -> UnitFuture {
        (self.work)()
    }
}

/// Execution substrate for a batch's units of work.
///
/// Implementations must return exactly one outcome per unit, in the order
/// the units were given, and must never let one unit's failure abort
/// another's.
#[async_trait]
pub trait UnitExecutor: Send + Sync {
    /// Runs all units concurrently and collects their outcomes.
    async fn run_all(&self, units: Vec<UnitOfWork>) -> Vec<CallOutcome>;
}

/// In-process executor backed by the tokio runtime.
///
/// Spawns each unit as its own task so a panic in one pipeline is isolated
/// and surfaces as a `Failed` outcome instead of tearing down the batch.
/// Concurrency is bounded by a semaphore.
#[derive(Debug)]
pub struct TokioExecutor {
    permits: Arc<Semaphore>,
}

impl TokioExecutor {
    /// Creates an executor running at most `concurrency` units at once.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }
}

#[async_trait]
impl UnitExecutor for TokioExecutor {
    async fn run_all(&self, units: Vec<UnitOfWork>) -> Vec<CallOutcome> {
        let handles: Vec<_> = units
            .into_iter()
            .map(|unit| {
                let permits = Arc::clone(&self.permits);
                let task_id = unit.task_id();
                let handle = tokio::spawn(async move {
                    // Semaphore is never closed, acquire cannot fail.
                    let _permit = permits.acquire().await;
                    unit.invoke().await
                });
                (task_id, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (task_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => CallOutcome::Failed {
                    task_id,
                    error: Error::internal(format!("task pipeline panicked: {join_error}")),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
