//! Scheduled call tasks, outbound call requests, and per-task outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use outcall_core::{CallTaskId, Error, ProviderCallId, SeriesId};

use crate::context::{ContextPolicy, ConversationContext};

/// One call to be placed, as scheduled by the upstream process.
///
/// Read-only to this crate: tasks are created and owned by the scheduling
/// process, the orchestrator only references them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCallTask {
    /// Unique task identifier; doubles as the correlation ID.
    pub task_id: CallTaskId,
    /// When the call is due.
    pub scheduled_at: DateTime<Utc>,
    /// The subject's phone number in E.164 form.
    pub customer_number: String,
    /// Which voice persona places the call.
    pub assistant_id: String,
    /// Provider-side caller line the call goes out on.
    pub phone_number_id: String,
    /// Interview series this call belongs to.
    pub series_id: SeriesId,
    /// Series-specific prompt parameter set.
    pub prompt_name: String,
    /// Which schedule the task belongs to (e.g. "morning").
    pub batch_label: String,
    /// Whether the assistant requires prior context to place the call.
    #[serde(default)]
    pub context_policy: ContextPolicy,
}

/// Correlation metadata attached to every outbound call request.
///
/// The provider echoes this back in the completion webhook, which is the
/// invariant that makes reconciliation possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMetadata {
    /// The originating task ID.
    pub task_id: CallTaskId,
    /// The interview series the call belongs to.
    pub series_id: SeriesId,
}

/// An outbound call request, ready for submission to the voice provider.
///
/// Only constructible through [`CallRequest::from_task`], so the correlation
/// metadata can never be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// The subject's phone number.
    pub customer_number: String,
    /// Voice persona to use.
    pub assistant_id: String,
    /// Provider-side caller line.
    pub phone_number_id: String,
    /// Prior-conversation briefing injected into the assistant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_context: Option<String>,
    /// Mandatory correlation metadata.
    pub metadata: CorrelationMetadata,
}

impl CallRequest {
    /// Builds a call request from a task and its (possibly absent) context.
    #[must_use]
    pub fn from_task(task: &ScheduledCallTask, context: Option<&ConversationContext>) -> Self {
        Self {
            customer_number: task.customer_number.clone(),
            assistant_id: task.assistant_id.clone(),
            phone_number_id: task.phone_number_id.clone(),
            previous_context: context.map(ConversationContext::briefing),
            metadata: CorrelationMetadata {
                task_id: task.task_id,
                series_id: task.series_id,
            },
        }
    }

    /// Returns the correlation ID this request carries.
    #[must_use]
    pub const fn correlation_id(&self) -> CallTaskId {
        self.metadata.task_id
    }
}

/// Why a task was skipped rather than attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The task was already claimed by a previous batch run.
    AlreadyClaimed,
    /// The assistant requires prior context and none exists.
    MissingRequiredContext,
}

impl SkipReason {
    /// Stable label for summaries and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyClaimed => "already_claimed",
            Self::MissingRequiredContext => "missing_required_context",
        }
    }
}

/// Per-task result of the fan-out step.
///
/// Exists only for the batch's lifetime; the summary reporter consumes it.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// The call was submitted to the provider.
    Initiated {
        /// The originating task.
        task_id: CallTaskId,
        /// The provider-assigned call ID.
        provider_call_id: ProviderCallId,
    },
    /// The task was deliberately not attempted.
    Skipped {
        /// The originating task.
        task_id: CallTaskId,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// The pipeline failed after exhausting any applicable retries.
    Failed {
        /// The originating task.
        task_id: CallTaskId,
        /// The terminal error.
        error: Error,
    },
}

impl CallOutcome {
    /// Returns the task this outcome belongs to.
    #[must_use]
    pub const fn task_id(&self) -> CallTaskId {
        match self {
            Self::Initiated { task_id, .. }
            | Self::Skipped { task_id, .. }
            | Self::Failed { task_id, .. } => *task_id,
        }
    }

    /// Returns true if the call was submitted to the provider.
    #[must_use]
    pub const fn is_initiated(&self) -> bool {
        matches!(self, Self::Initiated { .. })
    }
}
