//! Conversation context: the briefing data a call is placed with.

use serde::{Deserialize, Serialize};

use outcall_core::SeriesId;

/// The latest prior-conversation briefing for an interview series.
///
/// Owned by the store; fetched fresh per task and never cached across
/// batches, so every call reflects the latest state at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    /// The series this context belongs to.
    pub series_id: SeriesId,
    /// Summary of the most recent conversation.
    pub summary: String,
    /// Key insights extracted from prior calls.
    pub key_insights: Vec<String>,
    /// Open action items carried into the next call.
    pub action_items: Vec<String>,
    /// Pre-rendered briefing text combining the fields above.
    pub context_summary: String,
}

impl ConversationContext {
    /// Returns the text injected into the assistant as the previous-context
    /// variable: the rendered summary when present, the raw summary
    /// otherwise.
    #[must_use]
    pub fn briefing(&self) -> String {
        if self.context_summary.is_empty() {
            self.summary.clone()
        } else {
            self.context_summary.clone()
        }
    }
}

/// Whether an assistant can place a call without prior context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPolicy {
    /// Proceed with empty/default context when none exists.
    #[default]
    Optional,
    /// Skip the task when no prior context exists.
    Required,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn briefing_prefers_rendered_summary() {
        let context = ConversationContext {
            series_id: SeriesId::generate(),
            summary: "short".into(),
            key_insights: vec!["likes mornings".into()],
            action_items: vec![],
            context_summary: "Summary: short\n\nKey Insights: likes mornings".into(),
        };
        assert!(context.briefing().starts_with("Summary:"));
    }

    #[test]
    fn briefing_falls_back_to_summary() {
        let context = ConversationContext {
            series_id: SeriesId::generate(),
            summary: "short".into(),
            key_insights: vec![],
            action_items: vec![],
            context_summary: String::new(),
        };
        assert_eq!(context.briefing(), "short");
    }

    #[test]
    fn policy_defaults_to_optional() {
        assert_eq!(ContextPolicy::default(), ContextPolicy::Optional);
    }
}
