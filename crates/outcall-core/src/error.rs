//! Error taxonomy for the Outcall orchestrator.
//!
//! Every failure mode in the system maps to exactly one variant here, and
//! each variant has a fixed retryability classification. The fan-out
//! coordinator consults [`Error::is_retryable`] when deciding whether a
//! failed task step gets another attempt.

/// The result type used throughout Outcall crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while orchestrating calls or ingesting webhooks.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The backing store could not be reached (transient, retryable).
    #[error("store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the access failure.
        message: String,
    },

    /// The voice-call provider could not be reached or returned a
    /// server-side error (transient, retryable).
    #[error("provider unavailable: {message}")]
    ProviderUnavailable {
        /// Description of the failure.
        message: String,
    },

    /// The voice-call provider rejected the request (caller/config error,
    /// not retryable).
    #[error("provider rejected call request: {message}")]
    ProviderRejected {
        /// The provider's rejection reason.
        message: String,
    },

    /// An inbound payload failed shape validation (not retryable).
    #[error("bad payload: {message}")]
    BadPayload {
        /// What was missing or malformed.
        message: String,
    },

    /// A webhook's correlation ID did not resolve to any known task.
    ///
    /// This is an anomaly: recorded and reported, never a crash.
    #[error("unknown task for correlation id: {correlation_id}")]
    UnknownTask {
        /// The correlation ID that could not be resolved.
        correlation_id: String,
    },

    /// No conversation context exists for a series (expected, non-fatal).
    #[error("no context found for series: {series_id}")]
    ContextNotFound {
        /// The interview-series ID that had no prior context.
        series_id: String,
    },

    /// An identifier failed to parse.
    #[error("invalid id: {message}")]
    InvalidId {
        /// Description of the parse failure.
        message: String,
    },

    /// Configuration was missing or unparseable at startup.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Which setting was wrong and why.
        message: String,
    },

    /// An internal invariant was violated (programming error).
    #[error("internal error: {message}")]
    Internal {
        /// Description of the violation.
        message: String,
    },
}

impl Error {
    /// Returns true if this failure kind is transient and eligible for a
    /// bounded retry at the unit-of-work boundary.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::ProviderUnavailable { .. }
        )
    }

    /// Returns a stable machine-readable kind label for summaries and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::ProviderRejected { .. } => "provider_rejected",
            Self::BadPayload { .. } => "bad_payload",
            Self::UnknownTask { .. } => "unknown_task",
            Self::ContextNotFound { .. } => "context_not_found",
            Self::InvalidId { .. } => "invalid_id",
            Self::InvalidConfig { .. } => "invalid_config",
            Self::Internal { .. } => "internal",
        }
    }

    /// Shorthand for a [`Error::StoreUnavailable`] with a formatted message.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::ProviderUnavailable`] with a formatted message.
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::BadPayload`] with a formatted message.
    pub fn bad_payload(message: impl Into<String>) -> Self {
        Self::BadPayload {
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::Internal`] with a formatted message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
