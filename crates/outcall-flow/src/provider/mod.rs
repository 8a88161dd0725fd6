//! Voice-call provider abstraction.
//!
//! The [`VoiceProvider`] trait is the outbound seam to the third-party
//! calling API. One production implementation exists
//! ([`http::HttpVoiceProvider`]); tests substitute their own.
//!
//! ## Failure contract
//!
//! - Rejections (invalid number, invalid assistant, auth) map to
//!   `ProviderRejected` — terminal, never retried
//! - Timeouts and server-side failures map to `ProviderUnavailable` —
//!   transient, eligible for bounded retry

pub mod http;

use async_trait::async_trait;

use outcall_core::{ProviderCallId, Result};

use crate::task::CallRequest;

/// Outbound call-creation boundary.
///
/// ## Thread Safety
///
/// `Send + Sync`: the fan-out submits many calls concurrently through one
/// shared provider handle.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Submits an outbound call and returns the provider-assigned call ID.
    ///
    /// The request's correlation metadata is mandatory and is guaranteed
    /// present by construction ([`CallRequest::from_task`]).
    async fn create_call(&self, request: &CallRequest) -> Result<ProviderCallId>;
}
