//! # outcall-core
//!
//! Shared kernel for the Outcall outbound voice-call orchestrator.
//!
//! This crate provides the foundations used by every other Outcall crate:
//!
//! - **Typed identifiers**: ULID-backed newtypes that make it impossible to
//!   hand a series ID where a task ID is expected
//! - **Error taxonomy**: one error enum classifying every failure the
//!   orchestrator can hit, with an explicit retryability contract
//! - **Observability**: tracing initialization and span constructors shared
//!   by the batch and webhook paths
//!
//! ## Retryability
//!
//! The coordinator retries a task step if and only if
//! [`Error::is_retryable`] returns true. Transient infrastructure failures
//! (store or provider unreachable) are retryable; rejections, malformed
//! payloads, and unknown correlation IDs are terminal.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod observability;

pub use error::{Error, Result};
pub use id::{CallTaskId, ProviderCallId, SeriesId};
