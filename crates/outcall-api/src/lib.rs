//! # outcall-api
//!
//! HTTP surface for the Outcall orchestrator. Two route groups:
//!
//! - `POST /v1/webhooks/voice` — inbound call-completion events from the
//!   voice provider; the status code is the provider's sole redelivery
//!   signal (2xx acknowledges, 4xx rejects, 5xx requests redelivery)
//! - `POST /v1/batches/{label}/run` — the trigger boundary; the external
//!   scheduler fires this and receives the batch summary
//!
//! Plus `GET /health` for the deployment platform.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
