//! API route groups.

pub mod batches;
pub mod webhook;

use axum::Router;

use crate::server::AppState;

/// All `/v1` routes.
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .merge(webhook::routes())
        .merge(batches::routes())
}
