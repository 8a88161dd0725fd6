//! HTTP server assembly: application state, router, serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use outcall_core::{Error, Result};
use outcall_flow::coordinator::FanOutCoordinator;
use outcall_flow::executor::TokioExecutor;
use outcall_flow::ingest::WebhookIngestor;
use outcall_flow::provider::VoiceProvider;
use outcall_flow::store::CallStore;

use crate::config::Config;

/// Shared state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,
    /// Batch-path coordinator.
    pub coordinator: Arc<FanOutCoordinator>,
    /// Webhook-path ingestor.
    pub ingestor: Arc<WebhookIngestor>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish()
    }
}

/// The Outcall API server.
pub struct Server {
    config: Config,
    store: Arc<dyn CallStore>,
    provider: Arc<dyn VoiceProvider>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("store", &"<CallStore>")
            .field("provider", &"<VoiceProvider>")
            .finish()
    }
}

impl Server {
    /// Creates a server over the given collaborators.
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn CallStore>, provider: Arc<dyn VoiceProvider>) -> Self {
        Self {
            config,
            store,
            provider,
        }
    }

    /// Builds the full router, including state.
    #[must_use]
    pub fn create_router(&self) -> Router {
        let executor = Arc::new(TokioExecutor::new(self.config.fan_out_concurrency));
        let coordinator = Arc::new(FanOutCoordinator::new(
            Arc::clone(&self.store),
            Arc::clone(&self.provider),
            executor,
            self.config.retry_policy(),
        ));
        let ingestor = Arc::new(WebhookIngestor::new(Arc::clone(&self.store)));

        let state = AppState {
            config: Arc::new(self.config.clone()),
            coordinator,
            ingestor,
        };

        Router::new()
            .route("/health", get(health))
            .nest("/v1", crate::routes::v1_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Validates configuration, binds, and serves until shutdown.
    pub async fn serve(&self) -> Result<()> {
        self.config.validate()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = self.create_router();

        tracing::info!(http_port = self.config.http_port, "starting Outcall API server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::internal(format!("failed to bind {addr}: {e}")))?;
        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("server error: {e}")))
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
