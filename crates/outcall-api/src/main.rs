//! `outcall-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::Result;

use outcall_api::config::Config;
use outcall_api::server::Server;
use outcall_core::observability::{init_logging, LogFormat};
use outcall_flow::provider::http::HttpVoiceProvider;
use outcall_flow::store::memory::InMemoryStore;
use outcall_flow::store::CallStore;

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(choose_log_format(&config));
    config.validate()?;

    let provider = Arc::new(HttpVoiceProvider::new(
        config.provider_base_url.clone(),
        config.provider_api_key.clone(),
    ));

    // Claims and records do not survive a restart with the in-memory store;
    // deployments wire a persistent CallStore implementation here.
    let store: Arc<dyn CallStore> = Arc::new(InMemoryStore::new());
    tracing::warn!("using in-memory call store");

    let server = Server::new(config, store, provider);
    server.serve().await?;
    Ok(())
}
