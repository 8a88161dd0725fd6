//! Server configuration, loaded from `OUTCALL_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use outcall_core::{Error, Result};
use outcall_flow::coordinator::RetryPolicy;

/// Runtime configuration for the API server.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// HTTP listen port.
    pub http_port: u16,
    /// Development mode: pretty logs instead of JSON.
    pub debug: bool,
    /// Base URL of the voice provider's API.
    pub provider_base_url: String,
    /// API key for the voice provider.
    pub provider_api_key: String,
    /// Shared secret the provider presents on webhook deliveries.
    /// When unset, webhook requests are accepted unauthenticated.
    pub webhook_secret: Option<String>,
    /// Length of the default batch window, in minutes.
    pub batch_window_minutes: i64,
    /// Maximum concurrently running task pipelines per batch.
    pub fan_out_concurrency: usize,
    /// Maximum attempts per task step for transient failures.
    pub max_attempts: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("debug", &self.debug)
            .field("provider_base_url", &self.provider_base_url)
            .field("provider_api_key", &"[REDACTED]")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("batch_window_minutes", &self.batch_window_minutes)
            .field("fan_out_concurrency", &self.fan_out_concurrency)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            debug: false,
            provider_base_url: String::new(),
            provider_api_key: String::new(),
            webhook_secret: None,
            batch_window_minutes: 30,
            fan_out_concurrency: 8,
            max_attempts: 3,
        }
    }
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `OUTCALL_HTTP_PORT`
    /// - `OUTCALL_DEBUG`
    /// - `OUTCALL_PROVIDER_BASE_URL`
    /// - `OUTCALL_PROVIDER_API_KEY`
    /// - `OUTCALL_WEBHOOK_SECRET`
    /// - `OUTCALL_BATCH_WINDOW_MINUTES`
    /// - `OUTCALL_FAN_OUT_CONCURRENCY`
    /// - `OUTCALL_MAX_ATTEMPTS`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("OUTCALL_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env_bool("OUTCALL_DEBUG")? {
            config.debug = debug;
        }
        if let Some(url) = env_string("OUTCALL_PROVIDER_BASE_URL") {
            config.provider_base_url = url;
        }
        if let Some(key) = env_string("OUTCALL_PROVIDER_API_KEY") {
            config.provider_api_key = key;
        }
        config.webhook_secret = env_string("OUTCALL_WEBHOOK_SECRET");
        if let Some(minutes) = env_u64("OUTCALL_BATCH_WINDOW_MINUTES")? {
            config.batch_window_minutes = i64::try_from(minutes).map_err(|_| {
                Error::InvalidConfig {
                    message: "OUTCALL_BATCH_WINDOW_MINUTES out of range".into(),
                }
            })?;
        }
        if let Some(concurrency) = env_u64("OUTCALL_FAN_OUT_CONCURRENCY")? {
            config.fan_out_concurrency = usize::try_from(concurrency).unwrap_or(usize::MAX);
        }
        if let Some(attempts) = env_u64("OUTCALL_MAX_ATTEMPTS")? {
            config.max_attempts = u32::try_from(attempts).map_err(|_| Error::InvalidConfig {
                message: "OUTCALL_MAX_ATTEMPTS out of range".into(),
            })?;
        }

        Ok(config)
    }

    /// Checks that the configuration is serveable.
    pub fn validate(&self) -> Result<()> {
        if self.provider_base_url.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "OUTCALL_PROVIDER_BASE_URL is required".into(),
            });
        }
        if self.provider_api_key.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "OUTCALL_PROVIDER_API_KEY is required".into(),
            });
        }
        if self.batch_window_minutes <= 0 {
            return Err(Error::InvalidConfig {
                message: "OUTCALL_BATCH_WINDOW_MINUTES must be positive".into(),
            });
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig {
                message: "OUTCALL_MAX_ATTEMPTS must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Returns the retry policy the coordinator should run with.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_backoff: Duration::from_millis(250),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u16(key: &str) -> Result<Option<u16>> {
    env_string(key)
        .map(|v| {
            v.parse::<u16>().map_err(|e| Error::InvalidConfig {
                message: format!("{key} must be a port number: {e}"),
            })
        })
        .transpose()
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    env_string(key)
        .map(|v| {
            v.parse::<u64>().map_err(|e| Error::InvalidConfig {
                message: format!("{key} must be an integer: {e}"),
            })
        })
        .transpose()
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    env_string(key)
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(Error::InvalidConfig {
                message: format!("{key} must be a boolean, got '{other}'"),
            }),
        })
        .transpose()
}
