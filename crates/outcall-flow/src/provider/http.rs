//! HTTP client for the voice-call provider's call-creation API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use outcall_core::{Error, ProviderCallId, Result};

use crate::provider::VoiceProvider;
use crate::task::CallRequest;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Call-creation response body.
#[derive(Debug, Deserialize)]
struct CreateCallResponse {
    id: String,
}

/// HTTP client for a Vapi-style call-creation endpoint.
///
/// Authenticates with a bearer API key and maps HTTP outcomes onto the
/// error taxonomy: 4xx → `ProviderRejected`, 5xx/429/timeouts →
/// `ProviderUnavailable`.
#[derive(Clone)]
pub struct HttpVoiceProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpVoiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVoiceProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpVoiceProvider {
    /// Creates a new client targeting the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Overrides the request timeout (primarily for tests).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if let Ok(client) = reqwest::Client::builder().timeout(timeout).build() {
            self.client = client;
        }
        self
    }

    fn create_call_url(&self) -> String {
        format!("{}/call", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl VoiceProvider for HttpVoiceProvider {
    async fn create_call(&self, request: &CallRequest) -> Result<ProviderCallId> {
        let response = self
            .client
            .post(self.create_call_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::provider_unavailable(format!("call creation failed: {e}")))?;

        if response.status().is_success() {
            let body: CreateCallResponse = response.json().await.map_err(|e| {
                Error::provider_unavailable(format!("invalid call creation response: {e}"))
            })?;
            return Ok(ProviderCallId::new(body.id));
        }

        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| String::from_utf8_lossy(&body).to_string());

        match status {
            StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => Err(
                Error::provider_unavailable(format!("provider throttling ({status}): {message}")),
            ),
            s if s.is_client_error() => Err(Error::ProviderRejected {
                message: format!("call rejected ({status}): {message}"),
            }),
            _ => Err(Error::provider_unavailable(format!(
                "call creation failed ({status}): {message}"
            ))),
        }
    }
}
