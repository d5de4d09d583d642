//! HTTP gateway against an OpenAI-compatible chat completions endpoint.
//!
//! Requests `response_format: json_object` and parses the first choice's
//! content as JSON. Transient failures (5xx, timeouts) are retried per the
//! configured policy; malformed JSON is a hard error surfaced to the caller.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{GatewayError, GatewayMetadata, GatewayRequest, GatewayResponse, LlmGateway, RetryPolicy};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions gateway client
pub struct HttpGateway {
    endpoint: String,
    api_key: String,
    retry_policy: RetryPolicy,
    client: reqwest::Client,
}

/// Provider response shape (the subset we consume)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u64,
}

impl HttpGateway {
    /// Create a gateway against the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Create a gateway against a custom endpoint (self-hosted, proxy)
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            retry_policy: RetryPolicy::default(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Issue one request without retry handling
    async fn complete_once(
        &self,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let started = Instant::now();

        let body = serde_json::json!({
            "model": request.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(REQUEST_TIMEOUT)
                } else {
                    GatewayError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::MalformedResponse("no choices returned".to_string()))?;

        // The content itself must be a JSON object; anything else is a
        // protocol violation at this layer.
        let data: serde_json::Value = serde_json::from_str(&choice.message.content)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        Ok(GatewayResponse {
            data,
            metadata: GatewayMetadata {
                model: chat.model,
                tokens_used: chat.usage.map(|u| u.total_tokens),
                processing_time_ms: started.elapsed().as_millis() as u64,
                finish_reason: choice.finish_reason,
            },
        })
    }

    /// Whether a failure is worth retrying
    fn is_transient(error: &GatewayError) -> bool {
        match error {
            GatewayError::Timeout(_) => true,
            GatewayError::Request(_) => true,
            GatewayError::Status { status, .. } => *status >= 500 || *status == 429,
            GatewayError::MalformedResponse(_) => false,
        }
    }
}

#[async_trait]
impl LlmGateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.complete_once(&request).await {
                Ok(response) => {
                    debug!(
                        model = %response.metadata.model,
                        tokens = ?response.metadata.tokens_used,
                        ms = response.metadata.processing_time_ms,
                        "Gateway completion succeeded"
                    );
                    return Ok(response);
                }
                Err(e) if Self::is_transient(&e) && self.retry_policy.should_retry(attempt) => {
                    let delay = self.retry_policy.delay_for_attempt(attempt);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Gateway call failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
