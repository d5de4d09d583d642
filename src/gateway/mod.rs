//! Language-model gateway.
//!
//! A thin, retryable wrapper issuing structured (JSON) completions against
//! a hosted LLM. Owns model selection and token accounting; every caller
//! handles `GatewayError` itself (classifier fails open, extractor falls
//! back to substring search).

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use http::HttpGateway;

/// A structured completion request
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRequest {
    /// System prompt establishing the task rules
    pub system_prompt: String,

    /// User prompt carrying the actual content
    pub user_prompt: String,

    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Completion token cap
    pub max_tokens: u32,
}

impl GatewayRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 2048,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Usage metadata accompanying a completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMetadata {
    /// Model that produced the completion
    pub model: String,

    /// Total tokens consumed (if reported)
    pub tokens_used: Option<u64>,

    /// Wall-clock processing time
    pub processing_time_ms: u64,

    /// Finish reason reported by the provider
    pub finish_reason: Option<String>,
}

/// A parsed structured completion
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    /// The model's output, parsed as JSON
    pub data: serde_json::Value,

    /// Usage metadata
    pub metadata: GatewayMetadata,
}

/// Gateway failure taxonomy
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway response is not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("Gateway request timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for structured-completion backends.
///
/// Implementations must treat malformed JSON as a hard error at this layer;
/// degradation decisions belong to the callers.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Issue a completion, expecting a JSON object back
    async fn complete(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError>;
}

/// Retry policy for transient gateway failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including first try)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Backoff multiplier applied after each retry
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay() -> u64 {
    500
}
fn default_max_delay() -> u64 {
    10_000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Calculate delay for a specific attempt (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::from_millis(self.initial_delay_ms);
        }

        let delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay.min(self.max_delay_ms as f64) as u64)
    }

    /// Whether another attempt is allowed after `attempt` failures
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
