//! Shared test fixtures: a scriptable mock gateway and domain builders.

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use copysentry::gateway::{
    GatewayError, GatewayMetadata, GatewayRequest, GatewayResponse, LlmGateway,
};
use copysentry::Product;

/// A gateway that replays scripted responses without any network I/O
pub struct MockGateway {
    behavior: MockBehavior,
}

pub enum MockBehavior {
    /// Every call fails with a malformed-response error
    AlwaysFail,
    /// Every call returns this JSON object
    Respond(serde_json::Value),
    /// Return the response whose key is contained in the user prompt
    Keyed(Mutex<Vec<(String, serde_json::Value)>>),
}

impl MockGateway {
    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior::AlwaysFail,
        }
    }

    pub fn responding(data: serde_json::Value) -> Self {
        Self {
            behavior: MockBehavior::Respond(data),
        }
    }

    /// Responses selected by substring match against the user prompt
    pub fn keyed<K: Into<String>>(responses: Vec<(K, serde_json::Value)>) -> Self {
        Self {
            behavior: MockBehavior::Keyed(Mutex::new(
                responses.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            )),
        }
    }

    fn metadata() -> GatewayMetadata {
        GatewayMetadata {
            model: "mock".to_string(),
            tokens_used: Some(42),
            processing_time_ms: 1,
            finish_reason: Some("stop".to_string()),
        }
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        match &self.behavior {
            MockBehavior::AlwaysFail => Err(GatewayError::MalformedResponse(
                "mock gateway failure".to_string(),
            )),
            MockBehavior::Respond(data) => Ok(GatewayResponse {
                data: data.clone(),
                metadata: Self::metadata(),
            }),
            MockBehavior::Keyed(responses) => {
                let responses = responses.lock().unwrap();
                responses
                    .iter()
                    .find(|(key, _)| request.user_prompt.contains(key))
                    .map(|(_, data)| GatewayResponse {
                        data: data.clone(),
                        metadata: Self::metadata(),
                    })
                    .ok_or_else(|| {
                        GatewayError::MalformedResponse("no scripted response".to_string())
                    })
            }
        }
    }
}

/// A product profile used across the integration suites
pub fn test_product() -> Product {
    Product {
        owner_id: Uuid::new_v4(),
        name: "10x Bars Indicator".to_string(),
        product_type: "trading indicator".to_string(),
        price: 199.0,
        official_url: "https://example.com/10x-bars".to_string(),
        brand_identifiers: vec!["10x Bars".to_string()],
        copyrighted_terms: vec![],
        unique_phrases: vec![],
        keywords: vec!["MT4".to_string()],
    }
}
