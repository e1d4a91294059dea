//! Anthropic Generator
//!
//! Wraps the Anthropic /v1/messages endpoint. Auth rides in the
//! `x-api-key` header rather than a bearer token, and the optional
//! context string travels as the top-level `system` field.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::HeraldError;
use crate::transport::{RequestSpec, Transport};
use crate::types::TextGenerator;

use super::GENERATION_TIMEOUT;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Text generator for the Anthropic messages API.
pub struct AnthropicGenerator {
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    transport: Transport,
}

impl AnthropicGenerator {
    pub fn new(api_url: String, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            api_url,
            api_key,
            model,
            max_tokens,
            transport: Transport::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<String, HeraldError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(context) = context {
            body["system"] = serde_json::json!(context);
        }

        let spec = RequestSpec::new(Method::POST, format!("{}/v1/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .timeout(GENERATION_TIMEOUT);

        let response = self.transport.send(&spec).await?;
        if response.status >= 400 {
            return Err(HeraldError::GenerationApi {
                status: response.status,
                body: response.body,
            });
        }

        let data: Value = serde_json::from_str(&response.body).map_err(|source| {
            HeraldError::Decode {
                what: "messages response",
                source,
            }
        })?;

        match data["content"][0]["text"].as_str() {
            Some(text) => Ok(text.to_string()),
            None => Err(HeraldError::GenerationApi {
                status: response.status,
                body: response.body,
            }),
        }
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
