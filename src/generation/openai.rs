//! OpenAI Generator
//!
//! Wraps an OpenAI-compatible /v1/chat/completions endpoint. The
//! optional context string travels as the system message.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::HeraldError;
use crate::transport::{RequestSpec, Transport};
use crate::types::TextGenerator;

use super::GENERATION_TIMEOUT;

/// Text generator for OpenAI-compatible chat completions.
pub struct OpenAiGenerator {
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    transport: Transport,
}

impl OpenAiGenerator {
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
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<String, HeraldError> {
        let mut messages: Vec<Value> = Vec::new();
        if let Some(context) = context {
            messages.push(serde_json::json!({ "role": "system", "content": context }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": prompt }));

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        let spec = RequestSpec::new(
            Method::POST,
            format!("{}/v1/chat/completions", self.api_url),
        )
        .bearer(&self.api_key)
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
                what: "chat completion",
                source,
            }
        })?;

        match data["choices"][0]["message"]["content"].as_str() {
            Some(text) => Ok(text.to_string()),
            None => Err(HeraldError::GenerationApi {
                status: response.status,
                body: response.body,
            }),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator_for(server: &MockServer) -> OpenAiGenerator {
        OpenAiGenerator::new(
            server.uri(),
            "sk-test".to_string(),
            "gpt-4o".to_string(),
            256,
        )
    }

    #[tokio::test]
    async fn test_generate_extracts_completion_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "generated text" } }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator_for(&server)
            .generate("write a post", None)
            .await
            .unwrap();
        assert_eq!(text, "generated text");
    }

    #[tokio::test]
    async fn test_context_becomes_system_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" } }],
            })))
            .mount(&server)
            .await;

        generator_for(&server)
            .generate("the prompt", Some("the persona"))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "the persona");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "the prompt");
    }

    #[tokio::test]
    async fn test_no_context_sends_single_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" } }],
            })))
            .mount(&server)
            .await;

        generator_for(&server).generate("solo", None).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_http_error_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = generator_for(&server).generate("x", None).await.unwrap_err();
        match err {
            HeraldError::GenerationApi { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected GenerationApi, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_text_field_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [],
            })))
            .mount(&server)
            .await;

        let err = generator_for(&server).generate("x", None).await.unwrap_err();
        match err {
            HeraldError::GenerationApi { status, .. } => assert_eq!(status, 200),
            other => panic!("expected GenerationApi, got {:?}", other),
        }
    }
}
