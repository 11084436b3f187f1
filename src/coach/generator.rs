//! Text generation backends
//!
//! [`OpenAiGenerator`] talks to any OpenAI-compatible `chat/completions` endpoint.
//! [`DisabledGenerator`] stands in when no API key is configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;

const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Text generation unavailable: {0}")]
    Unavailable(String),
}

/// What the text is for. Selects the system prompt and the token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPurpose {
    Missions,
    Feedback,
}

impl GenerationPurpose {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            GenerationPurpose::Missions => "あなたは親切で実用的な健康支援アドバイザーです。",
            GenerationPurpose::Feedback => "あなたは親切で実用的な栄養指導の専門家です。",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            GenerationPurpose::Missions => 200,
            GenerationPurpose::Feedback => 400,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(
        &self,
        purpose: GenerationPurpose,
        prompt: &str,
    ) -> Result<String, GenerationError>;

    /// Short backend name for status output
    fn name(&self) -> &str;
}

/// Always unavailable
#[derive(Debug, Default, Clone)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate_text(
        &self,
        _purpose: GenerationPurpose,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable(
            "no API key configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct OpenAiGenerator {
    client: Client,
    config: LlmConfig,
}

impl OpenAiGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_text(
        &self,
        purpose: GenerationPurpose,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage { role: "system", content: purpose.system_prompt() },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: TEMPERATURE,
            max_tokens: purpose.max_tokens(),
        };

        tracing::debug!(model = %self.config.model, ?purpose, "requesting chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(format!("request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| GenerationError::Unavailable(format!("bad status: {}", e)))?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Unavailable(format!("malformed response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| GenerationError::Unavailable("empty completion".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_generator_is_unavailable() {
        let result = DisabledGenerator
            .generate_text(GenerationPurpose::Missions, "hello")
            .await;
        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
    }

    #[test]
    fn test_purpose_budgets() {
        assert_eq!(GenerationPurpose::Missions.max_tokens(), 200);
        assert_eq!(GenerationPurpose::Feedback.max_tokens(), 400);
        assert_ne!(
            GenerationPurpose::Missions.system_prompt(),
            GenerationPurpose::Feedback.system_prompt()
        );
    }

    #[test]
    fn test_endpoint_and_request_shape() {
        let generator = OpenAiGenerator::new(LlmConfig {
            api_key: "k".to_string(),
            base_url: "http://localhost:8080/v1/".to_string(),
            model: "m".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(generator.endpoint(), "http://localhost:8080/v1/chat/completions");

        let request = ChatRequest {
            model: "m",
            messages: [
                ChatMessage { role: "system", content: "s" },
                ChatMessage { role: "user", content: "u" },
            ],
            temperature: TEMPERATURE,
            max_tokens: 200,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 200);
    }

    #[test]
    fn test_response_without_content_parses() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(body.choices[0].message.content.is_none());
    }
}
