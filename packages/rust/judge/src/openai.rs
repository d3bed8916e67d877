//! OpenAI-compatible chat-completions judge.
//!
//! Sends a system + user message pair where the user content carries the
//! prompt text and the image as a base64 `data:` URL. Works against any
//! endpoint speaking the chat-completions dialect.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use tracing::debug;

use coverpick_shared::{CoverpickError, JudgeApiConfig, Result};

use crate::RelevanceJudge;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Per-call timeout; a hung judge call must not stall the candidate batch.
const JUDGE_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible multimodal judge client.
pub struct OpenAiJudge {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiJudge {
    /// Build a judge client with an explicit API key.
    pub fn new(config: &JudgeApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(JUDGE_TIMEOUT)
            .build()
            .map_err(|e| CoverpickError::Judge(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Build a judge client reading the API key from the configured env var.
    pub fn from_env(config: &JudgeApiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            CoverpickError::config(format!(
                "judge API key not found. Set the {} environment variable.",
                config.api_key_env
            ))
        })?;
        Self::new(config, api_key)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl RelevanceJudge for OpenAiJudge {
    async fn judge(&self, prompt: &str, image_jpeg: &[u8]) -> Result<String> {
        let data_url = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(image_jpeg)
        );

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": data_url } },
                ]},
            ],
            "max_tokens": self.max_tokens,
            "temperature": 0.0,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CoverpickError::Judge(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoverpickError::Judge(format!(
                "HTTP {status} from judge endpoint"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CoverpickError::Judge(format!("invalid response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CoverpickError::Judge("response had no choices".into()))?;

        debug!(model = %self.model, chars = content.len(), "judge responded");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> JudgeApiConfig {
        JudgeApiConfig {
            api_url: format!("{}/v1/chat/completions", server.uri()),
            ..JudgeApiConfig::default()
        }
    }

    #[tokio::test]
    async fn sends_image_as_data_url_and_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("data:image/jpeg;base64,"))
            .and(body_string_contains("gpt-4o-mini"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "42" } }
                ]
            })))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new(&config(&server), "test-key").unwrap();
        let response = judge.judge("rate this", &[0xFF, 0xD8, 0xFF]).await.unwrap();
        assert_eq!(response, "42");
    }

    #[tokio::test]
    async fn non_success_status_is_a_judge_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new(&config(&server), "test-key").unwrap();
        let err = judge.judge("rate this", &[0u8]).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn empty_choices_is_a_judge_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new(&config(&server), "test-key").unwrap();
        let err = judge.judge("rate this", &[0u8]).await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
