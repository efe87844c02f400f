use super::{CompletionRequest, LLMError, LLMProvider};
use crate::config::LLMConfig;
use crate::secrets::{self, SecretString};
use async_trait::async_trait;
use sdk::types::AgentResponse;
use serde::Deserialize;
use std::time::Duration;

/// Models accepted by the Groq endpoint
pub const SUPPORTED_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "gemma2-9b-it",
    "meta-llama/llama-guard-4-12b",
    "deepseek-r1-distill-llama-70b",
    "meta-llama/llama-4-maverick-17b-128e-instruct",
    "meta-llama/llama-4-scout-17b-16e-instruct",
    "moonshotai/kimi-k2-instruct",
    "qwen/qwen3-32b",
    "openai/gpt-oss-120b",
];

pub fn is_supported_model(model: &str) -> bool {
    SUPPORTED_MODELS.contains(&model)
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Deserialize)]
struct ErrorInfo {
    message: String,
}

/// Groq chat-completions client (OpenAI-compatible wire format)
pub struct GroqProvider {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(config: &LLMConfig, api_key: SecretString) -> Result<Self, LLMError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn error_detail(body: &str) -> String {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.to_string());
        secrets::scrub(&detail)
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &CompletionRequest) -> super::Result<AgentResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.unsecure()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(secrets::scrub(&e.to_string()))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = Self::error_detail(&text);

            return Err(match status.as_u16() {
                401 | 403 => LLMError::AuthenticationFailed(detail),
                429 => LLMError::RateLimitExceeded,
                code => LLMError::InvalidRequest(format!("status {}: {}", code, detail)),
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = data.choices.into_iter().next().ok_or(LLMError::EmptyResponse)?;

        Ok(AgentResponse {
            content: choice.message.content.unwrap_or_default(),
            tokens_used: data.usage.map(|u| u.total_tokens).unwrap_or(0),
            model: data.model.unwrap_or_else(|| request.model.clone()),
        })
    }
}
