//! Text-completion client
//!
//! One request, one bounded wait, no retries. Every failure comes back as an
//! [`LlmError`] so the caller can pick its fallback.

use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::LlmConfig;
use crate::models::{ConversationEntry, Role};
use crate::utils::errors::{LlmError, LlmResult, PjotinhaError, Result};
use crate::utils::logging::log_completion_call;

/// One role-tagged turn of a completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn learner(content: impl Into<String>) -> Self {
        Self {
            role: Role::Learner,
            content: content.into(),
        }
    }
}

impl From<&ConversationEntry> for ChatTurn {
    fn from(entry: &ConversationEntry) -> Self {
        Self {
            role: entry.role,
            content: entry.text.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub turns: Vec<ChatTurn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// External text-completion capability
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String>;

    /// Whether calls can succeed at all
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Stand-in used when no API key is configured
#[derive(Debug, Clone, Default)]
pub struct DisabledCompletionClient;

#[async_trait]
impl CompletionClient for DisabledCompletionClient {
    async fn complete(&self, _request: CompletionRequest) -> LlmResult<String> {
        Err(LlmError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(config, api_key, Duration::from_secs(config.timeout_seconds))
    }

    pub fn with_timeout(config: &LlmConfig, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Pjotinha-Bot/1.0")
            .build()
            .map_err(PjotinhaError::Http)?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
            timeout,
        })
    }

    async fn send(&self, request: &CompletionRequest) -> LlmResult<String> {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.push(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        });
        messages.extend(request.turns.iter().map(|turn| ChatMessage {
            role: turn.role.completion_role(),
            content: &turn.content,
        }));

        let body = ChatCompletionBody {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &detail));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(content)
    }
}

fn classify_status(status: StatusCode, detail: &str) -> LlmError {
    let message = format!("{} {}", status.as_u16(), crate::utils::helpers::truncate_text(detail, 200));
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        LlmError::Unavailable(message)
    } else {
        LlmError::RequestFailed(message)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let started = Instant::now();
        debug!(model = %self.model, turns = request.turns.len(), "Sending completion request");

        let result = self.send(&request).await;
        log_completion_call(
            &self.model,
            request.turns.len(),
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );

        result
    }
}
