//! Completion client doubles
//!
//! In-process clients for orchestrator tests and a wiremock server speaking
//! the OpenAI chat-completions protocol for HTTP client tests.

use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use pjotinha::services::{CompletionClient, CompletionRequest};
use pjotinha::utils::errors::{LlmError, LlmResult};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Handler = Box<dyn Fn(&CompletionRequest) -> LlmResult<String> + Send + Sync>;

/// Completion client answering through a closure and recording requests
pub struct ScriptedCompletion {
    handler: Handler,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(handler: impl Fn(&CompletionRequest) -> LlmResult<String> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `text`
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Routes by request kind: extraction, quiz generation or open question
    pub fn by_kind(extraction: &str, quiz_json: &str, assistant: &str) -> Self {
        let (extraction, quiz_json, assistant) =
            (extraction.to_string(), quiz_json.to_string(), assistant.to_string());
        Self::new(move |request| {
            if is_extraction(request) {
                Ok(extraction.clone())
            } else if is_quiz(request) {
                Ok(quiz_json.clone())
            } else {
                Ok(assistant.clone())
            }
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests that were open-domain questions
    pub fn assistant_requests(&self) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| !is_extraction(r) && !is_quiz(r))
            .collect()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let result = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

/// Completion client whose every call fails
#[derive(Debug, Clone, Default)]
pub struct FailingCompletion;

#[async_trait]
impl CompletionClient for FailingCompletion {
    async fn complete(&self, _request: CompletionRequest) -> LlmResult<String> {
        Err(LlmError::Unavailable("scripted outage".to_string()))
    }
}

pub fn is_extraction(request: &CompletionRequest) -> bool {
    request.system_prompt.starts_with("Você extrai")
}

pub fn is_quiz(request: &CompletionRequest) -> bool {
    request.system_prompt.starts_with("Você é um professor")
}

/// Mock OpenAI-compatible server
pub struct CompletionMockServer {
    pub server: MockServer,
}

impl CompletionMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Answer every completion with `content`
    pub async fn mock_reply(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&self.server)
            .await;
    }

    /// Answer every completion with a bare status and body
    pub async fn mock_status(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answer after `delay`
    pub async fn mock_slow_reply(&self, content: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body(content))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }
}

pub fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}
