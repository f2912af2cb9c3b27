//! Chat-completion HTTP client tests against a mock server

mod helpers;

use std::sync::Arc;
use std::time::Duration;
use helpers::*;
use pjotinha::config::{LlmConfig, Settings};
use pjotinha::services::{ChatTurn, CompletionClient, CompletionRequest, OpenAiClient};
use pjotinha::utils::errors::LlmError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn llm_config(base_url: &str) -> LlmConfig {
    let mut config = Settings::default().llm;
    config.base_url = base_url.to_string();
    config.model = "gpt-test".to_string();
    config
}

fn request(text: &str) -> CompletionRequest {
    CompletionRequest {
        system_prompt: "Você é o Pjotinha.".to_string(),
        turns: vec![ChatTurn::learner(text)],
        temperature: 0.7,
        max_tokens: 300,
    }
}

#[tokio::test]
async fn test_completion_success() {
    let mock = CompletionMockServer::new().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "messages": [
                { "role": "system", "content": "Você é o Pjotinha." },
                { "role": "user", "content": "o que é MEI?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("  Microempreendedor individual.  ")))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = OpenAiClient::new(&llm_config(&mock.base_url()), "test-key").unwrap();
    let reply = client.complete(request("o que é MEI?")).await.unwrap();

    assert_eq!(reply, "Microempreendedor individual.");
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let mock = CompletionMockServer::new().await;
    mock.mock_reply("ok").await;

    let client = OpenAiClient::new(&llm_config(&format!("{}/", mock.base_url())), "test-key").unwrap();

    assert_eq!(client.complete(request("oi")).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mock = CompletionMockServer::new().await;
    mock.mock_status(500, "upstream exploded").await;

    let client = OpenAiClient::new(&llm_config(&mock.base_url()), "test-key").unwrap();
    let error = client.complete(request("oi")).await.unwrap_err();

    assert!(matches!(error, LlmError::Unavailable(ref message) if message.starts_with("500")));
}

#[tokio::test]
async fn test_rate_limit_is_unavailable() {
    let mock = CompletionMockServer::new().await;
    mock.mock_status(429, "slow down").await;

    let client = OpenAiClient::new(&llm_config(&mock.base_url()), "test-key").unwrap();

    assert!(matches!(client.complete(request("oi")).await, Err(LlmError::Unavailable(_))));
}

#[tokio::test]
async fn test_auth_error_is_request_failure() {
    let mock = CompletionMockServer::new().await;
    mock.mock_status(401, "invalid api key").await;

    let client = OpenAiClient::new(&llm_config(&mock.base_url()), "wrong-key").unwrap();

    assert!(matches!(client.complete(request("oi")).await, Err(LlmError::RequestFailed(_))));
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let mock = CompletionMockServer::new().await;
    mock.mock_status(200, "<html>gateway</html>").await;

    let client = OpenAiClient::new(&llm_config(&mock.base_url()), "test-key").unwrap();

    assert!(matches!(client.complete(request("oi")).await, Err(LlmError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_empty_content_is_rejected() {
    let mock = CompletionMockServer::new().await;
    mock.mock_reply("   ").await;

    let client = OpenAiClient::new(&llm_config(&mock.base_url()), "test-key").unwrap();

    assert!(matches!(client.complete(request("oi")).await, Err(LlmError::EmptyCompletion)));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock = CompletionMockServer::new().await;
    mock.mock_slow_reply("tarde demais", Duration::from_secs(2)).await;

    let timeout = Duration::from_millis(200);
    let client = OpenAiClient::with_timeout(&llm_config(&mock.base_url()), "test-key", timeout).unwrap();

    match client.complete(request("oi")).await {
        Err(LlmError::Timeout(elapsed)) => assert_eq!(elapsed, timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bot_keeps_replying_when_completion_service_fails() {
    let mock = CompletionMockServer::new().await;
    mock.mock_status(503, "maintenance").await;

    let client = OpenAiClient::new(&llm_config(&mock.base_url()), "test-key").unwrap();
    let ctx = TestContext::new(Arc::new(client));

    assert_eq!(ctx.send(SENDER, "oi").await, GREETING);
    assert_eq!(ctx.send(SENDER, "me chamo Ana").await, "Prazer em te conhecer, Ana! Qual o seu curso?");
    for answer in ["Direito", "5", "moda"] {
        assert!(!ctx.send(SENDER, answer).await.is_empty());
    }

    assert_eq!(ctx.send(SENDER, "o que é CNPJ?").await, APOLOGY);
}
