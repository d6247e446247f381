//! Gemini client against a mocked Generative Language API.

use ecodairy::llm::LLMClient;
use ecodairy::llm::gemini::GeminiClient;
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{
    body_partial_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key".to_string(), server.uri(), MODEL.to_string())
}

fn sse_event(text: &str) -> String {
    format!(
        "data: {}\r\n\r\n",
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
    )
}

async fn collect(client: &GeminiClient, prompt: &str) -> Vec<ecodairy::Result<String>> {
    client.stream(prompt).await.expect("stream should open").collect().await
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{}:generateContent", MODEL)))
        .and(header("x-goog-api-key", "test-key"))
        .and(query_param_is_missing("key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Which cow needs help?" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Bessie " }, { "text": "needs help." }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = client(&server).generate("Which cow needs help?").await.unwrap();
    assert_eq!(answer, "Bessie needs help.");
}

#[tokio::test]
async fn test_stream_yields_fragments_in_order() {
    let server = MockServer::start().await;
    let body = [
        sse_event("## Herd\n"),
        sse_event("Bessie is "),
        sse_event("fine."),
    ]
    .concat();

    Mock::given(method("POST"))
        .and(path(format!("/models/{}:streamGenerateContent", MODEL)))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
        .and(query_param_is_missing("key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let fragments: Vec<String> = collect(&client(&server), "hi")
        .await
        .into_iter()
        .map(|item| item.unwrap())
        .collect();
    assert_eq!(fragments, vec!["## Herd\n", "Bessie is ", "fine."]);
}

#[tokio::test]
async fn test_stream_skips_malformed_and_empty_events() {
    let server = MockServer::start().await;
    let body = [
        ": keep-alive\n\n".to_string(),
        "data: {not json}\n\n".to_string(),
        format!("data: {}\n\n", json!({ "candidates": [] })),
        sse_event("only this"),
        "data: [DONE]\n\n".to_string(),
    ]
    .concat();

    Mock::given(method("POST"))
        .and(path(format!("/models/{}:streamGenerateContent", MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let fragments: Vec<String> = collect(&client(&server), "hi")
        .await
        .into_iter()
        .map(|item| item.unwrap())
        .collect();
    assert_eq!(fragments, vec!["only this"]);
}

#[tokio::test]
async fn test_stream_handles_final_event_without_newline() {
    let server = MockServer::start().await;
    let body = format!(
        "{}data: {}",
        sse_event("first "),
        json!({ "candidates": [{ "content": { "parts": [{ "text": "last" }] } }] })
    );

    Mock::given(method("POST"))
        .and(path(format!("/models/{}:streamGenerateContent", MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let fragments: Vec<String> = collect(&client(&server), "hi")
        .await
        .into_iter()
        .map(|item| item.unwrap())
        .collect();
    assert_eq!(fragments, vec!["first ", "last"]);
}

#[tokio::test]
async fn test_error_status_fails_before_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{}:streamGenerateContent", MODEL)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "API key not valid" }
        })))
        .mount(&server)
        .await;

    let err = match client(&server).stream("hi").await {
        Ok(_) => panic!("stream should not open"),
        Err(e) => e,
    };
    let message = err.to_string();
    assert!(message.contains("403"));
    assert!(message.contains("API key not valid"));
}

#[tokio::test]
async fn test_connection_error_does_not_reveal_api_key() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = GeminiClient::new(
        "SUPER-SECRET-KEY".to_string(),
        format!("http://127.0.0.1:{}/v1beta", port),
        MODEL.to_string(),
    );

    let err = match client.stream("hi").await {
        Ok(_) => panic!("stream should not open"),
        Err(e) => e,
    };
    let message = err.to_string();
    assert!(message.contains("Gemini request failed"));
    assert!(!message.contains("SUPER-SECRET-KEY"));

    let err = client.generate("hi").await.unwrap_err();
    assert!(!err.to_string().contains("SUPER-SECRET-KEY"));
}
