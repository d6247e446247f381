use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Header carrying the API key; the key never goes in the URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_base,
            model,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.api_base.trim_end_matches('/'),
            self.model,
            method
        )
    }

    fn request_body(prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        })
    }

    async fn post(&self, method: &str, query: &[(&str, &str)], prompt: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(self.endpoint(method))
            .query(query)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Gemini request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Gemini API error {}: {}",
                status.as_u16(),
                text
            )));
        }

        Ok(response)
    }
}

/// Extracts the text carried by one SSE line, if any.
///
/// Non-data lines, the `[DONE]` sentinel and payloads without text yield
/// `None`.
pub(crate) fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.trim().strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(event) => {
            let text = event.text();
            (!text.is_empty()).then_some(text)
        }
        Err(e) => {
            warn!("Skipping malformed Gemini event: {}", e);
            None
        }
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.post("generateContent", &[], prompt).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid Gemini response: {}", e.without_url())))?;

        Ok(body.text())
    }

    async fn stream(
        &self,
        prompt: &str,
    ) -> Result<Box<dyn Stream<Item = Result<String>> + Send + Unpin>> {
        let response = self
            .post("streamGenerateContent", &[("alt", "sse")], prompt)
            .await?;
        debug!(model = %self.model, "Gemini stream opened");

        let output_stream = stream! {
            let mut bytes = response.bytes_stream();
            // Raw bytes until a full line arrives so multi-byte characters
            // split across chunks decode intact
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        buffer.extend_from_slice(&chunk);

                        while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                            let line: Vec<u8> = buffer.drain(..=pos).collect();
                            if let Some(text) = parse_sse_line(&String::from_utf8_lossy(&line)) {
                                yield Ok(text);
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(AppError::LLM(format!("Gemini stream error: {}", e.without_url())));
                        break;
                    }
                }
            }

            if let Some(text) = parse_sse_line(&String::from_utf8_lossy(&buffer)) {
                yield Ok(text);
            }
        };

        Ok(Box::new(Box::pin(output_stream)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
