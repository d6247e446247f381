use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

/// Local model served by Ollama.
///
/// The advisor prompt is sent as a single user turn; Ollama keeps no
/// conversation state between requests.
pub struct OllamaClient {
    client: Ollama,
    model: String,
}

const DEFAULT_PORT: u16 = 11434;

/// Splits `scheme://host:port` into the `host` (with scheme) and port pair
/// `Ollama::new` expects. Missing pieces fall back to localhost:11434.
fn split_base_url(base_url: &str) -> (String, u16) {
    let Some((scheme, rest)) = base_url.split_once("://") else {
        return ("http://localhost".to_string(), DEFAULT_PORT);
    };
    let rest = rest.trim_end_matches('/');
    let (host, port) = rest
        .rsplit_once(':')
        .and_then(|(host, port)| port.parse().ok().map(|port| (host, port)))
        .unwrap_or((rest, DEFAULT_PORT));
    (format!("{}://{}", scheme, host), port)
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        let (host, port) = split_base_url(base_url);
        debug!(%host, port, model, "Using Ollama");
        Self {
            client: Ollama::new(host, port),
            model: model.to_string(),
        }
    }

    fn request(&self, prompt: &str) -> ChatMessageRequest {
        ChatMessageRequest::new(
            self.model.clone(),
            vec![ChatMessage::user(prompt.to_string())],
        )
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client
            .send_chat_messages(self.request(prompt))
            .await
            .map(|response| response.message.content)
            .map_err(|e| AppError::LLM(format!("Ollama request failed: {}", e)))
    }

    async fn stream(
        &self,
        prompt: &str,
    ) -> Result<Box<dyn Stream<Item = Result<String>> + Send + Unpin>> {
        let mut chunks = self
            .client
            .send_chat_messages_stream(self.request(prompt))
            .await
            .map_err(|e| AppError::LLM(format!("Ollama stream failed to open: {}", e)))?;

        let model = self.model.clone();
        let fragments = stream! {
            while let Some(chunk) = chunks.next().await {
                let Ok(chunk) = chunk else {
                    warn!(model = %model, "Ollama stream ended with an error");
                    yield Err(AppError::LLM("Ollama stream interrupted".to_string()));
                    break;
                };
                if !chunk.message.content.is_empty() {
                    yield Ok(chunk.message.content);
                }
            }
        };

        Ok(Box::new(Box::pin(fragments)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
