//! Mock implementations for testing.
//!
//! Scripted LLM clients, factories and messengers shared by the integration
//! tests, so no test needs Gemini or Twilio.

#![allow(dead_code)]

use async_trait::async_trait;
use ecodairy::llm::{LLMClient, LLMClientFactoryTrait};
use ecodairy::messaging::MessagingClient;
use ecodairy::types::{AppError, Result};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;

/// How a [`MockLLMClient`] behaves when asked to stream.
#[derive(Clone)]
enum StreamScript {
    Chunks(Vec<String>),
    /// Yields the chunks, then an upstream error.
    BreaksAfter(Vec<String>),
    /// Refuses to open the stream.
    Refuses,
}

/// Mock LLM client that streams scripted fragments.
///
/// The last prompt it received is kept so tests can check what the handler
/// sent upstream.
#[derive(Clone)]
pub struct MockLLMClient {
    script: StreamScript,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockLLMClient {
    /// Streams `chunks` in order.
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            script: StreamScript::Chunks(chunks.iter().map(|c| c.to_string()).collect()),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Streams `chunks`, then fails mid-stream.
    pub fn breaking_after(chunks: &[&str]) -> Self {
        Self {
            script: StreamScript::BreaksAfter(chunks.iter().map(|c| c.to_string()).collect()),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Fails before the first fragment.
    pub fn failing() -> Self {
        Self {
            script: StreamScript::Refuses,
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        *self.last_prompt.lock() = Some(prompt.to_string());
        match &self.script {
            StreamScript::Chunks(chunks) => Ok(chunks.concat()),
            _ => Err(AppError::LLM("Mock LLM failure".to_string())),
        }
    }

    async fn stream(
        &self,
        prompt: &str,
    ) -> Result<Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>> {
        *self.last_prompt.lock() = Some(prompt.to_string());

        match &self.script {
            StreamScript::Refuses => Err(AppError::LLM("Mock LLM failure".to_string())),
            StreamScript::Chunks(chunks) => {
                let items: Vec<Result<String>> = chunks.iter().cloned().map(Ok).collect();
                Ok(Box::new(stream::iter(items).boxed()))
            }
            StreamScript::BreaksAfter(chunks) => {
                let mut items: Vec<Result<String>> = chunks.iter().cloned().map(Ok).collect();
                items.push(Err(AppError::LLM("connection reset".to_string())));
                Ok(Box::new(stream::iter(items).boxed()))
            }
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Factory handing out clones of one scripted client.
pub struct MockLLMFactory {
    client: MockLLMClient,
}

impl MockLLMFactory {
    pub fn new(client: MockLLMClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LLMClientFactoryTrait for MockLLMFactory {
    async fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        Ok(Box::new(self.client.clone()))
    }
}

/// Messenger that records what it was asked to send.
#[derive(Clone, Default)]
pub struct MockMessenger {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    should_fail: bool,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MessagingClient for MockMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::Messaging(
                "The 'To' number is not a valid phone number".to_string(),
            ));
        }
        self.sent.lock().push((to.to_string(), body.to_string()));
        Ok(format!("SM{:032}", self.sent.lock().len()))
    }
}
