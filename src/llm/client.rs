//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for the language-model providers
//! behind the chat proxy:
//! - **Gemini**: Google's hosted models, streamed over server-sent events
//! - **Ollama**: Local inference (requires the `ollama` feature)

use crate::types::{AppError, Result};
use crate::utils::toml_config::{AiProviderConfig, DairyConfig, DairyConfigManager};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Stream a completion
    ///
    /// Each item is a text fragment in arrival order. Dropping the stream
    /// abandons the upstream request.
    async fn stream(
        &self,
        prompt: &str,
    ) -> Result<Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini `generateContent` API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: std::env::var("GEMINI_API_KEY")?,
    ///     api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
    ///     model: "gemini-1.5-pro".to_string(),
    /// };
    /// ```
    Gemini {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    ///
    /// Only usable when the crate is built with the `ollama` feature.
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Resolve the provider described by the `[ai]` section.
    ///
    /// Fails when the configured API key variable is unset.
    pub fn from_config(config: &DairyConfig) -> Result<Self> {
        match &config.ai {
            AiProviderConfig::Gemini {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = config.resolve_env(api_key_env).ok_or_else(|| {
                    AppError::LLM(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;
                Ok(Provider::Gemini {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                })
            }
            AiProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider was compiled out or cannot be reached.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::Gemini {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::gemini::GeminiClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url, model),
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { model, .. } => Err(AppError::LLM(format!(
                "Ollama support is not compiled in (requested model '{}'). \
                 Rebuild with `--features ollama`.",
                model
            ))),
        }
    }
}

/// Source of LLM clients for request handlers.
///
/// Handlers depend on this trait rather than on a concrete provider so tests
/// can inject scripted clients.
#[async_trait]
pub trait LLMClientFactoryTrait: Send + Sync {
    /// Create a client using the currently configured provider
    async fn create_default(&self) -> Result<Box<dyn LLMClient>>;
}

/// Factory that resolves the provider from the live configuration on
/// every call, so `[ai]` edits apply without a restart.
pub struct ConfigBasedLLMFactory {
    config_manager: Arc<DairyConfigManager>,
}

impl ConfigBasedLLMFactory {
    pub fn new(config_manager: Arc<DairyConfigManager>) -> Self {
        Self { config_manager }
    }
}

#[async_trait]
impl LLMClientFactoryTrait for ConfigBasedLLMFactory {
    async fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        let provider = Provider::from_config(&self.config_manager.config())?;
        provider.create_client().await
    }
}
