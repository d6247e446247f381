//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the language models behind
//! the AI chat proxy. Provider-specific code sits behind the [`LLMClient`]
//! trait, so handlers work with any supported model.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`LLMClientFactoryTrait`] - Source of clients used by handlers
//! - [`ConfigBasedLLMFactory`] - Creates clients from the live `ecodairy.toml`
//! - [`prompt`] - Builds the dairy-advisor prompt sent to the model
//!
//! # Supported Providers
//!
//! - Gemini (always available)
//! - `ollama` feature - Local Ollama server
//!
//! # Streaming
//!
//! All providers support streaming responses via [`LLMClient::stream`],
//! which returns a `Box<dyn Stream<Item = Result<String>> + Send + Unpin>`.

/// Core LLM client trait, provider selection and factories.
pub mod client;
/// Google Gemini client.
pub mod gemini;
/// Dairy-advisor prompt construction.
pub mod prompt;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{
    ConfigBasedLLMFactory, LLMClient, LLMClientFactoryTrait, Provider,
};
