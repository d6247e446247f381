//! # EcoDairy.AI
//!
//! Dairy herd management server with AI feed advice, methane monitoring and
//! WhatsApp report delivery, plus a terminal client that drives it.
//!
//! ## Overview
//!
//! EcoDairy can be used in two ways:
//!
//! 1. **As a standalone server** - Run `ecodairy serve`
//! 2. **As a library** - Build the router or the client into your own project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use ecodairy::{AppState, DairyConfigManager, api::routes::create_router};
//! use ecodairy::llm::ConfigBasedLLMFactory;
//! use ecodairy::messaging::ConfigBasedMessenger;
//! use std::sync::Arc;
//!
//! let config_manager = Arc::new(DairyConfigManager::new("ecodairy.toml")?);
//! let state = AppState {
//!     llm_factory: Arc::new(ConfigBasedLLMFactory::new(config_manager.clone())),
//!     messenger: Arc::new(ConfigBasedMessenger::new(config_manager.clone())),
//!     config_manager,
//! };
//! let app = create_router(state);
//! ```
//!
//! ### Asking the advisor directly
//!
//! ```rust,ignore
//! use ecodairy::{herd, llm::prompt::build_prompt, Provider};
//!
//! let provider = Provider::Gemini {
//!     api_key: std::env::var("GEMINI_API_KEY")?,
//!     api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
//!     model: "gemini-1.5-pro".to_string(),
//! };
//! let client = provider.create_client().await?;
//! let prompt = build_prompt(&herd::record_herd(), "Which cow needs attention?")?;
//! println!("{}", client.generate(&prompt).await?);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Local Ollama inference as an alternative to Gemini |
//!
//! ## Modules
//!
//! - [`api`] - Route table, dashboard documents and the AI/messaging proxies
//! - [`auth`] - Access-token verification and the route guard
//! - [`herd`] - Static herd data
//! - [`mock`] - Simulated feed plans, methane readings and trends
//! - [`dashboard`] - Notifications, marketplace and feed-plan history
//! - [`llm`] - Gemini (and optional Ollama) clients and the advisor prompt
//! - [`messaging`] - Twilio WhatsApp delivery
//! - [`session`] - Client-side login state and the access cookie
//! - [`chat_history`] - Locally persisted chat sessions
//! - [`client`] - HTTP client used by the CLI
//! - [`types`] - Request/response types and errors
//!
//! ## Configuration
//!
//! Everything is read from `ecodairy.toml`; secrets are referenced by
//! environment variable name. The file is hot-reloaded while serving.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Access-token verification and route protection.
pub mod auth;
/// Persisted chat sessions.
pub mod chat_history;
/// Command-line interface.
pub mod cli;
/// HTTP client for the dashboard server and auth backend.
pub mod client;
/// Notifications, marketplace listings and historical feed plans.
pub mod dashboard;
/// Static herd data.
pub mod herd;
/// LLM provider clients and the advisor prompt.
pub mod llm;
/// WhatsApp delivery.
pub mod messaging;
/// Simulated farm data.
pub mod mock;
/// Client-side session state.
pub mod session;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{ConfigBasedLLMFactory, LLMClient, LLMClientFactoryTrait, Provider};
pub use messaging::{ConfigBasedMessenger, MessagingClient};
pub use types::{AppError, Result};
pub use utils::toml_config::{DairyConfig, DairyConfigManager};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<DairyConfigManager>,
    /// Creates the LLM client for each chat request
    pub llm_factory: Arc<dyn LLMClientFactoryTrait>,
    /// Sends WhatsApp messages
    pub messenger: Arc<dyn MessagingClient>,
}
