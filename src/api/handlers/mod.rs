//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// AI chat streaming proxy.
pub mod chat;
/// Dashboard page documents.
pub mod dashboard;
/// WhatsApp messaging proxy.
pub mod messaging;
