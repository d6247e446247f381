//! Configuration utilities.

/// `ecodairy.toml` schema, validation and hot-reloading manager.
pub mod toml_config;
