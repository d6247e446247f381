//! Outbound messaging for report delivery.
//!
//! [`MessagingClient`] is the seam the messaging proxy depends on.
//! [`TwilioClient`](twilio::TwilioClient) talks to Twilio's Messages API;
//! [`ConfigBasedMessenger`] resolves credentials from the live config for
//! every send.

pub mod twilio;

use crate::types::Result;
use crate::utils::toml_config::DairyConfigManager;
use async_trait::async_trait;
use std::sync::Arc;

pub use twilio::TwilioClient;

#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Sends `body` to the phone number `to` and returns the provider's
    /// message id.
    async fn send(&self, to: &str, body: &str) -> Result<String>;
}

pub struct ConfigBasedMessenger {
    config_manager: Arc<DairyConfigManager>,
}

impl ConfigBasedMessenger {
    pub fn new(config_manager: Arc<DairyConfigManager>) -> Self {
        Self { config_manager }
    }
}

#[async_trait]
impl MessagingClient for ConfigBasedMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        let client = TwilioClient::from_config(&self.config_manager.config())?;
        client.send(to, body).await
    }
}
