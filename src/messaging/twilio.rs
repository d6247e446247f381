use super::MessagingClient;
use crate::types::{AppError, Result};
use crate::utils::toml_config::DairyConfig;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Client for Twilio's Programmable Messaging API.
pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from: String,
    channel_prefix: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: Option<String>,
    code: Option<u32>,
}

impl TwilioClient {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from: String,
        channel_prefix: String,
        api_base: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            account_sid,
            auth_token,
            from,
            channel_prefix,
            api_base,
        }
    }

    /// Builds a client from the `[messaging]` section, resolving the
    /// credential environment variables.
    pub fn from_config(config: &DairyConfig) -> Result<Self> {
        let messaging = &config.messaging;
        let account_sid = config.resolve_env(&messaging.account_sid_env).ok_or_else(|| {
            AppError::Messaging(format!(
                "Environment variable '{}' is not set",
                messaging.account_sid_env
            ))
        })?;
        let auth_token = config.resolve_env(&messaging.auth_token_env).ok_or_else(|| {
            AppError::Messaging(format!(
                "Environment variable '{}' is not set",
                messaging.auth_token_env
            ))
        })?;

        Ok(Self::new(
            account_sid,
            auth_token,
            messaging.from.clone(),
            messaging.channel_prefix.clone(),
            messaging.api_base.clone(),
        ))
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }

    /// Destination address on the configured channel, e.g. `whatsapp:+2547...`.
    pub fn address(&self, to: &str) -> String {
        if to.starts_with(&self.channel_prefix) {
            to.to_string()
        } else {
            format!("{}{}", self.channel_prefix, to)
        }
    }
}

#[async_trait]
impl MessagingClient for TwilioClient {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        let destination = self.address(to);
        let params = [
            ("To", destination.as_str()),
            ("From", self.from.as_str()),
            ("Body", body),
        ];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Messaging(format!("Twilio request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<TwilioErrorBody>().await {
                Ok(TwilioErrorBody {
                    message: Some(message),
                    code,
                }) => match code {
                    Some(code) => format!("{} (code {})", message, code),
                    None => message,
                },
                _ => "no error detail".to_string(),
            };
            return Err(AppError::Messaging(format!(
                "Twilio API error {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| AppError::Messaging(format!("Invalid Twilio response: {}", e.without_url())))?;

        debug!(sid = %resource.sid, to = %destination, "Message accepted by Twilio");
        Ok(resource.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TwilioClient {
        TwilioClient::new(
            "AC123".to_string(),
            "token".to_string(),
            "whatsapp:+14155238886".to_string(),
            "whatsapp:".to_string(),
            "https://api.twilio.com/".to_string(),
        )
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            client().messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_address_prefixing() {
        let client = client();
        assert_eq!(client.address("+254712345678"), "whatsapp:+254712345678");
        assert_eq!(
            client.address("whatsapp:+254712345678"),
            "whatsapp:+254712345678"
        );
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut config = DairyConfig::default();
        config.messaging.account_sid_env = "TEST_DAIRY_NO_SUCH_SID".to_string();

        let err = match TwilioClient::from_config(&config) {
            Ok(_) => panic!("Expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Messaging(msg) if msg.contains("TEST_DAIRY_NO_SUCH_SID")));
    }
}
