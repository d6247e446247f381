//! HTTP client for the dashboard server and the external auth backend.
//!
//! This is what the CLI uses in place of a browser: it carries the access
//! cookie from the [`UserSessionStore`], never follows redirects (so the
//! route guard's decisions are visible to the caller), and decodes streamed
//! chat answers incrementally.

use crate::mock::HealthStatus;
use crate::session::{UserProfile, UserSessionStore};
use crate::types::{
    AppError, ChatRequest, RecommendationRequest, RecommendationResponse, Result,
    SendMessageRequest, SendMessageResponse,
};
use async_stream::stream;
use futures::{Stream, StreamExt};
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Body of the monthly report sent from the notifications page.
pub const DEFAULT_REPORT_MESSAGE: &str = "Your monthly report is ready!";

/// Result of fetching a dashboard page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    Page(Value),
    /// The server answered with a redirect to this location.
    Redirect(String),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: BackendUser,
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct BackendUser {
    user_id: Value,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    subscription_status: Option<String>,
    #[serde(default)]
    streak: Option<u32>,
}

impl From<BackendUser> for UserProfile {
    fn from(user: BackendUser) -> Self {
        let id = match user.user_id {
            Value::String(s) => s,
            other => other.to_string(),
        };
        UserProfile {
            id,
            full_name: user.full_name,
            email: user.email,
            phone_number: user.phone_number.unwrap_or_default(),
            subscription_status: user.subscription_status.unwrap_or_default(),
            streak: user.streak.unwrap_or_default(),
        }
    }
}

/// Renders a JSON value the way a JavaScript string join would.
fn js_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn truthy(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(js_string(other)),
    }
}

/// Error text for a failed login response.
///
/// Tries `error`, `detail` and `message`, then every value of the body
/// (arrays flattened one level) joined with `", "`, then a status line.
pub fn login_error_message(status: u16, body: &Value) -> String {
    let fallback = || format!("Login failed with status: {}", status);

    let Value::Object(map) = body else {
        return fallback();
    };

    if let Some(message) = ["error", "detail", "message"]
        .iter()
        .find_map(|key| truthy(map.get(*key)))
    {
        return message;
    }

    let joined = map
        .values()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>(),
            other => vec![js_string(other)],
        })
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() { fallback() } else { joined }
}

/// Converts a leading `0` into the Kenyan country code.
pub fn normalize_phone_number(number: &str) -> String {
    let number = number.trim();
    match number.strip_prefix('0') {
        Some(rest) => format!("+254{}", rest),
        None => number.to_string(),
    }
}

/// Incremental UTF-8 decoder for byte chunks that may split characters.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes as much as possible, keeping an incomplete trailing sequence
    /// for the next chunk. Invalid bytes become U+FFFD.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Incomplete sequence at the end
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }

    /// Flushes whatever is left; a dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

pub struct DashboardClient {
    http: reqwest::Client,
    server_url: String,
    backend_url: Option<String>,
    session: Arc<UserSessionStore>,
}

impl DashboardClient {
    pub fn new(
        server_url: &str,
        backend_url: Option<String>,
        session: Arc<UserSessionStore>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
            backend_url: backend_url.map(|url| url.trim_end_matches('/').to_string()),
            session,
        })
    }

    pub fn session(&self) -> &UserSessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    fn with_cookie(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.cookie_header() {
            Some(cookie) => request.header(header::COOKIE, cookie),
            None => request,
        }
    }

    /// Authenticates against the external backend and records the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let backend = self.backend_url.as_deref().ok_or_else(|| {
            AppError::Auth("No auth backend URL is configured".to_string())
        })?;

        let response = self
            .http
            .post(format!("{}/login/", backend))
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(AppError::Upstream(format!("Invalid login response: {}", e)));
            }
            Err(_) => Value::Null,
        };

        if !status.is_success() {
            return Err(AppError::Auth(login_error_message(status.as_u16(), &body)));
        }

        let login: LoginResponse = serde_json::from_value(body)
            .map_err(|e| AppError::Upstream(format!("Invalid login response: {}", e)))?;
        let user = UserProfile::from(login.user);
        self.session.login(user.clone(), &login.access, &login.refresh);
        debug!(user = %user.id, "Logged in");
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Streams the AI answer as decoded text fragments.
    pub async fn chat(
        &self,
        message: &str,
        user_id: Option<&str>,
    ) -> Result<Box<dyn Stream<Item = Result<String>> + Send + Unpin>> {
        let response = self
            .with_cookie(self.http.post(self.url("/api/ai/chat")))
            .json(&ChatRequest {
                message: message.to_string(),
                user_id: user_id.map(str::to_string),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").map(js_string))
                .unwrap_or_else(|| status.to_string());
            return Err(AppError::Upstream(detail));
        }

        let output_stream = stream! {
            let mut bytes = response.bytes_stream();
            let mut decoder = Utf8ChunkDecoder::new();

            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        let text = decoder.push(&chunk);
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Err(e) => {
                        yield Err(AppError::Upstream(format!("Chat stream interrupted: {}", e)));
                        break;
                    }
                }
            }

            let rest = decoder.finish();
            if !rest.is_empty() {
                yield Ok(rest);
            }
        };

        Ok(Box::new(Box::pin(output_stream)))
    }

    /// Sends a WhatsApp message through the server's messaging proxy.
    pub async fn send_whatsapp_message(&self, to: &str, message: &str) -> Result<SendMessageResponse> {
        let response = self
            .with_cookie(self.http.post(self.url("/api/send-whatsapp-message")))
            .json(&SendMessageRequest {
                to: to.to_string(),
                message: message.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid messaging response: {}", e)))?;

        if !status.is_success() || !body.success {
            let reason = body
                .error
                .unwrap_or_else(|| "Failed to send message".to_string());
            warn!(%status, "Message not sent: {}", reason);
            return Err(AppError::Messaging(reason));
        }
        Ok(body)
    }

    /// Fetches a dashboard document without following redirects.
    pub async fn get_page(&self, path: &str) -> Result<PageResponse> {
        let response = self.with_cookie(self.http.get(self.url(path))).send().await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| AppError::Upstream("Redirect without a location".to_string()))?
                .to_string();
            return Ok(PageResponse::Redirect(location));
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(PageResponse::Page(body));
        }

        let detail = body
            .get("error")
            .map(js_string)
            .unwrap_or_else(|| status.to_string());
        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound(detail),
            StatusCode::BAD_REQUEST => AppError::InvalidInput(detail),
            _ => AppError::Upstream(detail),
        })
    }

    /// Requests a fresh feed plan for one cow.
    pub async fn recommend(&self, cow_id: u32, health: HealthStatus) -> Result<RecommendationResponse> {
        let response = self
            .with_cookie(
                self.http
                    .post(self.url("/dashboard/feed-optimization/recommendations")),
            )
            .json(&RecommendationRequest {
                cow_id,
                health_status: health.label().to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_redirection() {
            return Err(AppError::Auth(
                "Not logged in; run `ecodairy login` first".to_string(),
            ));
        }
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").map(js_string))
                .unwrap_or_else(|| status.to_string());
            return Err(match status {
                StatusCode::NOT_FOUND => AppError::NotFound(detail),
                StatusCode::BAD_REQUEST => AppError::InvalidInput(detail),
                _ => AppError::Upstream(detail),
            });
        }

        Ok(response.json().await?)
    }
}
