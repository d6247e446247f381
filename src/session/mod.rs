//! Client-side session state.
//!
//! [`UserSessionStore`] is the only writer of authentication state. It owns
//! the in-memory user record and the cookie projection of the access token;
//! the cookie is the source of truth for the token.

use crate::types::Result;
use crate::utils::toml_config::DairyConfig;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Profile returned by the auth backend on login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub subscription_status: String,
    pub streak: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// The access-token cookie as the browser would store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessCookie {
    pub name: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub secure: bool,
}

impl AccessCookie {
    pub fn new(name: &str, value: &str, max_age_days: i64, secure: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            expires_at: Utc::now() + Duration::days(max_age_days),
            secure,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Storage for cookies.
pub trait CookieJar: Send + Sync {
    fn set(&self, cookie: AccessCookie) -> Result<()>;
    fn get(&self, name: &str) -> Result<Option<AccessCookie>>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// Cookies that live as long as the process.
#[derive(Default)]
pub struct MemoryCookieJar {
    cookies: RwLock<HashMap<String, AccessCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&self, cookie: AccessCookie) -> Result<()> {
        self.cookies.write().insert(cookie.name.clone(), cookie);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<AccessCookie>> {
        Ok(self.cookies.read().get(name).cloned())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.cookies.write().remove(name);
        Ok(())
    }
}

/// Cookies persisted as a JSON object in one file, so separate CLI runs
/// share a login.
pub struct FileCookieJar {
    path: PathBuf,
}

impl FileCookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, AccessCookie>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn store(&self, cookies: &HashMap<String, AccessCookie>) -> Result<()> {
        crate::chat_history::write_atomically(&self.path, &serde_json::to_vec_pretty(cookies)?)
    }
}

impl CookieJar for FileCookieJar {
    fn set(&self, cookie: AccessCookie) -> Result<()> {
        let mut cookies = self.load()?;
        cookies.insert(cookie.name.clone(), cookie);
        self.store(&cookies)
    }

    fn get(&self, name: &str) -> Result<Option<AccessCookie>> {
        Ok(self.load()?.remove(name))
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut cookies = self.load()?;
        if cookies.remove(name).is_some() {
            self.store(&cookies)?;
        }
        Ok(())
    }
}

/// Single writer of the session: login and logout are the only mutations.
pub struct UserSessionStore {
    jar: Box<dyn CookieJar>,
    state: RwLock<UserState>,
    cookie_name: String,
    max_age_days: i64,
    secure: bool,
}

impl UserSessionStore {
    pub fn new(jar: Box<dyn CookieJar>, cookie_name: &str, max_age_days: i64, secure: bool) -> Self {
        Self {
            jar,
            state: RwLock::new(UserState::default()),
            cookie_name: cookie_name.to_string(),
            max_age_days,
            secure,
        }
    }

    /// Cookie name, lifetime and `Secure` flag from `[auth]` and
    /// `server.environment`.
    pub fn from_config(jar: Box<dyn CookieJar>, config: &DairyConfig) -> Self {
        Self::new(
            jar,
            &config.auth.cookie_name,
            config.auth.cookie_max_age_days,
            config.server.is_production(),
        )
    }

    /// Records a successful login.
    ///
    /// The cookie is written first; if that fails the error is logged and
    /// the in-memory state is still updated.
    pub fn login(&self, user: UserProfile, access_token: &str, refresh_token: &str) {
        let cookie = AccessCookie::new(
            &self.cookie_name,
            access_token,
            self.max_age_days,
            self.secure,
        );
        if let Err(e) = self.jar.set(cookie) {
            error!("Failed to store access token cookie: {}", e);
        }

        let mut state = self.state.write();
        debug!(user = %user.id, "Session started");
        *state = UserState {
            user: Some(user),
            is_authenticated: true,
            access_token: Some(access_token.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        };
    }

    pub fn logout(&self) {
        if let Err(e) = self.jar.remove(&self.cookie_name) {
            error!("Failed to remove access token cookie: {}", e);
        }
        *self.state.write() = UserState::default();
        debug!("Session cleared");
    }

    /// Current access token, read from the cookie. Expired or unreadable
    /// cookies read as absent.
    pub fn access_token(&self) -> Option<String> {
        match self.jar.get(&self.cookie_name) {
            Ok(Some(cookie)) if !cookie.is_expired(Utc::now()) => Some(cookie.value),
            Ok(_) => None,
            Err(e) => {
                error!("Failed to read access token cookie: {}", e);
                None
            }
        }
    }

    /// The cookie as it would be sent on a request.
    pub fn cookie_header(&self) -> Option<String> {
        self.access_token()
            .map(|token| format!("{}={}", self.cookie_name, token))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().user.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    pub fn snapshot(&self) -> UserState {
        self.state.read().clone()
    }
}

/// Jar that rejects every write, for exercising the logging path.
#[cfg(test)]
pub(crate) struct BrokenCookieJar;

#[cfg(test)]
impl CookieJar for BrokenCookieJar {
    fn set(&self, _cookie: AccessCookie) -> Result<()> {
        Err(crate::types::AppError::Storage("disk full".to_string()))
    }

    fn get(&self, _name: &str) -> Result<Option<AccessCookie>> {
        Ok(None)
    }

    fn remove(&self, _name: &str) -> Result<()> {
        Err(crate::types::AppError::Storage("disk full".to_string()))
    }
}
