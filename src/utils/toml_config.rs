//! TOML-based configuration for EcoDairy
//!
//! Infrastructure settings (server, auth cookie, route protection, AI
//! provider, messaging provider, external backend) live in `ecodairy.toml`.
//! Secrets are never written to the file; the file names the environment
//! variables that hold them.
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `DairyConfigManager` for thread-safe access to the current configuration.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from ecodairy.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DairyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub ai: AiProviderConfig,

    #[serde(default)]
    pub messaging: MessagingConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `production` turns on the `Secure` cookie attribute
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            environment: default_environment(),
        }
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the shared JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Name of the cookie carrying the access token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET_KEY".to_string()
}

fn default_cookie_name() -> String {
    "accessToken".to_string()
}

fn default_cookie_max_age_days() -> i64 {
    7
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            cookie_name: default_cookie_name(),
            cookie_max_age_days: default_cookie_max_age_days(),
        }
    }
}

// ============= Route Protection Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Checked first; a match always passes through
    #[serde(default = "default_public_prefixes")]
    pub public_prefixes: Vec<String>,

    /// A match requires a valid access-token cookie
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
}

fn default_login_path() -> String {
    "/dashboard/login".to_string()
}

fn default_public_prefixes() -> Vec<String> {
    vec![
        "/dashboard/login".to_string(),
        "/dashboard/register".to_string(),
        "/".to_string(),
    ]
}

fn default_protected_prefixes() -> Vec<String> {
    vec!["/dashboard".to_string()]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            public_prefixes: default_public_prefixes(),
            protected_prefixes: default_protected_prefixes(),
        }
    }
}

// ============= AI Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum AiProviderConfig {
    Gemini {
        /// Environment variable containing API key
        #[serde(default = "default_gemini_key_env")]
        api_key_env: String,
        #[serde(default = "default_gemini_base")]
        api_base: String,
        #[serde(default = "default_gemini_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for AiProviderConfig {
    fn default() -> Self {
        AiProviderConfig::Gemini {
            api_key_env: default_gemini_key_env(),
            api_base: default_gemini_base(),
            model: default_gemini_model(),
        }
    }
}

// ============= Messaging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_account_sid_env")]
    pub account_sid_env: String,

    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,

    /// Sender identity, including the channel prefix
    #[serde(default = "default_from")]
    pub from: String,

    /// Prefix applied to the destination number
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,

    #[serde(default = "default_twilio_base")]
    pub api_base: String,
}

fn default_account_sid_env() -> String {
    "TWILIO_ACCOUNT_SID".to_string()
}

fn default_auth_token_env() -> String {
    "TWILIO_AUTH_TOKEN".to_string()
}

fn default_from() -> String {
    "whatsapp:+14155238886".to_string()
}

fn default_channel_prefix() -> String {
    "whatsapp:".to_string()
}

fn default_twilio_base() -> String {
    "https://api.twilio.com".to_string()
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid_env: default_account_sid_env(),
            auth_token_env: default_auth_token_env(),
            from: default_from(),
            channel_prefix: default_channel_prefix(),
            api_base: default_twilio_base(),
        }
    }
}

// ============= External Backend Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Environment variable containing the base URL of the auth backend
    #[serde(default = "default_backend_url_env")]
    pub base_url_env: String,
}

fn default_backend_url_env() -> String {
    "BASE_SERVER_URL".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url_env: default_backend_url_env(),
        }
    }
}

// ============= Terminal Client Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Dashboard server the CLI talks to
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Where chat history and the cookie jar are kept
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            data_dir: default_data_dir(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    MissingAiKey,
    MissingMessagingCredentials,
    MissingBackendUrl,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl DairyConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating it.
    ///
    /// The terminal client only needs the `client` and `backend` sections and
    /// must work on machines that do not hold the server's JWT secret.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The route guard cannot verify anything without the shared secret
        self.validate_env_var(&self.auth.jwt_secret_env)?;

        if self.auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.cookie_name must not be empty".to_string(),
            ));
        }
        if self.auth.cookie_max_age_days <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.cookie_max_age_days must be positive".to_string(),
            ));
        }

        let routes = &self.routes;
        for prefix in routes
            .public_prefixes
            .iter()
            .chain(routes.protected_prefixes.iter())
            .chain(std::iter::once(&routes.login_path))
        {
            if !prefix.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "Route prefix '{}' must start with '/'",
                    prefix
                )));
            }
        }

        // A protected login page would redirect to itself forever
        let login_is_public = routes
            .public_prefixes
            .iter()
            .any(|prefix| crate::auth::middleware::prefix_matches(prefix, &routes.login_path));
        if !login_is_public {
            return Err(ConfigError::ValidationError(format!(
                "Login path '{}' must be covered by a public prefix",
                routes.login_path
            )));
        }

        Ok(())
    }

    /// Validate configuration and report optional secrets that are missing
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if let AiProviderConfig::Gemini { api_key_env, .. } = &self.ai
            && self.resolve_env(api_key_env).is_none()
        {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::MissingAiKey,
                message: format!(
                    "Environment variable '{}' is not set; AI chat requests will fail",
                    api_key_env
                ),
            });
        }

        let missing_messaging: Vec<&str> = [
            self.messaging.account_sid_env.as_str(),
            self.messaging.auth_token_env.as_str(),
        ]
        .into_iter()
        .filter(|name| self.resolve_env(name).is_none())
        .collect();
        if !missing_messaging.is_empty() {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::MissingMessagingCredentials,
                message: format!(
                    "Messaging credentials not set ({}); report delivery will fail",
                    missing_messaging.join(", ")
                ),
            });
        }

        if self.resolve_env(&self.backend.base_url_env).is_none() {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::MissingBackendUrl,
                message: format!(
                    "Environment variable '{}' is not set; login is unavailable",
                    self.backend.base_url_env
                ),
            });
        }

        Ok(warnings)
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Get the external auth backend base URL from the environment
    pub fn backend_url(&self) -> Option<String> {
        self.resolve_env(&self.backend.base_url_env)
            .map(|url| url.trim_end_matches('/').to_string())
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct DairyConfigManager {
    config: Arc<ArcSwap<DairyConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
    reload_tx: Option<mpsc::UnboundedSender<()>>,
}

impl DairyConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = DairyConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
            reload_tx: None,
        })
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<DairyConfig> {
        self.config.load_full()
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = DairyConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&mut self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        self.reload_tx = Some(tx.clone());

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        // Debounced in the receiver
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload = std::time::Instant::now();
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.elapsed() < debounce_duration {
                    continue;
                }

                // Wait a bit for file write to complete
                tokio::time::sleep(Duration::from_millis(100)).await;

                match DairyConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = std::time::Instant::now();
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

impl Clone for DairyConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
            reload_tx: self.reload_tx.clone(),
        }
    }
}

impl DairyConfigManager {
    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: DairyConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("test-config.toml"),
            watcher: RwLock::new(None),
            reload_tx: None,
        }
    }
}
