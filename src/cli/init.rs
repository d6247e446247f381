//! Init command implementation
//!
//! Scaffolds a new EcoDairy project: `ecodairy.toml`, `.env.example`,
//! `.gitignore` and the client data directory.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (ecodairy.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// AI provider to configure (gemini or ollama)
    pub provider: String,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing EcoDairy Project");

    if !matches!(config.provider.as_str(), "gemini" | "ollama") {
        output.error(&format!(
            "Unknown provider '{}' (expected gemini or ollama)",
            config.provider
        ));
        return InitResult::Error(format!("unknown provider: {}", config.provider));
    }

    let base_path = &config.path;
    let config_path = base_path.join("ecodairy.toml");
    if config_path.exists() && !config.force {
        output.warning("ecodairy.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating directories");
    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.skipped("data", "already exists");
    } else if let Err(e) = fs::create_dir_all(&data_dir) {
        output.error(&format!("Failed to create data: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("directory", "data");
    }

    output.subheader("Creating configuration files");

    if let Err(e) = write_file(&config_path, &generate_ecodairy_toml(&config), config.force) {
        output.error(&format!("Failed to create ecodairy.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "ecodairy.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = write_file(&gitignore_path, GITIGNORE, false) {
            output.warning(&format!("Failed to create .gitignore: {}", e));
        } else {
            output.created("file", ".gitignore");
        }
    }

    output.complete("EcoDairy project initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set JWT_SECRET_KEY, BASE_SERVER_URL and the provider keys");
    output.newline();

    if config.provider == "ollama" {
        output.info("2. Start Ollama and build with the ollama feature:");
        output.command("ollama serve");
        output.command("cargo build --features ollama");
        output.newline();
    }

    output.info("3. Start the server:");
    output.command("ecodairy serve");
    output.newline();

    output.hint(&format!(
        "Dashboard will be available at http://{}:{}/dashboard",
        config.host, config.port
    ));
    output.hint("OpenAPI document at /api-docs/openapi.json");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_ecodairy_toml(config: &InitConfig) -> String {
    let ai_section = if config.provider == "ollama" {
        r#"# Local Ollama server (requires the `ollama` cargo feature)
[ai]
provider = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2:3b"
"#
    } else {
        r#"# Google Gemini (set GEMINI_API_KEY in .env)
[ai]
provider = "gemini"
api_key_env = "GEMINI_API_KEY"
api_base = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-1.5-pro"
"#
    };

    format!(
        r#"# EcoDairy configuration
# Secrets are never stored here; each *_env key names the environment
# variable that holds the value.

[server]
host = "{host}"
port = {port}
log_level = "info"
# "production" marks the access cookie Secure
environment = "development"

[auth]
jwt_secret_env = "JWT_SECRET_KEY"
cookie_name = "accessToken"
cookie_max_age_days = 7

[routes]
login_path = "/dashboard/login"
public_prefixes = ["/dashboard/login", "/dashboard/register", "/"]
protected_prefixes = ["/dashboard"]

{ai_section}
# Twilio WhatsApp delivery
[messaging]
account_sid_env = "TWILIO_ACCOUNT_SID"
auth_token_env = "TWILIO_AUTH_TOKEN"
from = "whatsapp:+14155238886"
channel_prefix = "whatsapp:"
api_base = "https://api.twilio.com"

# External auth backend (login endpoint is {{base}}/login/)
[backend]
base_url_env = "BASE_SERVER_URL"

# Terminal client
[client]
server_url = "http://{host}:{port}"
data_dir = "./data"
"#,
        host = config.host,
        port = config.port,
        ai_section = ai_section,
    )
}

fn generate_env_example() -> String {
    r#"# EcoDairy Environment Variables
# Copy this file to .env and fill in the values.

# REQUIRED: secret shared with the auth backend that signs access tokens
JWT_SECRET_KEY=change-me-to-the-backend-signing-secret

# Auth backend base URL (the CLI posts to $BASE_SERVER_URL/login/)
BASE_SERVER_URL=http://localhost:8000/api

# Gemini API key
GEMINI_API_KEY=your-gemini-key

# Twilio credentials for WhatsApp reports
TWILIO_ACCOUNT_SID=ACxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx
TWILIO_AUTH_TOKEN=your-twilio-token

# Optional: Logging level (trace, debug, info, warn, error)
RUST_LOG=info,ecodairy=debug
"#
    .to_string()
}

const GITIGNORE: &str = r#"# EcoDairy client data (chat history, cookie jar)
/data/

# Environment
.env
.env.local

# Rust
/target/
"#;
