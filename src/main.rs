use anyhow::{Context, Result};
use ecodairy::{
    AppState, ConfigBasedLLMFactory, ConfigBasedMessenger, DairyConfig, DairyConfigManager,
    api::routes::create_router,
    auth::jwt::issue_token,
    chat_history::{ChatHistory, ChatSession, Message, Role, session_title},
    cli::{
        Cli, Commands, HistoryCommands,
        init::{self, InitConfig, InitResult},
        output::Output,
    },
    client::{DEFAULT_REPORT_MESSAGE, DashboardClient, PageResponse, normalize_phone_number},
    mock::HealthStatus,
    session::{FileCookieJar, UserSessionStore},
    utils::toml_config::{AiProviderConfig, ConfigError},
};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const COOKIE_FILE_NAME: &str = "cookies.json";
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = Output::new(!cli.no_color);

    match cli.command {
        None | Some(Commands::Serve) => serve(&cli.config, cli.verbose, cli.log_json, &output).await,
        Some(Commands::Init {
            path,
            force,
            provider,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    provider,
                    host,
                    port,
                },
                &output,
            );
            match result {
                InitResult::Success => Ok(()),
                InitResult::AlreadyExists | InitResult::Error(_) => std::process::exit(1),
            }
        }
        Some(Commands::Config { full, validate }) => show_config(&cli.config, full, validate, &output),
        Some(Commands::Login { email, password }) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            let user = dashboard_client(&config)?.login(&email, &password).await?;
            output.success(&format!("Logged in as {}", user.full_name));
            output.kv("Email", &user.email);
            output.kv("Subscription", &user.subscription_status);
            output.kv("Streak", &user.streak.to_string());
            Ok(())
        }
        Some(Commands::Logout) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            dashboard_client(&config)?.logout();
            output.success("Logged out");
            Ok(())
        }
        Some(Commands::Chat {
            ref message,
            ref session,
            no_save,
        }) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            chat(&config, message, session.clone(), no_save, &output).await
        }
        Some(Commands::History(ref command)) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            history(&config, command, &output)
        }
        Some(Commands::Recommend { cow_id, ref health }) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            recommend(&config, cow_id, health, &output).await
        }
        Some(Commands::SendReport { ref to, ref message }) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            let to = normalize_phone_number(to);
            let message = message.as_deref().unwrap_or(DEFAULT_REPORT_MESSAGE);
            let response = dashboard_client(&config)?
                .send_whatsapp_message(&to, message)
                .await?;
            output.success(&format!("Report sent to {}", to));
            if let Some(id) = response.message_id {
                output.kv("Message id", &id);
            }
            Ok(())
        }
        Some(Commands::Page { ref path }) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            match dashboard_client(&config)?.get_page(path).await? {
                PageResponse::Page(document) => output.json(&document),
                PageResponse::Redirect(location) => {
                    output.warning(&format!("Redirected to {}", location));
                    output.hint("Run `ecodairy login` to open protected pages");
                }
            }
            Ok(())
        }
        Some(Commands::Token { ref user_id, hours }) => {
            let config = client_setup(&cli.config, cli.verbose, cli.log_json)?;
            let secret = config.jwt_secret()?;
            let token = issue_token(&secret, user_id, chrono::Duration::hours(hours))?;
            println!("{}", token);
            Ok(())
        }
    }
}

/// Client commands work without a config file and without the JWT secret.
fn client_setup(config_path: &Path, verbose: bool, log_json: bool) -> Result<DairyConfig> {
    init_tracing(if verbose { "debug" } else { "warn" }, log_json);
    if config_path.exists() {
        Ok(DairyConfig::read(config_path)?)
    } else {
        Ok(DairyConfig::default())
    }
}

fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{default_level},tower_http={default_level}").into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output (chat fragments, tokens, documents)
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
}

async fn serve(config_path: &Path, verbose: bool, log_json: bool, output: &Output) -> Result<()> {
    let mut config_manager = match DairyConfigManager::new(config_path) {
        Ok(manager) => manager,
        Err(ConfigError::FileNotFound(path)) => {
            output.error(&format!("Configuration file not found: {}", path.display()));
            output.hint("Run `ecodairy init` to create one");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    let config = config_manager.config();
    let level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    init_tracing(level, log_json);

    for warning in config.validate_with_warnings()? {
        warn!("{}", warning);
    }

    config_manager
        .start_watching()
        .context("Failed to watch configuration file")?;
    let config_manager = Arc::new(config_manager);

    let state = AppState {
        llm_factory: Arc::new(ConfigBasedLLMFactory::new(config_manager.clone())),
        messenger: Arc::new(ConfigBasedMessenger::new(config_manager.clone())),
        config_manager: config_manager.clone(),
    };

    // Outermost first: tracing sees every request, including rejected bodies
    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .map_response(|res: axum::http::Response<_>| res.map(axum::body::Body::new))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("EcoDairy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    config_manager.stop_watching();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutting down");
}

fn show_config(path: &Path, full: bool, validate: bool, output: &Output) -> Result<()> {
    let config = match DairyConfig::read(path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(path)) => {
            output.error(&format!("Configuration file not found: {}", path.display()));
            output.hint("Run `ecodairy init` to create one");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to read configuration"),
    };

    if validate {
        output.header("Validating configuration");
        match config.validate_with_warnings() {
            Ok(warnings) => {
                output.success("Configuration is valid");
                for warning in warnings {
                    output.warning(&warning.message);
                }
            }
            Err(e) => {
                output.error(&e.to_string());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    if full {
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    output.header("Configuration");
    output.kv("File", &path.display().to_string());
    output.kv("Listen", &config.bind_address());
    output.kv("Environment", &config.server.environment);
    let ai = match &config.ai {
        AiProviderConfig::Gemini { model, .. } => format!("gemini ({})", model),
        AiProviderConfig::Ollama { model, .. } => format!("ollama ({})", model),
    };
    output.kv("AI provider", &ai);
    output.kv("Login path", &config.routes.login_path);
    output.kv("Protected", &config.routes.protected_prefixes.join(", "));
    output.kv("Server URL (client)", &config.client.server_url);
    output.kv("Data directory", &config.client.data_dir.display().to_string());
    Ok(())
}

fn dashboard_client(config: &DairyConfig) -> Result<DashboardClient> {
    let jar = FileCookieJar::new(config.client.data_dir.join(COOKIE_FILE_NAME));
    let session = Arc::new(UserSessionStore::from_config(Box::new(jar), config));
    Ok(DashboardClient::new(
        &config.client.server_url,
        config.backend_url(),
        session,
    )?)
}

async fn recommend(config: &DairyConfig, cow_id: u32, health: &str, output: &Output) -> Result<()> {
    let health: HealthStatus = health.parse()?;
    let response = dashboard_client(config)?.recommend(cow_id, health).await?;

    output.header(&format!("Feed plan for {} ({})", response.cow.name, health));
    let plan = &response.recommendation;
    output.kv(
        "Dry matter",
        &format!("{} {}", plan.dry_matter_intake.kind, plan.dry_matter_intake.amount),
    );
    output.kv(
        "Additive",
        &format!("{} {}", plan.feed_additive.kind, plan.feed_additive.amount),
    );
    for comparison in [&response.milk_comparison, &response.methane_comparison] {
        output.kv(
            &format!("{:?}", comparison.kind),
            &format!(
                "{} -> {} {} ({}{}%)",
                comparison.current_value,
                comparison.predicted_value,
                comparison.unit,
                if comparison.is_improvement { "better by " } else { "worse by " },
                comparison.change_pct
            ),
        );
    }
    output.newline();
    output.info(&plan.summary);
    Ok(())
}

async fn chat(
    config: &DairyConfig,
    message: &str,
    session_id: Option<String>,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let history = ChatHistory::new(&config.client.data_dir);
    let existing: Option<ChatSession> = match &session_id {
        Some(id) => Some(
            history
                .get_session(id)?
                .with_context(|| format!("No chat session with id {}", id))?,
        ),
        None => None,
    };

    let client = dashboard_client(config)?;
    let user_id = client.session().user().map(|user| user.id);
    let mut stream = client.chat(message, user_id.as_deref()).await?;

    let mut answer = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        output.fragment(&fragment);
        answer.push_str(&fragment);
    }
    output.newline();

    if no_save {
        return Ok(());
    }

    let mut session = match existing {
        Some(session) => session,
        None => history.create_new_session(&session_title(message))?,
    };
    session.push(Message::now(Role::User, message));
    session.push(Message::now(Role::Assistant, answer));
    history.save_session(&session)?;
    output.hint(&format!("Saved to chat session {}", session.id));
    Ok(())
}

fn history(config: &DairyConfig, command: &HistoryCommands, output: &Output) -> Result<()> {
    let history = ChatHistory::new(&config.client.data_dir);

    match command {
        HistoryCommands::List => {
            let sessions = history.get_sessions()?;
            if sessions.is_empty() {
                output.info("No chat sessions yet");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = sessions
                .iter()
                .map(|session| {
                    vec![
                        session.id.clone(),
                        session.title.clone(),
                        session.messages.len().to_string(),
                    ]
                })
                .collect();
            output.table(&["Id", "Title", "Messages"], &rows);
        }
        HistoryCommands::Show { id } => {
            let session = history
                .get_session(id)?
                .with_context(|| format!("No chat session with id {}", id))?;
            output.header(&session.title);
            for message in &session.messages {
                let speaker = match message.role {
                    Role::User => "You",
                    Role::Assistant => "EcoDairy",
                };
                output.subheader(&format!(
                    "{} ({})",
                    speaker,
                    message.timestamp.format("%Y-%m-%d %H:%M")
                ));
                println!("{}", message.content);
            }
        }
        HistoryCommands::Delete { id } => {
            history.delete_session(id)?;
            output.success(&format!("Deleted chat session {}", id));
        }
    }

    Ok(())
}
