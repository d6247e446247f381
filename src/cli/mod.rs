//! CLI module for EcoDairy
//!
//! Provides command-line interface parsing for the `ecodairy` binary, which is
//! both the dashboard server and a terminal client for it.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EcoDairy.AI - dairy herd dashboard
///
/// Serves the herd dashboard, feed recommendations, AI chat relay and
/// WhatsApp reports, and talks to a running server from the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "ecodairy",
    author = "EcoDairy <dev@ecodairy.ai>",
    version,
    about = "EcoDairy.AI - dairy herd dashboard server and terminal client",
    long_about = "Dairy herd dashboard with generated feed recommendations, methane monitoring,\n\
                  a streaming AI advisor and WhatsApp reports.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  ecodairy init                           # Scaffold ecodairy.toml and .env.example\n    \
                  ecodairy                                # Start the server (requires ecodairy.toml)\n    \
                  ecodairy login farmer@example.com       # Log in against the auth backend\n    \
                  ecodairy chat \"Which cow needs help?\"   # Ask the AI advisor\n    \
                  ecodairy recommend 1 --health Healthy   # Generate a feed plan for Bessie"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ecodairy.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve,

    /// Initialize a new EcoDairy project
    ///
    /// Creates ecodairy.toml, .env.example and the data directory.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// AI provider to configure (gemini or ollama)
        #[arg(long, default_value = "gemini")]
        provider: String,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Log in against the auth backend and store the access cookie
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(long, env = "ECODAIRY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Clear the stored session
    Logout,

    /// Ask the AI advisor a question and stream the answer
    Chat {
        /// The question
        message: String,

        /// Continue an existing chat session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,

        /// Do not record the exchange in the local chat history
        #[arg(long)]
        no_save: bool,
    },

    /// Manage locally stored chat sessions
    #[command(subcommand)]
    History(HistoryCommands),

    /// Generate a feed recommendation for a cow
    Recommend {
        /// Cow id (1 = Bessie, 2 = Daisy, 3 = Molly)
        cow_id: u32,

        /// Health status: Healthy, Injured or "Chronically Sick"
        #[arg(long, default_value = "Healthy")]
        health: String,
    },

    /// Send the monthly report over WhatsApp
    SendReport {
        /// Destination phone number; a leading 0 is replaced with +254
        to: String,

        /// Message body
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Fetch a dashboard document and print it as JSON
    Page {
        /// Path on the server, e.g. /dashboard/statistics
        path: String,
    },

    /// Mint a development access token with the configured secret
    Token {
        /// Value of the user_id claim
        user_id: String,

        /// Lifetime in hours
        #[arg(long, default_value = "168")]
        hours: i64,
    },
}

/// Chat history subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List all stored chat sessions
    List,

    /// Show the messages of one session
    Show {
        /// Session id
        id: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
