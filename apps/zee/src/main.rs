//! Zee command-line client.
//!
//! The `zee` command talks to a running Zee backend: health and usage
//! stats, model and conversation management, and streaming chat.

use anyhow::Result;
use clap::{Parser, Subcommand};
use zee_client::{Client, ZeeConfig};

mod commands;

#[derive(Parser)]
#[command(name = "zee")]
#[command(about = "Chat with local models through a Zee backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL
    #[arg(long, env = "ZEE_API_URL", global = true)]
    api_url: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long, env = "ZEE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend and model server health
    Health,

    /// Show usage statistics
    Stats,

    /// Manage installed models
    Models {
        #[command(subcommand)]
        command: commands::models::ModelCommands,
    },

    /// Manage conversations
    Conversations {
        #[command(subcommand)]
        command: commands::conversations::ConversationCommands,
    },

    /// Chat with a model (interactive without MESSAGE)
    Chat(commands::chat::ChatArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let client = build_client(cli.api_url, cli.api_key);

    match cli.command {
        Commands::Health => commands::system::health(&client).await,
        Commands::Stats => commands::system::stats(&client).await,
        Commands::Models { command } => commands::models::execute(&client, command).await,
        Commands::Conversations { command } => {
            commands::conversations::execute(&client, command).await
        }
        Commands::Chat(args) => commands::chat::execute(client, args).await,
    }
}

fn build_client(api_url: Option<String>, api_key: Option<String>) -> Client<ZeeConfig> {
    let mut config = ZeeConfig::new();
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        config = config.with_api_base(url.trim());
    }
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config = config.with_api_key(key.trim());
    }
    Client::with_config(config)
}
