//! Conversation management commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use zee_client::format::{format_duration, time_ago};
use zee_client::types::{Message, Role};
use zee_client::{Client, ZeeConfig};

#[derive(Subcommand)]
pub enum ConversationCommands {
    /// List conversations, most recent first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a conversation's messages
    Show {
        /// Conversation id
        id: String,
    },

    /// Create an empty conversation
    New {
        /// Model the conversation starts with
        #[arg(long)]
        model: String,
    },

    /// Set a conversation's title
    Rename {
        /// Conversation id
        id: String,
        /// New title
        title: String,
    },

    /// Delete a conversation
    Rm {
        /// Conversation id
        id: String,
    },
}

pub async fn execute(client: &Client<ZeeConfig>, cmd: ConversationCommands) -> Result<()> {
    match cmd {
        ConversationCommands::List { json } => cmd_list(client, json).await,
        ConversationCommands::Show { id } => cmd_show(client, &id).await,
        ConversationCommands::New { model } => cmd_new(client, &model).await,
        ConversationCommands::Rename { id, title } => cmd_rename(client, &id, &title).await,
        ConversationCommands::Rm { id } => cmd_rm(client, &id).await,
    }
}

async fn cmd_list(client: &Client<ZeeConfig>, json: bool) -> Result<()> {
    let conversations = client.conversations().list().await?;

    if json {
        println!("{}", serde_json::to_string(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }

    let now = chrono::Utc::now();
    for c in &conversations {
        println!(
            "{}  {}  {} {}",
            c.id.dimmed(),
            c.title.bold(),
            c.model.cyan(),
            time_ago(c.updated_at, now).dimmed()
        );
    }
    Ok(())
}

async fn cmd_show(client: &Client<ZeeConfig>, id: &str) -> Result<()> {
    let detail = client.conversations().get(id).await?;
    println!(
        "{} {}\n",
        detail.conversation.title.bold(),
        format!("({})", detail.conversation.model).dimmed()
    );
    for message in &detail.messages {
        print_message(message);
    }
    Ok(())
}

async fn cmd_new(client: &Client<ZeeConfig>, model: &str) -> Result<()> {
    let conversation = client.conversations().create(model).await?;
    println!("{} Created {}", "OK".green(), conversation.id.cyan());
    Ok(())
}

async fn cmd_rename(client: &Client<ZeeConfig>, id: &str, title: &str) -> Result<()> {
    client.conversations().rename(id, title).await?;
    println!("{} Renamed {} to {}", "OK".green(), id.cyan(), title.bold());
    Ok(())
}

async fn cmd_rm(client: &Client<ZeeConfig>, id: &str) -> Result<()> {
    client.conversations().delete(id).await?;
    println!("{} Deleted {}", "OK".green(), id.cyan());
    Ok(())
}

pub fn print_message(message: &Message) {
    let who = match message.role {
        Role::User => "you".blue().bold(),
        Role::Assistant => "assistant".magenta().bold(),
        Role::System => "system".yellow().bold(),
    };
    println!("{who}");
    println!("{}", message.content);
    if let Some(meta) = message_meta(message) {
        println!("{}", meta.dimmed());
    }
    println!();
}

/// Model, token count and generation time of an assistant reply
pub fn message_meta(message: &Message) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(model) = &message.model {
        parts.push(model.clone());
    }
    if let Some(tokens) = message.tokens_used {
        parts.push(format!("{tokens} tokens"));
    }
    if let Some(duration) = message.duration {
        parts.push(format_duration(duration));
    }
    (!parts.is_empty()).then(|| format!("[{}]", parts.join(" · ")))
}
