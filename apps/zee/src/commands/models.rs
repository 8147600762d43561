//! Model management commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use futures::StreamExt;
use std::io::Write;
use zee_client::format::{format_bytes, time_ago};
use zee_client::{Client, ZeeConfig};

#[derive(Subcommand)]
pub enum ModelCommands {
    /// List installed models
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a model
    Rm {
        /// Model name, e.g. gemma3:4b
        name: String,
    },

    /// Download a model, showing progress
    Pull {
        /// Model name, e.g. gemma3:4b
        name: String,
    },
}

pub async fn execute(client: &Client<ZeeConfig>, cmd: ModelCommands) -> Result<()> {
    match cmd {
        ModelCommands::List { json } => cmd_list(client, json).await,
        ModelCommands::Rm { name } => cmd_rm(client, &name).await,
        ModelCommands::Pull { name } => cmd_pull(client, &name).await,
    }
}

async fn cmd_list(client: &Client<ZeeConfig>, json: bool) -> Result<()> {
    let models = client.models().list().await?;

    if json {
        println!("{}", serde_json::to_string(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models installed. Try `zee models pull <name>`.");
        return Ok(());
    }

    let now = chrono::Utc::now();
    for model in &models {
        println!(
            "{:<32} {:>8} {:<8} {:>10}  {}",
            model.name.cyan(),
            model.details.parameter_size,
            model.details.quantization_level,
            format_bytes(model.size),
            time_ago(model.modified_at, now).dimmed()
        );
    }
    Ok(())
}

async fn cmd_rm(client: &Client<ZeeConfig>, name: &str) -> Result<()> {
    client.models().delete(name).await?;
    println!("{} Deleted {}", "OK".green(), name.cyan());
    Ok(())
}

async fn cmd_pull(client: &Client<ZeeConfig>, name: &str) -> Result<()> {
    let mut progress = client.models().pull(name).await?;
    let mut stdout = std::io::stdout();
    let mut last_status = String::new();

    while let Some(event) = progress.next().await {
        let event = event?;
        match event.fraction() {
            Some(fraction) => {
                print!(
                    "\r{} {:>5.1}% ({} / {})",
                    event.status,
                    fraction * 100.0,
                    format_bytes(event.completed.unwrap_or_default()),
                    format_bytes(event.total.unwrap_or_default())
                );
                stdout.flush()?;
            }
            None if event.status != last_status => {
                if !last_status.is_empty() {
                    println!();
                }
                print!("{}", event.status);
                stdout.flush()?;
            }
            None => {}
        }
        last_status = event.status;
    }

    println!();
    println!("{} Pulled {}", "OK".green(), name.cyan());
    Ok(())
}
