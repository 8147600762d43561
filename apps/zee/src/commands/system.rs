//! Health and stats commands.

use anyhow::Result;
use colored::Colorize;
use zee_client::{Client, ZeeConfig};

pub async fn health(client: &Client<ZeeConfig>) -> Result<()> {
    let health = client.health().check().await?;

    let status = if health.is_healthy() {
        health.status.green()
    } else {
        health.status.yellow()
    };
    let ollama = if health.ollama {
        "connected".green()
    } else {
        "unreachable".red()
    };

    println!("{} {status}", "backend:".bold());
    println!("{} {ollama}", "ollama: ".bold());
    if !health.version.is_empty() {
        println!("{} {}", "version:".bold(), health.version);
    }
    Ok(())
}

pub async fn stats(client: &Client<ZeeConfig>) -> Result<()> {
    let stats = client.stats().get().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
