//! Streaming chat, single-shot or interactive.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use zee_client::session::STOPPED_MARKER;
use zee_client::stream::forward_to;
use zee_client::{
    AppStore, ChatEvent, ChatRequest, ChatSession, Client, StoreAction, TurnUpdate, ZeeConfig,
    directory,
};

use super::conversations::message_meta;

#[derive(Args)]
pub struct ChatArgs {
    /// Model to chat with (defaults to the first installed model)
    #[arg(long)]
    model: Option<String>,

    /// Continue an existing conversation
    #[arg(long)]
    conversation: Option<String>,

    /// System prompt for this session
    #[arg(long)]
    system: Option<String>,

    /// Send one message and exit; omit for an interactive session
    message: Option<String>,
}

/// How a single turn ended
enum TurnEnd {
    Completed,
    Stopped,
    Failed(String),
}

pub async fn execute(client: Client<ZeeConfig>, args: ChatArgs) -> Result<()> {
    if args.message.as_deref().is_some_and(|m| m.trim().is_empty()) {
        anyhow::bail!("Message is empty");
    }

    let mut store = AppStore::new();
    if let Some(model) = args.model {
        store.apply(StoreAction::SelectModel(model));
    }
    if let Some(prompt) = args.system {
        store.apply(StoreAction::SetSystemPrompt(prompt));
    }
    if store.selected_model().is_none() {
        let refreshed = directory::refresh(&client)
            .await
            .context("No model given and the model list could not be fetched")?;
        store.apply(refreshed);
    }
    let Some(model) = store.selected_model().map(str::to_string) else {
        anyhow::bail!("No models available. Pull one with `zee models pull <name>`");
    };

    let mut session = match args.conversation {
        Some(id) => {
            let history = client.conversations().messages(&id).await?;
            store.apply(StoreAction::SetActiveConversation(Some(id.clone())));
            ChatSession::resume(model, id, history)
        }
        None => ChatSession::new(model),
    };

    match args.message {
        Some(message) => match run_turn(&client, &mut store, &mut session, &message).await? {
            TurnEnd::Completed | TurnEnd::Stopped => Ok(()),
            TurnEnd::Failed(message) => Err(anyhow::anyhow!(message)),
        },
        None => interactive(client, store, session).await,
    }
}

async fn interactive(client: Client<ZeeConfig>, mut store: AppStore, mut session: ChatSession) -> Result<()> {
    let (tx, mut actions) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let poller = directory::spawn_poller(client.clone(), tx, cancel.clone());

    println!(
        "{} {}  {}",
        "Chatting with".dimmed(),
        session.model().cyan(),
        "(/model NAME, /new, /quit; Ctrl-C stops a reply)".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".green().bold());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        while let Ok(action) = actions.try_recv() {
            store.apply(action);
        }

        let input = line.trim();
        match input {
            "" => {}
            "/quit" | "/exit" => break,
            "/new" => {
                session = ChatSession::new(session.model());
                store.apply(StoreAction::SetActiveConversation(None));
                println!("{}", "Started a new conversation".dimmed());
            }
            _ if input.starts_with("/model") => {
                let name = input.trim_start_matches("/model").trim();
                if name.is_empty() {
                    list_models(&store);
                } else {
                    store.apply(StoreAction::SelectModel(name.to_string()));
                    session.set_model(name);
                    println!("{} {}", "Model:".dimmed(), name.cyan());
                }
            }
            _ => {
                if let TurnEnd::Failed(message) = run_turn(&client, &mut store, &mut session, input).await? {
                    eprintln!("{} {message}", "Error:".red().bold());
                }
            }
        }
    }

    cancel.cancel();
    let _ = poller.await;
    Ok(())
}

fn list_models(store: &AppStore) {
    for model in store.models() {
        let marker = if store.selected_model() == Some(model.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {}", model.name);
    }
}

async fn run_turn(
    client: &Client<ZeeConfig>,
    store: &mut AppStore,
    session: &mut ChatSession,
    input: &str,
) -> Result<TurnEnd> {
    if !store.can_send(input) {
        return Ok(TurnEnd::Completed);
    }

    let text = session.begin_turn(input).content.clone();
    let req = ChatRequest::new(session.model(), text)
        .with_conversation(session.conversation_id().map(str::to_string))
        .with_system_prompt(store.system_prompt());

    store.apply(StoreAction::SetStreaming(true));
    let (tx, mut events) = mpsc::unbounded_channel();
    let stream = client.chat().stream(req, forward_to(tx));

    let mut stdout = std::io::stdout();
    let mut end = TurnEnd::Completed;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ChatEvent::Chunk(chunk)) => {
                    for update in session.apply_chunk(&chunk) {
                        match update {
                            TurnUpdate::ConversationAssigned(id) => {
                                store.apply(StoreAction::SetActiveConversation(Some(id)));
                            }
                            TurnUpdate::Delta(text) => {
                                print!("{text}");
                                stdout.flush()?;
                            }
                            TurnUpdate::Failed(message) => end = TurnEnd::Failed(message),
                            TurnUpdate::Finished(message) => print_footer(&message),
                        }
                    }
                }
                Some(ChatEvent::Done(_)) => {
                    if let Some(message) = session.finish() {
                        print_footer(&message);
                    }
                }
                Some(ChatEvent::Error(message)) => {
                    session.fail(message.clone());
                    end = TurnEnd::Failed(message);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                stream.cancel();
                if session.stop().is_some() {
                    println!("{}", STOPPED_MARKER.dimmed());
                }
                end = TurnEnd::Stopped;
                break;
            }
        }
    }

    let outcome = stream.join().await;
    tracing::debug!(?outcome, "chat turn ended");
    store.apply(StoreAction::SetStreaming(false));
    Ok(end)
}

fn print_footer(message: &zee_client::types::Message) {
    println!();
    if let Some(meta) = message_meta(message) {
        println!("{}", meta.dimmed());
    }
}
