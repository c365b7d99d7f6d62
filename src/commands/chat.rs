//! Interactive chat session handler
//!
//! Runs a readline loop that submits user input to the router and persists
//! the conversation after every successful exchange. A failed generation is
//! shown in the terminal but rolled back from the history, so retrying the
//! same message does not leave a dangling user turn.

use crate::capabilities::{create_capabilities, ChatTurn};
use crate::config::{Config, ModelChoice, Settings};
use crate::error::Result;
use crate::router::{Router, RouterResponse};
use crate::storage::{derive_title, ChatMessage, ChatStore};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Start an interactive chat session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `model` - Optional model override for this session
/// * `resume` - Optional chat ID or prefix to resume
/// * `storage_path` - Optional history database path override
pub async fn run_chat(
    mut config: Config,
    model: Option<String>,
    resume: Option<String>,
    storage_path: Option<PathBuf>,
) -> Result<()> {
    tracing::info!("Starting interactive chat session");

    if let Some(model) = model {
        config.settings.model = ModelChoice::from(model);
    }

    let store = super::open_store(storage_path.as_ref())?;
    let capabilities = create_capabilities(&config)?;
    let router = Router::new(capabilities, config.provider.gemini.clone());

    let (chat_id, mut messages) = match resume {
        Some(id) => match store.load_chat(&id)? {
            Some((title, messages)) => {
                println!("Resuming chat: {}\n", title.cyan());
                // Resolve the prefix to the stored full id
                let full_id = store
                    .list_chats()?
                    .into_iter()
                    .map(|c| c.id)
                    .find(|c| c.starts_with(&id))
                    .unwrap_or(id);
                (full_id, messages)
            }
            None => {
                println!("{}", format!("No chat found matching '{}'", id).yellow());
                return Ok(());
            }
        },
        None => {
            let id = store.create_chat(&config.chat.greeting)?;
            let (_, messages) = store.load_chat(&id)?.unwrap_or_default();
            (id, messages)
        }
    };

    print_banner(&chat_id);
    for message in &messages {
        print_message(message);
    }

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if matches!(trimmed, "exit" | "quit" | "/exit" | "/quit") {
                    break;
                }

                rl.add_history_entry(trimmed)?;

                let response = submit_exchange(
                    &router,
                    &store,
                    &chat_id,
                    &mut messages,
                    trimmed,
                    &config.settings,
                    config.chat.title_max_len,
                )
                .await?;

                if response.is_error() {
                    println!("{}\n", response.content().red());
                } else if let Some(assistant) = messages.last() {
                    print_message(assistant);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Submit one line of input and persist the completed exchange
///
/// Appends the user turn to the in-memory history and routes the full
/// conversation. On success the assistant turn is appended and the chat is
/// saved. On a generation error the user turn is rolled back and nothing is
/// persisted, so retrying the same message does not duplicate it.
async fn submit_exchange(
    router: &Router,
    store: &ChatStore,
    chat_id: &str,
    messages: &mut Vec<ChatMessage>,
    input: &str,
    settings: &Settings,
    title_max_len: usize,
) -> Result<RouterResponse> {
    messages.push(ChatMessage::user(input));
    let history: Vec<ChatTurn> = messages
        .iter()
        .map(|m| ChatTurn {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();

    let response = router.generate_response(&history, settings).await;

    if response.is_error() {
        // Roll back the user turn so a retry starts clean
        messages.pop();
        return Ok(response);
    }

    messages.push(ChatMessage::assistant(response.content()));

    let title = derive_title(messages, title_max_len);
    store.save_chat(chat_id, &title, messages)?;

    Ok(response)
}

fn print_banner(chat_id: &str) {
    let short_id = chat_id.get(..8).unwrap_or(chat_id);
    println!("{}", "CODEEX".bold().cyan());
    println!("Chat {} | /solve /summarize /search | /exit to quit\n", short_id.cyan());
}

fn print_message(message: &ChatMessage) {
    match message.role {
        crate::capabilities::Role::Assistant => {
            println!("{}\n", message.content);
        }
        crate::capabilities::Role::User => {
            println!("{} {}\n", ">".dimmed(), message.content.dimmed());
        }
    }
}
