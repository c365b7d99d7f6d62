use crate::cli::HistoryCommand;
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, Table};
use std::io::Write;
use std::path::PathBuf;

/// Handle history commands
pub fn handle_history(command: HistoryCommand, storage_path: Option<PathBuf>) -> Result<()> {
    let store = super::open_store(storage_path.as_ref())?;

    match command {
        HistoryCommand::List => {
            let chats = store.list_chats()?;

            if chats.is_empty() {
                println!("{}", "No chat history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);

            for chat in chats {
                let id_short = chat.id.get(..8).unwrap_or(&chat.id).to_string();
                let title = if chat.title.chars().count() > 40 {
                    let truncated: String = chat.title.chars().take(37).collect();
                    format!("{}...", truncated)
                } else {
                    chat.title
                };
                let updated = chat.updated_at.format("%Y-%m-%d %H:%M").to_string();

                table.add_row(prettytable::row![
                    id_short.cyan(),
                    title,
                    chat.message_count,
                    updated
                ]);
            }

            println!("\nChat History:");
            table.printstd();
            println!();
            println!("Use {} to resume a chat.", "codeex chat --resume <ID>".cyan());
            println!();
        }
        HistoryCommand::Show { id } => match store.load_chat(&id)? {
            Some((title, messages)) => {
                println!("\n{}\n", title.bold());
                for message in messages {
                    let label = match message.role {
                        crate::capabilities::Role::User => "user".cyan(),
                        crate::capabilities::Role::Assistant => "assistant".green(),
                    };
                    let timestamp = message.created_at.format("%Y-%m-%d %H:%M");
                    println!("[{} {}]\n{}\n", label, timestamp, message.content);
                }
            }
            None => {
                println!("{}", format!("No chat found matching '{}'", id).yellow());
            }
        },
        HistoryCommand::Clear { yes } => {
            if !yes && !confirm_clear()? {
                println!("Aborted.");
                return Ok(());
            }
            let deleted = store.clear_all()?;
            println!("{}", format!("Deleted {} chat(s)", deleted).green());
        }
    }

    Ok(())
}

/// Prompt for confirmation before deleting all history
fn confirm_clear() -> Result<bool> {
    print!("Delete all saved chats? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
