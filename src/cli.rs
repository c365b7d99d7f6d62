//! Command-line interface definitions
//!
//! This module defines the CLI structure using clap's derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CODEEX - terminal client for the CODEEX assistant
#[derive(Parser, Debug)]
#[command(name = "codeex")]
#[command(about = "Terminal chat client with slash-commands and grounded web search", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the chat history database
    #[arg(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Model to use (overrides settings, `auto` to restore routing)
        #[arg(short, long)]
        model: Option<String>,

        /// Resume a previous chat by ID or unique ID prefix
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Send a single message and print the response
    Ask {
        /// The message to send
        message: String,
    },

    /// Recognize and solve a math equation from an image
    SolveImage {
        /// Path to the image file
        image: PathBuf,
    },

    /// Answer a question about a PDF document
    AnalyzePdf {
        /// Path to the PDF file
        pdf: PathBuf,

        /// Question to ask about the document
        #[arg(short, long)]
        question: String,
    },

    /// Manage chat history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List saved chats
    List,

    /// Show the messages of a chat by ID or unique ID prefix
    Show {
        /// Chat ID or prefix
        id: String,
    },

    /// Delete all saved chats
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
