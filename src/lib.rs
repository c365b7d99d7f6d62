//! CODEEX - terminal AI assistant library
//!
//! This library provides the core functionality for the CODEEX assistant,
//! including slash-command routing, capability backends, citation splicing,
//! chat persistence, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `router`: Slash-command classification, model resolution, and response shaping
//! - `capabilities`: AI capability abstraction and the Gemini implementation
//! - `storage`: SQLite-backed chat history
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use codeex::capabilities::{create_capabilities, ChatTurn};
//! use codeex::config::Config;
//! use codeex::router::Router;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let capabilities = create_capabilities(&config)?;
//!     let router = Router::new(capabilities, config.provider.gemini.clone());
//!
//!     let history = vec![ChatTurn::user("/solve 2x + 4 = 10")];
//!     let response = router.generate_response(&history, &config.settings).await;
//!     println!("{}", response.content());
//!     Ok(())
//! }
//! ```

pub mod capabilities;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod router;
pub mod storage;

// Re-export commonly used types
pub use capabilities::{CapabilitySet, ChatTurn, Role};
pub use config::{Config, Settings};
pub use error::{CodeexError, Result};
pub use router::{Router, RouterResponse, SlashCommand};
pub use storage::{ChatMessage, ChatStore};
