//! One-shot question handler
//!
//! Sends a single message through the router and prints the response.
//! Nothing is persisted; this is the scripting-friendly surface.

use crate::capabilities::{create_capabilities, ChatTurn};
use crate::config::Config;
use crate::error::Result;
use crate::router::Router;

use colored::Colorize;

/// Send one message and print the response
///
/// Slash-commands work here the same way they do in an interactive
/// session, so `codeex ask "/search ..."` is a valid grounded query.
pub async fn run_ask(config: Config, message: String) -> Result<()> {
    let capabilities = create_capabilities(&config)?;
    let router = Router::new(capabilities, config.provider.gemini.clone());

    let history = vec![ChatTurn::user(message)];
    let response = router.generate_response(&history, &config.settings).await;

    if response.is_error() {
        eprintln!("{}", response.content().red());
        std::process::exit(1);
    }

    println!("{}", response.content());
    Ok(())
}
