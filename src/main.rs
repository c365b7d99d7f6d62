//! CODEEX - terminal AI assistant
//!
#![doc = "CODEEX - terminal AI assistant"]
#![doc = "Main entry point for the CODEEX client."]

use anyhow::Result;
use clap::Parser;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use codeex::cli::{Cli, Commands};
use codeex::commands;
use codeex::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { model, resume } => {
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            if let Some(r) = &resume {
                tracing::debug!("Resuming chat: {}", r);
            }
            commands::chat::run_chat(config, model, resume, cli.storage_path).await?;
            Ok(())
        }
        Commands::Ask { message } => {
            commands::ask::run_ask(config, message).await?;
            Ok(())
        }
        Commands::SolveImage { image } => {
            tracing::info!("Solving equation from image: {}", image.display());
            commands::visual::run_solve_image(config, &image).await?;
            Ok(())
        }
        Commands::AnalyzePdf { pdf, question } => {
            tracing::info!("Analyzing PDF: {}", pdf.display());
            commands::visual::run_analyze_pdf(config, &pdf, question).await?;
            Ok(())
        }
        Commands::History { command } => {
            commands::history::handle_history(command, cli.storage_path)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("codeex=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
