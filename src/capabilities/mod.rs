//! AI capability backends for CODEEX
//!
//! This module contains the capability trait and its implementations.
//! Backends expose the generation capabilities the router dispatches to:
//! completion, quiz solving, summarization, grounded web search, and
//! multimodal image and PDF analysis.

pub mod base;
pub mod gemini;

pub use base::{
    CapabilitySet, ChatTurn, CompletionAnswer, CompletionRequest, GroundingChunk,
    GroundingMetadata, GroundingSupport, ImageEquationAnswer, ImageEquationRequest, PdfAnswer,
    PdfRequest, QuizRequest, QuizSolution, Role, SearchAnswer, SearchRequest, Segment,
    SummarizeRequest, Summary, WebSource,
};
pub use gemini::GeminiCapabilities;

use crate::config::Config;
use crate::error::{CodeexError, Result};
use std::sync::Arc;

/// Create a capability backend from configuration
///
/// # Arguments
///
/// * `config` - Application configuration with provider settings
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
pub fn create_capabilities(config: &Config) -> Result<Arc<dyn CapabilitySet>> {
    match config.provider.provider_type.as_str() {
        "gemini" => {
            let capabilities = GeminiCapabilities::new(config.provider.gemini.clone())?;
            Ok(Arc::new(capabilities))
        }
        other => Err(CodeexError::Config(format!("Unknown provider type: {}", other)).into()),
    }
}
