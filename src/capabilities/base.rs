//! Base capability trait and common types
//!
//! This module defines the common interface that every AI capability
//! backend must implement, along with the request and response types the
//! router exchanges with it.

use crate::config::{TechnicalLevel, Tone};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single turn of conversation passed to a capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a conversational completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full conversation history, last turn must be from the user
    pub messages: Vec<ChatTurn>,
    /// Concrete provider model id
    pub model: String,
    /// Requested response tone
    pub tone: Tone,
    /// Requested technical depth
    pub technical_level: TechnicalLevel,
}

/// Answer to a conversational completion
#[derive(Debug, Clone)]
pub struct CompletionAnswer {
    pub answer: String,
}

/// Request to solve a quiz or problem statement
#[derive(Debug, Clone)]
pub struct QuizRequest {
    /// The problem text, as typed after the command
    pub quiz: String,
    pub model: String,
    pub tone: Tone,
    pub technical_level: TechnicalLevel,
}

/// Step-by-step solution to a quiz
#[derive(Debug, Clone)]
pub struct QuizSolution {
    pub solution: String,
}

/// Request to summarize a block of text
#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    pub text: String,
    pub model: String,
}

/// Summary of a block of text
#[derive(Debug, Clone)]
pub struct Summary {
    pub summary: String,
}

/// Request for a grounded web search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
}

/// Answer to a grounded web search, with optional grounding metadata
#[derive(Debug, Clone, Default)]
pub struct SearchAnswer {
    pub answer: String,
    pub metadata: Option<GroundingMetadata>,
}

/// Grounding metadata attached to a web-search answer
///
/// Mirrors the provider's grounding payload: a list of source chunks and a
/// list of supports tying answer segments to chunk indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundingMetadata {
    #[serde(default, rename = "groundingChunks")]
    pub grounding_chunks: Vec<GroundingChunk>,
    #[serde(default, rename = "groundingSupports")]
    pub grounding_supports: Vec<GroundingSupport>,
}

/// A single web source backing part of the answer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

/// Web source location and display title
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Ties an answer segment to the chunks that support it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundingSupport {
    #[serde(default)]
    pub segment: Segment,
    #[serde(default, rename = "groundingChunkIndices")]
    pub grounding_chunk_indices: Vec<usize>,
}

/// Byte range of the answer a support applies to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, rename = "endIndex")]
    pub end_index: usize,
}

/// Request to recognize and solve an equation from an image
#[derive(Debug, Clone)]
pub struct ImageEquationRequest {
    /// Image as a `data:<mime>;base64,<data>` URI
    pub photo_data_uri: String,
}

/// Result of solving an equation from an image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEquationAnswer {
    #[serde(rename = "recognizedEquation")]
    pub recognized_equation: String,
    #[serde(rename = "solutionSteps")]
    pub solution_steps: String,
    #[serde(rename = "isSolvable")]
    pub is_solvable: bool,
}

/// Request to answer a question about a PDF document
#[derive(Debug, Clone)]
pub struct PdfRequest {
    /// PDF as a `data:application/pdf;base64,<data>` URI
    pub pdf_data_uri: String,
    pub question: String,
}

/// Answer about a PDF document
#[derive(Debug, Clone)]
pub struct PdfAnswer {
    pub answer: String,
}

/// Common interface for AI capability backends
///
/// All backends must implement this trait to be usable by the router.
/// Each method maps to one generation capability; the router decides which
/// one a given user message needs.
#[async_trait]
pub trait CapabilitySet: Send + Sync {
    /// Generate a conversational response from the full chat history
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionAnswer>;

    /// Produce a step-by-step solution to a problem statement
    async fn solve_quiz(&self, request: QuizRequest) -> Result<QuizSolution>;

    /// Summarize a block of text
    async fn summarize(&self, request: SummarizeRequest) -> Result<Summary>;

    /// Answer a query using grounded web search
    async fn web_search(&self, request: SearchRequest) -> Result<SearchAnswer>;

    /// Recognize and solve a math equation from an image
    async fn solve_image_equation(
        &self,
        request: ImageEquationRequest,
    ) -> Result<ImageEquationAnswer>;

    /// Answer a question about a PDF document
    async fn analyze_pdf(&self, request: PdfRequest) -> Result<PdfAnswer>;

    /// Get the backend name for logging and error messages
    fn name(&self) -> &str;
}
