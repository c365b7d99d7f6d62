//! Command routing and response generation
//!
//! The router takes a chat history plus the user's settings, classifies the
//! latest message into a slash-command or plain conversation, resolves the
//! model to use, dispatches to the matching capability, and shapes the
//! result into an assistant message or an in-chat error message.

pub mod citations;
pub mod command;

pub use citations::{splice_citations, NO_ANSWER_FALLBACK};
pub use command::SlashCommand;

use crate::capabilities::{
    CapabilitySet, ChatTurn, CompletionRequest, QuizRequest, Role, SearchRequest,
    SummarizeRequest,
};
use crate::config::{GeminiConfig, ModelChoice, Settings};
use crate::error::{CodeexError, Result};
use std::sync::Arc;

/// Shown when `/summarize` is used with no argument
pub const SUMMARIZE_USAGE: &str =
    "Please provide the text you want to summarize after the /summarize command.";

/// Shown when `/search` is used with no argument
pub const SEARCH_USAGE: &str =
    "Please provide a search query after the /search command.";

/// Shown to the user when response generation fails
pub const GENERATION_FAILED: &str =
    "Sorry, I encountered an error. Please try again.";

/// The router's reply: a normal assistant message or an in-chat error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterResponse {
    /// Assistant content to append to the chat
    Assistant { content: String },
    /// An error surfaced as a chat message instead of a crash
    Error { message: String },
}

impl RouterResponse {
    /// The displayable text of this response
    pub fn content(&self) -> &str {
        match self {
            Self::Assistant { content } => content,
            Self::Error { message } => message,
        }
    }

    /// Whether this response reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Routes user messages to capabilities and shapes their results
///
/// # Examples
///
/// ```no_run
/// use codeex::capabilities::{create_capabilities, ChatTurn};
/// use codeex::config::Config;
/// use codeex::router::Router;
///
/// let config = Config::default();
/// let capabilities = create_capabilities(&config).unwrap();
/// let router = Router::new(capabilities, config.provider.gemini.clone());
///
/// let history = vec![ChatTurn::user("/search rust 1.80 release")];
/// let response = tokio_test::block_on(router.generate_response(&history, &config.settings));
/// println!("{}", response.content());
/// ```
pub struct Router {
    capabilities: Arc<dyn CapabilitySet>,
    models: GeminiConfig,
}

impl Router {
    /// Create a new router
    ///
    /// # Arguments
    ///
    /// * `capabilities` - The capability backend to dispatch to
    /// * `models` - Model names used to resolve the `auto` choice
    pub fn new(capabilities: Arc<dyn CapabilitySet>, models: GeminiConfig) -> Self {
        Self {
            capabilities,
            models,
        }
    }

    /// Resolve the settings' model choice for a classified message
    ///
    /// `auto` picks the capable model for slash-commands and the fast model
    /// for plain conversation. An explicit model id always wins.
    fn resolve_model(&self, choice: &ModelChoice, command: &SlashCommand) -> String {
        match choice {
            ModelChoice::Model(model) => model.clone(),
            ModelChoice::Auto => {
                if command.is_command() {
                    self.models.capable_model.clone()
                } else {
                    self.models.fast_model.clone()
                }
            }
        }
    }

    /// Generate a response to the latest message in the history
    ///
    /// The last history entry must be the user message being answered.
    /// Failures never propagate: they are logged and folded into a
    /// `RouterResponse::Error` so callers can show them in-chat.
    ///
    /// # Arguments
    ///
    /// * `history` - Full chat history, newest message last
    /// * `settings` - The user's response settings
    pub async fn generate_response(
        &self,
        history: &[ChatTurn],
        settings: &Settings,
    ) -> RouterResponse {
        match self.dispatch(history, settings).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Response generation failed: {}", e);
                let message = if is_credentials_error(&e) {
                    format!("{} ({})", GENERATION_FAILED, e)
                } else {
                    GENERATION_FAILED.to_string()
                };
                RouterResponse::Error { message }
            }
        }
    }

    async fn dispatch(
        &self,
        history: &[ChatTurn],
        settings: &Settings,
    ) -> Result<RouterResponse> {
        let latest = match history.last() {
            Some(turn) if turn.role == Role::User => &turn.content,
            _ => {
                return Err(CodeexError::InvalidHistory(
                    "The last message must be from the user.".to_string(),
                )
                .into());
            }
        };

        let command = SlashCommand::classify(latest);
        let model = self.resolve_model(&settings.model, &command);
        tracing::debug!("Routing message: command={:?}, model={}", command, model);

        let content = match command {
            SlashCommand::Solve(quiz) => {
                let solution = self
                    .capabilities
                    .solve_quiz(QuizRequest {
                        quiz,
                        model,
                        tone: settings.tone,
                        technical_level: settings.technical_level,
                    })
                    .await?;
                solution.solution
            }
            SlashCommand::Summarize(text) => {
                if text.is_empty() {
                    return Ok(RouterResponse::Assistant {
                        content: SUMMARIZE_USAGE.to_string(),
                    });
                }
                self.capabilities
                    .summarize(SummarizeRequest { text, model })
                    .await?
                    .summary
            }
            SlashCommand::Search(query) => {
                if query.is_empty() {
                    return Ok(RouterResponse::Assistant {
                        content: SEARCH_USAGE.to_string(),
                    });
                }
                let result = self
                    .capabilities
                    .web_search(SearchRequest { query })
                    .await?;
                splice_citations(&result.answer, result.metadata.as_ref())
            }
            SlashCommand::Conversation => {
                self.capabilities
                    .complete(CompletionRequest {
                        messages: history.to_vec(),
                        model,
                        tone: settings.tone,
                        technical_level: settings.technical_level,
                    })
                    .await?
                    .answer
            }
        };

        Ok(RouterResponse::Assistant { content })
    }
}

/// Whether an error chain contains a missing-credentials failure
///
/// Credential problems get their detail surfaced in-chat since the user can
/// fix them directly; other failures stay generic.
fn is_credentials_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref(), Some(CodeexError::MissingCredentials(_))))
}
