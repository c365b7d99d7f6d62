//! Gemini capability backend for CODEEX
//!
//! This module implements the CapabilitySet trait against the Gemini
//! `generateContent` API: plain completions with a settings-derived system
//! instruction, quiz solving, summarization, grounded web search with the
//! `google_search` tool, and multimodal image and PDF analysis.

use crate::capabilities::{
    CapabilitySet, CompletionAnswer, CompletionRequest, GroundingMetadata, ImageEquationAnswer,
    ImageEquationRequest, PdfAnswer, PdfRequest, QuizRequest, QuizSolution, Role, SearchAnswer,
    SearchRequest, SummarizeRequest, Summary,
};
use crate::config::{GeminiConfig, TechnicalLevel, Tone};
use crate::error::{CodeexError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API capability backend
///
/// Connects to the Gemini `generateContent` endpoint. The API key is taken
/// from configuration (usually the GEMINI_API_KEY environment variable) and
/// the base URL can be overridden for tests.
///
/// # Examples
///
/// ```no_run
/// use codeex::config::GeminiConfig;
/// use codeex::capabilities::{GeminiCapabilities, CapabilitySet, CompletionRequest, ChatTurn};
/// use codeex::config::{Tone, TechnicalLevel};
///
/// # async fn example() -> codeex::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some("key".to_string()),
///     ..Default::default()
/// };
/// let capabilities = GeminiCapabilities::new(config)?;
/// let request = CompletionRequest {
///     messages: vec![ChatTurn::user("Hello!")],
///     model: "gemini-1.5-flash".to_string(),
///     tone: Tone::Helpful,
///     technical_level: TechnicalLevel::Intermediate,
/// };
/// let answer = capabilities.complete(request).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiCapabilities {
    client: Client,
    config: GeminiConfig,
}

/// Request body for generateContent
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

/// One content entry: a role plus ordered parts
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// A single part: text or inline binary data
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline(mime_type: String, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(GeminiInlineData { mime_type, data }),
        }
    }
}

/// Base64-encoded binary payload with its MIME type
#[derive(Debug, Serialize, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Tool declaration; only google_search is used
#[derive(Debug, Serialize)]
struct GeminiTool {
    #[serde(rename = "googleSearch")]
    google_search: serde_json::Value,
}

/// Generation options
#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// Response body from generateContent
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

/// A single response candidate
#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(rename = "groundingMetadata", default)]
    grounding_metadata: Option<GroundingMetadata>,
}

/// Error payload returned by the API
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    #[serde(default)]
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GeminiCapabilities {
    /// Create a new Gemini capability backend
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration with API key and model names
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("codeex/0.1.0")
            .build()
            .map_err(|e| {
                CodeexError::Capability(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized Gemini backend: fast={}, capable={}",
            config.fast_model,
            config.capable_model
        );

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                CodeexError::MissingCredentials(
                    "Gemini API key is not configured. Set the GEMINI_API_KEY environment \
                     variable or provider.gemini.api_key in the config file."
                        .to_string(),
                )
                .into()
            })
    }

    fn endpoint(&self, model: &str) -> String {
        let base = self.config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        format!("{}/models/{}:generateContent", base, model)
    }

    /// Build the system instruction from the response settings
    fn system_instruction(tone: Tone, technical_level: TechnicalLevel) -> String {
        format!(
            "You are CODEEX, an expert AI assistant. Adopt a {} tone. \
             Tailor your answers to a user with a {} technical level.",
            tone, technical_level
        )
    }

    /// Convert chat turns to Gemini contents, mapping assistant to model
    fn convert_turns(request: &CompletionRequest) -> Result<Vec<GeminiContent>> {
        match request.messages.last() {
            Some(turn) if turn.role == Role::User => {}
            _ => {
                return Err(CodeexError::InvalidHistory(
                    "The last message must be from the user.".to_string(),
                )
                .into());
            }
        }

        Ok(request
            .messages
            .iter()
            .map(|turn| GeminiContent {
                role: Some(match turn.role {
                    Role::User => "user".to_string(),
                    Role::Assistant => "model".to_string(),
                }),
                parts: vec![GeminiPart::text(&turn.content)],
            })
            .collect())
    }

    /// Split a `data:<mime>;base64,<payload>` URI into its parts
    fn parse_data_uri(uri: &str) -> Result<(String, String)> {
        let rest = uri.strip_prefix("data:").ok_or_else(|| {
            CodeexError::Payload("Expected a data URI starting with 'data:'".to_string())
        })?;
        let (mime, payload) = rest.split_once(";base64,").ok_or_else(|| {
            CodeexError::Payload("Expected a base64-encoded data URI".to_string())
        })?;
        if mime.is_empty() {
            return Err(CodeexError::Payload("Data URI has no MIME type".to_string()).into());
        }
        Ok((mime.to_string(), payload.to_string()))
    }

    /// Send a request and return the first candidate
    async fn generate(&self, model: &str, request: &GeminiRequest) -> Result<GeminiCandidate> {
        let key = self.api_key()?;
        let url = self.endpoint(model);
        tracing::debug!("Calling Gemini: model={}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Gemini request failed: {}", e);
                CodeexError::Capability(format!("Failed to reach Gemini API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<GeminiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(body);
            tracing::error!("Gemini returned error {}: {}", status, detail);
            return Err(CodeexError::Capability(format!(
                "Gemini returned error {}: {}",
                status, detail
            ))
            .into());
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            CodeexError::Capability(format!("Failed to parse Gemini response: {}", e))
        })?;

        parsed.candidates.into_iter().next().ok_or_else(|| {
            CodeexError::Capability("Gemini returned no candidates".to_string()).into()
        })
    }

    /// Concatenate the text parts of a candidate
    fn candidate_text(candidate: &GeminiCandidate) -> String {
        candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl CapabilitySet for GeminiCapabilities {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionAnswer> {
        let contents = Self::convert_turns(&request)?;
        let body = GeminiRequest {
            contents,
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(Self::system_instruction(
                    request.tone,
                    request.technical_level,
                ))],
            }),
            tools: Vec::new(),
            generation_config: None,
        };

        let candidate = self.generate(&request.model, &body).await?;
        Ok(CompletionAnswer {
            answer: Self::candidate_text(&candidate),
        })
    }

    async fn solve_quiz(&self, request: QuizRequest) -> Result<QuizSolution> {
        let prompt = format!(
            "Solve the following problem and show your work as a clear, \
             step-by-step solution in Markdown.\n\nProblem:\n{}",
            request.quiz
        );
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(prompt)],
            }],
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(Self::system_instruction(
                    request.tone,
                    request.technical_level,
                ))],
            }),
            tools: Vec::new(),
            generation_config: None,
        };

        let candidate = self.generate(&request.model, &body).await?;
        Ok(QuizSolution {
            solution: Self::candidate_text(&candidate),
        })
    }

    async fn summarize(&self, request: SummarizeRequest) -> Result<Summary> {
        let prompt = format!(
            "Summarize the following text concisely, keeping the key points.\n\nText:\n{}",
            request.text
        );
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(prompt)],
            }],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: None,
        };

        let candidate = self.generate(&request.model, &body).await?;
        Ok(Summary {
            summary: Self::candidate_text(&candidate),
        })
    }

    async fn web_search(&self, request: SearchRequest) -> Result<SearchAnswer> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(&request.query)],
            }],
            system_instruction: None,
            tools: vec![GeminiTool {
                google_search: serde_json::json!({}),
            }],
            generation_config: None,
        };

        let candidate = self.generate(&self.config.search_model, &body).await?;
        let answer = Self::candidate_text(&candidate);
        Ok(SearchAnswer {
            answer,
            metadata: candidate.grounding_metadata,
        })
    }

    async fn solve_image_equation(
        &self,
        request: ImageEquationRequest,
    ) -> Result<ImageEquationAnswer> {
        let (mime, data) = Self::parse_data_uri(&request.photo_data_uri)?;
        let prompt = "Recognize the math equation in this image and solve it. \
                      Respond with a JSON object with exactly these fields: \
                      \"recognizedEquation\" (string), \"solutionSteps\" (string, Markdown), \
                      \"isSolvable\" (boolean).";

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::inline(mime, data), GeminiPart::text(prompt)],
            }],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: Some(GeminiGenerationConfig {
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        let candidate = self.generate(&self.config.capable_model, &body).await?;
        let text = Self::candidate_text(&candidate);
        serde_json::from_str(&text).map_err(|e| {
            CodeexError::Capability(format!("Gemini returned malformed equation result: {}", e))
                .into()
        })
    }

    async fn analyze_pdf(&self, request: PdfRequest) -> Result<PdfAnswer> {
        let (mime, data) = Self::parse_data_uri(&request.pdf_data_uri)?;
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart::inline(mime, data),
                    GeminiPart::text(format!(
                        "Answer the following question about the attached document.\n\n{}",
                        request.question
                    )),
                ],
            }],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: None,
        };

        let candidate = self.generate(&self.config.capable_model, &body).await?;
        Ok(PdfAnswer {
            answer: Self::candidate_text(&candidate),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::ChatTurn;

    fn test_config() -> GeminiConfig {
        GeminiConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_succeeds() {
        let capabilities = GeminiCapabilities::new(test_config());
        assert!(capabilities.is_ok());
    }

    #[test]
    fn test_name() {
        let capabilities = GeminiCapabilities::new(test_config()).unwrap();
        assert_eq!(capabilities.name(), "gemini");
    }

    #[test]
    fn test_endpoint_default_base() {
        let capabilities = GeminiCapabilities::new(test_config()).unwrap();
        assert_eq!(
            capabilities.endpoint("gemini-1.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_endpoint_custom_base() {
        let mut config = test_config();
        config.api_base = Some("http://localhost:9090".to_string());
        let capabilities = GeminiCapabilities::new(config).unwrap();
        assert_eq!(
            capabilities.endpoint("gemini-1.5-pro"),
            "http://localhost:9090/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = test_config();
        config.api_key = None;
        let capabilities = GeminiCapabilities::new(config).unwrap();
        let err = capabilities.api_key().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_empty_api_key_treated_as_missing() {
        let mut config = test_config();
        config.api_key = Some(String::new());
        let capabilities = GeminiCapabilities::new(config).unwrap();
        assert!(capabilities.api_key().is_err());
    }

    #[test]
    fn test_system_instruction_mentions_settings() {
        let instruction =
            GeminiCapabilities::system_instruction(Tone::Formal, TechnicalLevel::Expert);
        assert!(instruction.contains("formal"));
        assert!(instruction.contains("expert"));
    }

    #[test]
    fn test_convert_turns_maps_assistant_to_model() {
        let request = CompletionRequest {
            messages: vec![
                ChatTurn::assistant("How can I help you today?"),
                ChatTurn::user("Hi"),
            ],
            model: "gemini-1.5-flash".to_string(),
            tone: Tone::Helpful,
            technical_level: TechnicalLevel::Intermediate,
        };

        let contents = GeminiCapabilities::convert_turns(&request).unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role.as_deref(), Some("model"));
        assert_eq!(contents[1].role.as_deref(), Some("user"));
    }

    #[test]
    fn test_convert_turns_rejects_assistant_last() {
        let request = CompletionRequest {
            messages: vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello")],
            model: "gemini-1.5-flash".to_string(),
            tone: Tone::Helpful,
            technical_level: TechnicalLevel::Intermediate,
        };

        let err = GeminiCapabilities::convert_turns(&request).unwrap_err();
        assert!(err
            .to_string()
            .contains("The last message must be from the user"));
    }

    #[test]
    fn test_convert_turns_rejects_empty_history() {
        let request = CompletionRequest {
            messages: vec![],
            model: "gemini-1.5-flash".to_string(),
            tone: Tone::Helpful,
            technical_level: TechnicalLevel::Intermediate,
        };

        assert!(GeminiCapabilities::convert_turns(&request).is_err());
    }

    #[test]
    fn test_parse_data_uri() {
        let (mime, data) =
            GeminiCapabilities::parse_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, "aGVsbG8=");
    }

    #[test]
    fn test_parse_data_uri_rejects_plain_path() {
        assert!(GeminiCapabilities::parse_data_uri("/tmp/equation.png").is_err());
        assert!(GeminiCapabilities::parse_data_uri("data:image/png,raw").is_err());
        assert!(GeminiCapabilities::parse_data_uri("data:;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn test_request_serialization_skips_empty_tools() {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text("hi")],
            }],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_search_tool_serialization() {
        let tool = GeminiTool {
            google_search: serde_json::json!({}),
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json, serde_json::json!({"googleSearch": {}}));
    }
}
