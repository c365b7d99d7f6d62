//! Configuration management for CODEEX
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CodeexError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for CODEEX
///
/// This structure holds everything the client needs: which AI provider to
/// talk to, the user's response settings, and chat session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration (Gemini)
    pub provider: ProviderConfig,

    /// Response settings (model choice, tone, technical level, speech)
    #[serde(default)]
    pub settings: Settings,

    /// Chat session configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; prefer the GEMINI_API_KEY environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// When set, this base is used to build Gemini endpoints (e.g.
    /// `/models/<model>:generateContent`) which allows tests to point the
    /// capability layer at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Model used for plain conversation when settings.model is `auto`
    #[serde(default = "default_fast_model")]
    pub fast_model: String,

    /// Model used for slash-commands when settings.model is `auto`
    #[serde(default = "default_capable_model")]
    pub capable_model: String,

    /// Model used by the web-search capability (fixed, never overridden)
    #[serde(default = "default_search_model")]
    pub search_model: String,
}

fn default_fast_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_capable_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_search_model() -> String {
    "gemini-1.5-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            fast_model: default_fast_model(),
            capable_model: default_capable_model(),
            search_model: default_search_model(),
        }
    }
}

/// The user's model choice: the `auto` sentinel or a concrete model id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelChoice {
    /// Let the router pick per request kind (capable for commands, fast for chat)
    Auto,
    /// Always use this provider model id
    Model(String),
}

impl From<String> for ModelChoice {
    fn from(s: String) -> Self {
        if s == "auto" {
            Self::Auto
        } else {
            Self::Model(s)
        }
    }
}

impl From<ModelChoice> for String {
    fn from(choice: ModelChoice) -> Self {
        match choice {
            ModelChoice::Auto => "auto".to_string(),
            ModelChoice::Model(m) => m,
        }
    }
}

/// Response tone requested from the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Helpful,
    Formal,
    Casual,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Helpful => write!(f, "helpful"),
            Self::Formal => write!(f, "formal"),
            Self::Casual => write!(f, "casual"),
        }
    }
}

/// Technical depth of the assistant's answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TechnicalLevel {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

impl std::fmt::Display for TechnicalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

/// Text-to-speech voice name
///
/// Carried in settings for parity with the hosted client; playback itself
/// is not part of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Voice {
    #[default]
    Algenib,
    Enceladus,
    Achernar,
    Heka,
}

/// User-facing response settings
///
/// A pure configuration value: no identity, replaced wholesale on change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Model selection: `auto` or a concrete provider model id
    #[serde(default = "default_model_choice")]
    pub model: ModelChoice,

    /// Response tone
    #[serde(default)]
    pub tone: Tone,

    /// Technical level of answers
    #[serde(default)]
    pub technical_level: TechnicalLevel,

    /// Whether responses should be spoken aloud (carried, not implemented here)
    #[serde(default)]
    pub enable_speech: bool,

    /// Voice used for speech
    #[serde(default)]
    pub voice: Voice,
}

fn default_model_choice() -> ModelChoice {
    ModelChoice::Auto
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model_choice(),
            tone: Tone::default(),
            technical_level: TechnicalLevel::default(),
            enable_speech: false,
            voice: Voice::default(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Assistant greeting seeded into every new chat
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Maximum length of the derived chat title
    #[serde(default = "default_title_max_len")]
    pub title_max_len: usize,
}

fn default_greeting() -> String {
    "How can I help you today?".to_string()
}

fn default_title_max_len() -> usize {
    40
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            title_max_len: default_title_max_len(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "gemini".to_string(),
                gemini: GeminiConfig::default(),
            },
            settings: Settings::default(),
            chat: ChatConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CodeexError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CodeexError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("CODEEX_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            self.provider.gemini.api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("CODEEX_MODEL") {
            self.settings.model = ModelChoice::from(model);
        }

        if let Ok(tone) = std::env::var("CODEEX_TONE") {
            match tone.to_lowercase().as_str() {
                "helpful" => self.settings.tone = Tone::Helpful,
                "formal" => self.settings.tone = Tone::Formal,
                "casual" => self.settings.tone = Tone::Casual,
                other => tracing::warn!("Invalid CODEEX_TONE: {}", other),
            }
        }

        if let Ok(level) = std::env::var("CODEEX_TECHNICAL_LEVEL") {
            match level.to_lowercase().as_str() {
                "beginner" => self.settings.technical_level = TechnicalLevel::Beginner,
                "intermediate" => self.settings.technical_level = TechnicalLevel::Intermediate,
                "expert" => self.settings.technical_level = TechnicalLevel::Expert,
                other => tracing::warn!("Invalid CODEEX_TECHNICAL_LEVEL: {}", other),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(CodeexError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(CodeexError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.gemini.fast_model.is_empty() {
            return Err(
                CodeexError::Config("gemini.fast_model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.gemini.capable_model.is_empty() {
            return Err(
                CodeexError::Config("gemini.capable_model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.gemini.search_model.is_empty() {
            return Err(
                CodeexError::Config("gemini.search_model cannot be empty".to_string()).into(),
            );
        }

        if self.chat.title_max_len == 0 {
            return Err(
                CodeexError::Config("chat.title_max_len must be greater than 0".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
