//! Error types for CODEEX
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for CODEEX operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, capability calls to the AI provider, chat
/// routing, and storage operations.
#[derive(Error, Debug)]
pub enum CodeexError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Capability-related errors (provider API calls, malformed responses)
    #[error("Capability error: {0}")]
    Capability(String),

    /// Missing credentials for the AI provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Conversation history violated a router precondition
    #[error("Invalid conversation history: {0}")]
    InvalidHistory(String),

    /// A file could not be turned into a model-ready payload
    #[error("Payload encoding error: {0}")]
    Payload(String),

    /// Chat storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for CODEEX operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
