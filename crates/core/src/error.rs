//! Error types for the Jobs assistant.
//!
//! This module defines a unified error enum that covers all error categories
//! in the service: configuration, I/O, model calls, retrieval, prompt
//! rendering and serialization.

use thiserror::Error;

/// Unified error type for the Jobs assistant.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic: errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language model call failed or returned unusable output
    #[error("LLM error: {0}")]
    Llm(String),

    /// Corpus connection, embedding or vector query failed
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt loading and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Short machine-friendly name of the error category, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Llm(_) => "model",
            AppError::Retrieval(_) => "retrieval",
            AppError::Prompt(_) => "prompt",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
