// External text generation boundary
pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiClient, GeminiConfig};

/// Errors from a text generation backend
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key is configured
    #[error("AI credentials are not configured")]
    MissingCredentials,

    /// The request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The service answered with a non-success status
    #[error("AI service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered without any text
    #[error("AI service returned no content")]
    EmptyResponse,

    /// The answer could not be decoded
    #[error("Malformed AI response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for AiError {
    fn from(error: reqwest::Error) -> Self {
        AiError::Http(error.without_url())
    }
}

/// Shape the generated text should take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

impl ResponseFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain",
            ResponseFormat::Json => "application/json",
        }
    }
}

/// A single-shot text generation call
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, format: ResponseFormat) -> Result<String, AiError>;
}
