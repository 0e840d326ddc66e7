use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when asking a model for text
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Completion client is not configured: {0}")]
    NotConfigured(String),
}

/// Text-generation capability
///
/// `Ok(None)` means the provider answered but produced no candidate text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError>;
}
