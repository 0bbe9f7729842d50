//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// The provider answered but produced no text
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// No provider has an API key configured
    #[error("No LLM provider configured: set at least one of {0}")]
    NoProviderConfigured(String),

    /// Every provider in the chain failed
    #[error("All LLM providers failed: {0}")]
    AllProvidersFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LLMError::EmptyResponse("groq".to_string());
        assert_eq!(err.to_string(), "Empty response from groq");

        let err = LLMError::NoProviderConfigured("PIAPI_API_KEY, GROQ_API_KEY".to_string());
        assert!(err.to_string().contains("PIAPI_API_KEY"));
    }
}
