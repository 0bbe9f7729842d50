//! Error types for prompt operations

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur during prompt operations
#[derive(Error, Debug)]
pub enum PromptError {
    /// Template has no variant for the requested language
    #[error("Template '{name}' has no '{language}' variant")]
    TemplateNotFound { name: String, language: String },

    /// Template parsing failed
    #[error("Failed to parse template '{name}' for language '{language}': {detail}")]
    TemplateParseFailed {
        name: String,
        language: String,
        detail: String,
    },

    /// Template rendering failed
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// No variants provided when building
    #[error("No templates provided for '{0}'")]
    NoTemplatesProvided(String),

    /// Template has no variant at all
    #[error("No language available for template '{0}'")]
    NoLanguageAvailable(String),

    /// Template not registered in registry
    #[error("Template '{0}' not registered")]
    TemplateNotRegistered(String),
}
