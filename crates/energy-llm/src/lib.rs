//! Chat-completion layer for the energy report jobs
//!
//! This crate provides provider-agnostic abstractions for asking an LLM to
//! narrate a report. It includes:
//!
//! - Message and completion request/response types
//! - The [`LLMProvider`] trait
//! - An OpenAI-compatible provider with presets for PiAPI, Groq, OpenAI and DeepSeek
//! - [`FallbackChain`], which tries configured providers in priority order and
//!   returns the first usable answer together with the provider that served it

pub mod completion;
pub mod error;
pub mod fallback;
pub mod messages;
pub mod provider;
pub mod providers;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use fallback::{FallbackChain, Generation, GenerationOptions, ProviderFailure};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
pub use providers::{OpenAIConfig, OpenAIProvider, ProviderKind};
