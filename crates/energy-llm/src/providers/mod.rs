//! Concrete LLM provider implementations
//!
//! Every service used by the report jobs speaks the OpenAI chat-completions
//! dialect, so a single provider type covers them; [`ProviderKind`] holds the
//! per-service defaults.

pub mod openai;
pub mod presets;

pub use openai::{OpenAIConfig, OpenAIProvider};
pub use presets::ProviderKind;
