//! Known OpenAI-compatible services and their defaults

use super::OpenAIConfig;
use std::fmt;
use std::str::FromStr;

/// A chat-completion service the report jobs know how to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// PiAPI gateway
    PiApi,
    /// Groq
    Groq,
    /// OpenAI
    OpenAI,
    /// DeepSeek
    DeepSeek,
}

impl ProviderKind {
    /// Default priority used by the fallback chain
    pub const FALLBACK_ORDER: [ProviderKind; 4] = [
        ProviderKind::PiApi,
        ProviderKind::Groq,
        ProviderKind::OpenAI,
        ProviderKind::DeepSeek,
    ];

    /// Lowercase name shown in report footers
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::PiApi => "piapi",
            ProviderKind::Groq => "groq",
            ProviderKind::OpenAI => "openai",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Prefix of the provider's environment variables
    pub fn env_prefix(self) -> &'static str {
        match self {
            ProviderKind::PiApi => "PIAPI",
            ProviderKind::Groq => "GROQ",
            ProviderKind::OpenAI => "OPENAI",
            ProviderKind::DeepSeek => "DEEPSEEK",
        }
    }

    pub fn api_key_var(self) -> String {
        format!("{}_API_KEY", self.env_prefix())
    }

    pub fn default_api_base(self) -> &'static str {
        match self {
            ProviderKind::PiApi => "https://api.piapi.ai/v1",
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::OpenAI => "https://api.openai.com/v1",
            ProviderKind::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::PiApi | ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Groq => "llama-3.3-70b-versatile",
            ProviderKind::DeepSeek => "deepseek-chat",
        }
    }

    /// Build a config from a variable lookup
    ///
    /// Returns `None` when `{PREFIX}_API_KEY` is missing or blank.
    /// `{PREFIX}_MODEL` and `{PREFIX}_API_BASE` override the defaults.
    pub fn config_from_lookup<F>(self, lookup: F) -> Option<OpenAIConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(&self.api_key_var())?;
        let prefix = self.env_prefix();

        let api_base =
            non_empty(&format!("{prefix}_API_BASE")).unwrap_or_else(|| self.default_api_base().to_string());
        let model =
            non_empty(&format!("{prefix}_MODEL")).unwrap_or_else(|| self.default_model().to_string());

        Some(
            OpenAIConfig::new(api_key.trim())
                .with_name(self.name())
                .with_api_base(api_base)
                .with_model(model),
        )
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "piapi" => Ok(ProviderKind::PiApi),
            "groq" => Ok(ProviderKind::Groq),
            "openai" => Ok(ProviderKind::OpenAI),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            other => Err(format!(
                "unknown LLM provider '{other}' (expected piapi, groq, openai or deepseek)"
            )),
        }
    }
}
