//! Report languages
//!
//! Reports are written in Brazilian Portuguese; English variants exist for
//! the prompts so the narrative can be produced in either language.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of a template variant
///
/// ```
/// use energy_prompt::Language;
///
/// assert_eq!(Language::from_code("pt-BR"), Language::Portuguese);
/// assert_eq!(Language::English.code(), "en");
/// assert_eq!(Language::from_code("es"), Language::Other("es".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// Brazilian Portuguese
    #[default]
    Portuguese,
    /// English
    English,
    /// Other languages (ISO 639-1 code)
    Other(String),
}

impl Language {
    /// ISO 639-1 language code
    pub fn code(&self) -> &str {
        match self {
            Language::Portuguese => "pt",
            Language::English => "en",
            Language::Other(code) => code,
        }
    }

    /// Name for display
    pub fn name(&self) -> &str {
        match self {
            Language::Portuguese => "Português",
            Language::English => "English",
            Language::Other(code) => code,
        }
    }

    /// Parse from an ISO code, a locale tag or a common name
    pub fn from_code(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pt" | "pt-br" | "pt_br" | "portuguese" | "português" | "portugues" => {
                Language::Portuguese
            }
            "en" | "en-us" | "english" | "inglês" => Language::English,
            other => Language::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Other(_))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Language::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("pt"), Language::Portuguese);
        assert_eq!(Language::from_code("PT_BR"), Language::Portuguese);
        assert_eq!(Language::from_code("Português"), Language::Portuguese);
        assert_eq!(Language::from_code("english"), Language::English);
        assert_eq!(Language::from_code(" ja "), Language::Other("ja".to_string()));
    }

    #[test]
    fn test_default_is_portuguese() {
        assert_eq!(Language::default(), Language::Portuguese);
        assert!(Language::default().is_known());
        assert!(!Language::Other("ja".to_string()).is_known());
    }

    #[test]
    fn test_display() {
        assert_eq!(Language::Portuguese.to_string(), "Português");
        let lang: Language = "en".into();
        assert_eq!(lang.to_string(), "English");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Language::Portuguese).unwrap();
        let parsed: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Language::Portuguese);
    }
}
