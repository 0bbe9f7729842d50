//! Core prompt template trait

use crate::{Language, PromptError, Result};

/// A named template with one variant per language
///
/// Variables are passed as `serde_json::Value` so the trait stays
/// dyn-compatible and can live in a [`crate::PromptRegistry`].
pub trait PromptTemplate: Send + Sync {
    /// Template identifier, e.g. `"energy.daily_user"`
    fn name(&self) -> &str;

    /// Languages with a variant
    fn languages(&self) -> Vec<Language>;

    fn supports_language(&self, lang: &Language) -> bool {
        self.languages().contains(lang)
    }

    /// Render the variant for `lang`
    fn render(&self, lang: &Language, vars: &serde_json::Value) -> Result<String>;

    /// Render `lang`, else Portuguese, else the first available variant
    fn render_with_fallback(&self, lang: &Language, vars: &serde_json::Value) -> Result<String> {
        if self.supports_language(lang) {
            return self.render(lang, vars);
        }

        if self.supports_language(&Language::Portuguese) {
            return self.render(&Language::Portuguese, vars);
        }

        let fallback = self
            .languages()
            .into_iter()
            .next()
            .ok_or_else(|| PromptError::NoLanguageAvailable(self.name().to_string()))?;

        self.render(&fallback, vars)
    }

    /// Raw source of a variant, for inspection
    fn raw_template(&self, lang: &Language) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct FixedTemplate {
        variants: HashMap<Language, String>,
    }

    impl FixedTemplate {
        fn with(pairs: &[(Language, &str)]) -> Self {
            Self {
                variants: pairs
                    .iter()
                    .map(|(l, s)| (l.clone(), (*s).to_string()))
                    .collect(),
            }
        }
    }

    impl PromptTemplate for FixedTemplate {
        fn name(&self) -> &str {
            "fixed"
        }

        fn languages(&self) -> Vec<Language> {
            self.variants.keys().cloned().collect()
        }

        fn render(&self, lang: &Language, _vars: &serde_json::Value) -> Result<String> {
            self.variants
                .get(lang)
                .cloned()
                .ok_or_else(|| PromptError::TemplateNotFound {
                    name: "fixed".to_string(),
                    language: lang.code().to_string(),
                })
        }

        fn raw_template(&self, lang: &Language) -> Option<&str> {
            self.variants.get(lang).map(String::as_str)
        }
    }

    #[test]
    fn test_fallback_prefers_portuguese() {
        let template = FixedTemplate::with(&[
            (Language::English, "Daily report"),
            (Language::Portuguese, "Relatório diário"),
        ]);
        let out = template
            .render_with_fallback(&Language::Other("es".to_string()), &json!({}))
            .unwrap();
        assert_eq!(out, "Relatório diário");
    }

    #[test]
    fn test_fallback_to_first_available() {
        let template = FixedTemplate::with(&[(Language::English, "Daily report")]);
        let out = template
            .render_with_fallback(&Language::Portuguese, &json!({}))
            .unwrap();
        assert_eq!(out, "Daily report");
    }

    #[test]
    fn test_fallback_without_variants() {
        let template = FixedTemplate::with(&[]);
        let result = template.render_with_fallback(&Language::Portuguese, &json!({}));
        assert!(matches!(result, Err(PromptError::NoLanguageAvailable(_))));
    }
}
