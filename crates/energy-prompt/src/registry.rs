//! Prompt template registry

use crate::{Language, PromptError, PromptTemplate, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A thread-safe set of named templates with a default language
///
/// ```
/// use energy_prompt::{JinjaTemplate, Language, PromptRegistry};
/// use serde_json::json;
///
/// let registry = PromptRegistry::new();
/// registry.register(JinjaTemplate::bilingual(
///     "energy.greeting",
///     "Bom dia, {{ desk }}",
///     "Good morning, {{ desk }}",
/// ).unwrap());
///
/// let pt = registry.render("energy.greeting", &json!({ "desk": "energia" })).unwrap();
/// assert_eq!(pt, "Bom dia, energia");
/// ```
pub struct PromptRegistry {
    templates: RwLock<HashMap<String, Arc<dyn PromptTemplate>>>,
    default_language: RwLock<Language>,
}

impl PromptRegistry {
    /// Empty registry rendering in Portuguese by default
    pub fn new() -> Self {
        Self::with_language(Language::Portuguese)
    }

    pub fn with_language(lang: Language) -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
            default_language: RwLock::new(lang),
        }
    }

    pub fn set_default_language(&self, lang: Language) {
        if let Ok(mut default) = self.default_language.write() {
            *default = lang;
        }
    }

    pub fn default_language(&self) -> Language {
        self.default_language
            .read()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    /// Register a template, replacing any previous one with the same name
    pub fn register<T: PromptTemplate + 'static>(&self, template: T) {
        if let Ok(mut templates) = self.templates.write() {
            templates.insert(template.name().to_string(), Arc::new(template));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PromptTemplate>> {
        self.templates.read().ok()?.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates
            .read()
            .map(|t| t.contains_key(name))
            .unwrap_or(false)
    }

    /// Render with the default language
    pub fn render(&self, name: &str, vars: &serde_json::Value) -> Result<String> {
        self.render_with_lang(name, &self.default_language(), vars)
    }

    /// Render with an explicit language, falling back per [`PromptTemplate::render_with_fallback`]
    pub fn render_with_lang(
        &self,
        name: &str,
        lang: &Language,
        vars: &serde_json::Value,
    ) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| PromptError::TemplateNotRegistered(name.to_string()))?;

        template.render_with_fallback(lang, vars)
    }

    /// Registered names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .templates
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PromptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRegistry")
            .field("default_language", &self.default_language())
            .field("templates", &self.list())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JinjaTemplate;
    use serde_json::json;

    fn registry() -> PromptRegistry {
        let registry = PromptRegistry::new();
        registry.register(
            JinjaTemplate::bilingual("energy.title", "Relatório {{ n }}", "Report {{ n }}")
                .unwrap(),
        );
        registry
    }

    #[test]
    fn test_default_language_portuguese() {
        let registry = registry();
        assert_eq!(registry.default_language(), Language::Portuguese);
        assert_eq!(
            registry.render("energy.title", &json!({ "n": 7 })).unwrap(),
            "Relatório 7"
        );
    }

    #[test]
    fn test_render_with_lang() {
        let registry = registry();
        let out = registry
            .render_with_lang("energy.title", &Language::English, &json!({ "n": 7 }))
            .unwrap();
        assert_eq!(out, "Report 7");

        registry.set_default_language(Language::English);
        assert_eq!(registry.render("energy.title", &json!({ "n": 1 })).unwrap(), "Report 1");
    }

    #[test]
    fn test_not_registered() {
        let registry = registry();
        let result = registry.render("energy.missing", &json!({}));
        assert!(matches!(result, Err(PromptError::TemplateNotRegistered(_))));
    }

    #[test]
    fn test_replace_and_list() {
        let registry = registry();
        registry.register(JinjaTemplate::new("energy.title", "v2").unwrap());
        registry.register(JinjaTemplate::new("energy.a", "A").unwrap());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list(), vec!["energy.a", "energy.title"]);
        assert_eq!(registry.render("energy.title", &json!({})).unwrap(), "v2");
        assert!(registry.contains("energy.a"));
        assert!(!registry.is_empty());
    }
}
