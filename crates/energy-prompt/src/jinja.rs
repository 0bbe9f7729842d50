//! MiniJinja-backed templates
//!
//! Besides the usual string filters, templates get `signed(decimals)`, which
//! prints a number with an explicit sign (`+1.25`, `-0.40`).

use crate::{Language, PromptError, PromptTemplate, Result};
use minijinja::Environment;
use std::collections::HashMap;

/// A prompt template backed by MiniJinja
///
/// ```
/// use energy_prompt::{JinjaTemplate, Language, PromptTemplate};
/// use serde_json::json;
///
/// let template = JinjaTemplate::bilingual(
///     "delta",
///     "Variação: {{ pct | signed(2) }}%",
///     "Change: {{ pct | signed(2) }}%",
/// ).unwrap();
///
/// let pt = template.render(&Language::Portuguese, &json!({ "pct": 1.5 })).unwrap();
/// assert_eq!(pt, "Variação: +1.50%");
/// ```
pub struct JinjaTemplate {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplate {
    pub fn builder(name: impl Into<String>) -> JinjaTemplateBuilder {
        JinjaTemplateBuilder::new(name)
    }

    /// Single Portuguese variant
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        Self::builder(name).portuguese(template).build()
    }

    /// Portuguese and English variants
    pub fn bilingual(
        name: impl Into<String>,
        portuguese: impl Into<String>,
        english: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(name)
            .portuguese(portuguese)
            .english(english)
            .build()
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);

    env.add_filter("upper", |s: String| s.to_uppercase());
    env.add_filter("lower", |s: String| s.to_lowercase());
    env.add_filter("trim", |s: String| s.trim().to_string());
    env.add_filter("capitalize", |s: String| {
        let mut chars = s.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => first.to_uppercase().chain(chars).collect(),
        }
    });
    env.add_filter("signed", |v: f64, decimals: Option<usize>| {
        format!("{:+.*}", decimals.unwrap_or(2), v)
    });

    env
}

impl PromptTemplate for JinjaTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn languages(&self) -> Vec<Language> {
        self.templates.keys().cloned().collect()
    }

    fn render(&self, lang: &Language, vars: &serde_json::Value) -> Result<String> {
        let source = self
            .templates
            .get(lang)
            .ok_or_else(|| PromptError::TemplateNotFound {
                name: self.name.clone(),
                language: lang.code().to_string(),
            })?;

        let value = minijinja::Value::from_serialize(vars);

        environment()
            .render_str(source, value)
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    fn raw_template(&self, lang: &Language) -> Option<&str> {
        self.templates.get(lang).map(String::as_str)
    }
}

impl std::fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("name", &self.name)
            .field("languages", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`JinjaTemplate`]
pub struct JinjaTemplateBuilder {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: HashMap::new(),
        }
    }

    /// Add a variant for a specific language
    pub fn template(mut self, lang: Language, content: impl Into<String>) -> Self {
        self.templates.insert(lang, content.into());
        self
    }

    pub fn portuguese(self, content: impl Into<String>) -> Self {
        self.template(Language::Portuguese, content)
    }

    pub fn english(self, content: impl Into<String>) -> Self {
        self.template(Language::English, content)
    }

    /// Build the template, compiling every variant once
    pub fn build(self) -> Result<JinjaTemplate> {
        if self.templates.is_empty() {
            return Err(PromptError::NoTemplatesProvided(self.name));
        }

        let env = environment();
        for (lang, content) in &self.templates {
            env.template_from_str(content)
                .map_err(|e| PromptError::TemplateParseFailed {
                    name: self.name.clone(),
                    language: lang.code().to_string(),
                    detail: e.to_string(),
                })?;
        }

        Ok(JinjaTemplate {
            name: self.name,
            templates: self.templates,
        })
    }
}
