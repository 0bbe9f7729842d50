//! Prompt and document templates for the energy report jobs
//!
//! - [`JinjaTemplate`]: MiniJinja templates with Portuguese and English variants
//! - [`PromptRegistry`]: thread-safe lookup of named templates
//! - [`DocumentBuilder`]: line-oriented Markdown assembly
//!
//! ```
//! use energy_prompt::{JinjaTemplate, Language, PromptRegistry};
//! use serde_json::json;
//!
//! let registry = PromptRegistry::with_language(Language::English);
//! registry.register(JinjaTemplate::bilingual(
//!     "energy.headline",
//!     "{{ name }} em {{ trend }}",
//!     "{{ name }} trending {{ trend }}",
//! ).unwrap());
//!
//! let text = registry.render("energy.headline", &json!({ "name": "WTI", "trend": "up" })).unwrap();
//! assert_eq!(text, "WTI trending up");
//! ```

mod builder;
mod error;
mod jinja;
mod language;
mod registry;
mod template;

pub use builder::DocumentBuilder;
pub use error::{PromptError, Result};
pub use jinja::{JinjaTemplate, JinjaTemplateBuilder};
pub use language::Language;
pub use registry::PromptRegistry;
pub use template::PromptTemplate;
