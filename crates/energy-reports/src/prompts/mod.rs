//! Daily report prompt templates
//!
//! Two templates drive every narrated report:
//! - `energy.daily.system`: the analyst persona
//! - `energy.daily.user`: the numbered topic list plus the factual context
//!
//! Both have Portuguese and English variants; reports default to Portuguese.

use crate::commodity::CommodityProfile;
use energy_prompt::{JinjaTemplate, Language, PromptRegistry, Result};
use serde_json::json;

pub const DAILY_SYSTEM: &str = "energy.daily.system";
pub const DAILY_USER: &str = "energy.daily.user";

/// Analyst persona; the Portuguese variant is the commodity's own prompt
pub fn daily_system() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        DAILY_SYSTEM,
        "{{ system_prompt }}",
        "You are a senior energy analyst covering {{ report_name }}. Write in English, \
         clear and objective, with an executive reading of price, supply, demand and risks.",
    )
}

/// Topic list and factual context
pub fn daily_user() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        DAILY_USER,
        "Gere um **Relatório Diário — {{ report_name }}** estruturado nos **{{ topics | length }} tópicos abaixo**.\n\
         Seja específico e conciso. Numere exatamente de 1 a {{ topics | length }}.\n\
         \n\
         {% for topic in topics %}{{ loop.index }}) {{ topic }}\n{% endfor %}\n\
         Baseie-se no contexto factual levantado:\n\
         {{ context }}",
        "Write a **Daily Report — {{ report_name }}** structured in the **{{ topics | length }} topics below**.\n\
         Be specific and concise. Number them exactly from 1 to {{ topics | length }}.\n\
         \n\
         {% for topic in topics %}{{ loop.index }}) {{ topic }}\n{% endfor %}\n\
         Base it on the factual context gathered (Portuguese):\n\
         {{ context }}",
    )
}

/// Register all daily report prompts with the given registry
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    registry.register(daily_system()?);
    registry.register(daily_user()?);
    Ok(())
}

/// Registry holding the daily prompts, defaulting to `language`
pub fn registry(language: Language) -> Result<PromptRegistry> {
    let registry = PromptRegistry::with_language(language);
    register_prompts(&registry)?;
    Ok(registry)
}

/// System and user prompts for one commodity
pub fn render_daily(
    registry: &PromptRegistry,
    profile: &CommodityProfile,
    context: &str,
) -> Result<(String, String)> {
    let vars = json!({
        "system_prompt": profile.system_prompt,
        "report_name": profile.report_name,
        "topics": profile.topics,
        "context": context,
    });

    let system = registry.render(DAILY_SYSTEM, &vars)?;
    let user = registry.render(DAILY_USER, &vars)?;
    Ok((system, user.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commodity::Commodity;

    #[test]
    fn test_register_all_prompts() {
        let registry = PromptRegistry::with_language(Language::Portuguese);
        register_prompts(&registry).unwrap();
        assert!(registry.contains(DAILY_SYSTEM));
        assert!(registry.contains(DAILY_USER));
    }

    #[test]
    fn test_render_portuguese_user_prompt() {
        let registry = registry(Language::Portuguese).unwrap();
        let profile = Commodity::JetFuel.profile();
        let (system, user) = render_daily(&registry, profile, "- contexto").unwrap();

        assert_eq!(system, profile.system_prompt);
        assert!(user.starts_with(
            "Gere um **Relatório Diário — Jet Fuel (Kerosene de Aviação)** estruturado nos **10 tópicos abaixo**.\n\
             Seja específico e conciso. Numere exatamente de 1 a 10.\n\n\
             1) Preço spot de Jet Fuel (região benchmark)\n"
        ));
        assert!(user.contains(
            "10) Conclusão (1 parágrafo: curto e médio prazo para Jet Fuel)\n\n\
             Baseie-se no contexto factual levantado:\n- contexto"
        ));
    }

    #[test]
    fn test_render_english_variant() {
        let registry = registry(Language::English).unwrap();
        let (system, user) = render_daily(&registry, Commodity::Uranium.profile(), "ctx").unwrap();
        assert!(system.contains("Uranium (U3O8)"));
        assert!(user.starts_with("Write a **Daily Report — Uranium (U3O8)**"));
    }
}
