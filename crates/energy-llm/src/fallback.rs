//! Ordered provider fallback
//!
//! Providers are tried one after another until one returns non-empty text.
//! A failed or empty answer moves on to the next provider; the caller only
//! sees an error once every configured provider has been exhausted.

use crate::providers::{OpenAIProvider, ProviderKind};
use crate::{CompletionRequest, LLMError, LLMProvider, Message, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Sampling settings for one generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl GenerationOptions {
    pub fn new(temperature: f32, max_tokens: usize) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::new(0.4, 1000)
    }
}

/// A provider that was tried and did not produce usable text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// Text produced by the first provider that answered
#[derive(Debug, Clone)]
pub struct Generation {
    /// Trimmed answer
    pub text: String,
    /// Name of the provider that answered
    pub provider: String,
    /// Model reported by that provider
    pub model: String,
    /// Wall time spent across every attempt
    pub elapsed: Duration,
    /// Providers tried before the successful one
    pub failures: Vec<ProviderFailure>,
}

/// Providers in the order they will be tried
pub struct FallbackChain {
    providers: Vec<Arc<dyn LLMProvider>>,
}

impl FallbackChain {
    /// Chain over an explicit provider list, tried in the given order
    pub fn new(providers: Vec<Arc<dyn LLMProvider>>) -> Self {
        Self { providers }
    }

    /// Chain over every provider with an API key in the process environment
    ///
    /// `hint` is moved to the front of the default order when given.
    pub fn from_env(hint: Option<ProviderKind>) -> Result<Self> {
        Self::from_lookup(hint, |key| std::env::var(key).ok())
    }

    /// Same as [`FallbackChain::from_env`] with an injectable variable lookup
    pub fn from_lookup<F>(hint: Option<ProviderKind>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut providers: Vec<Arc<dyn LLMProvider>> = Vec::new();

        for kind in ordered_kinds(hint) {
            let Some(config) = kind.config_from_lookup(&lookup) else {
                continue;
            };
            providers.push(Arc::new(OpenAIProvider::with_config(config)?));
        }

        if providers.is_empty() {
            let keys: Vec<String> = ProviderKind::FALLBACK_ORDER
                .iter()
                .map(|k| k.api_key_var())
                .collect();
            return Err(LLMError::NoProviderConfigured(keys.join(", ")));
        }

        Ok(Self { providers })
    }

    /// Move the named provider to the front, if present
    pub fn with_preferred(mut self, name: &str) -> Self {
        if let Some(pos) = self.providers.iter().position(|p| p.name() == name) {
            let preferred = self.providers.remove(pos);
            self.providers.insert(0, preferred);
        }
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Ask each provider in turn until one returns non-empty text
    #[instrument(skip_all, fields(providers = self.providers.len()))]
    pub async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<Generation> {
        let started = Instant::now();
        let mut failures = Vec::new();

        for provider in &self.providers {
            let request = CompletionRequest::builder(provider.default_model())
                .system(system)
                .add_message(Message::user(user))
                .max_tokens(options.max_tokens)
                .temperature(options.temperature)
                .build();

            let error = match provider.complete(request).await {
                Ok(response) if !response.message.is_blank() => {
                    info!(
                        provider = provider.name(),
                        model = %response.model,
                        tokens = response.usage.total(),
                        "LLM answered"
                    );
                    return Ok(Generation {
                        text: response.message.text().trim().to_string(),
                        provider: provider.name().to_string(),
                        model: response.model,
                        elapsed: started.elapsed(),
                        failures,
                    });
                }
                Ok(_) => LLMError::EmptyResponse(provider.name().to_string()),
                Err(e) => e,
            };

            warn!(provider = provider.name(), error = %error, "LLM provider failed, trying next");
            failures.push(ProviderFailure {
                provider: provider.name().to_string(),
                error: error.to_string(),
            });
        }

        let summary = if failures.is_empty() {
            "no providers in chain".to_string()
        } else {
            failures
                .iter()
                .map(|f| format!("{}: {}", f.provider, f.error))
                .collect::<Vec<_>>()
                .join("; ")
        };
        Err(LLMError::AllProvidersFailed(summary))
    }
}

fn ordered_kinds(hint: Option<ProviderKind>) -> Vec<ProviderKind> {
    let mut kinds = ProviderKind::FALLBACK_ORDER.to_vec();
    if let Some(hint) = hint {
        kinds.retain(|k| *k != hint);
        kinds.insert(0, hint);
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompletionResponse, StopReason, TokenUsage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Provider that always gives the same answer, `None` meaning an error
    struct ScriptedProvider {
        name: String,
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn arc(name: &str, reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(text) => Ok(CompletionResponse {
                    message: Message::assistant(text.clone()),
                    model: request.model,
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                }),
                None => Err(LLMError::RequestFailed(format!("{} is down", self.name))),
            }
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn default_model(&self) -> &str {
            "scripted-model"
        }
    }

    fn lookup(vars: &[(&str, String)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = ScriptedProvider::arc("piapi", Some("  relatório  "));
        let second = ScriptedProvider::arc("groq", Some("outro"));
        let chain = FallbackChain::new(vec![first.clone(), second.clone()]);

        let generation = chain
            .generate("sys", "user", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(generation.text, "relatório");
        assert_eq!(generation.provider, "piapi");
        assert_eq!(generation.model, "scripted-model");
        assert!(generation.failures.is_empty());
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_and_empty_fall_through() {
        let chain = FallbackChain::new(vec![
            ScriptedProvider::arc("piapi", None),
            ScriptedProvider::arc("groq", Some("   ")),
            ScriptedProvider::arc("openai", Some("texto final")),
        ]);

        let generation = chain
            .generate("sys", "user", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(generation.provider, "openai");
        assert_eq!(generation.failures.len(), 2);
        assert_eq!(generation.failures[0].provider, "piapi");
        assert_eq!(generation.failures[1].error, "Empty response from groq");
    }

    #[tokio::test]
    async fn test_all_failed() {
        let chain = FallbackChain::new(vec![
            ScriptedProvider::arc("piapi", None),
            ScriptedProvider::arc("deepseek", Some("")),
        ]);

        let err = chain
            .generate("sys", "user", &GenerationOptions::default())
            .await
            .unwrap_err();

        match err {
            LLMError::AllProvidersFailed(msg) => {
                assert!(msg.contains("piapi: API request failed"));
                assert!(msg.contains("deepseek: Empty response"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hint_moves_to_front() {
        let kinds = ordered_kinds(Some(ProviderKind::OpenAI));
        assert_eq!(
            kinds,
            vec![
                ProviderKind::OpenAI,
                ProviderKind::PiApi,
                ProviderKind::Groq,
                ProviderKind::DeepSeek
            ]
        );
        assert_eq!(ordered_kinds(None), ProviderKind::FALLBACK_ORDER.to_vec());
    }

    #[test]
    fn test_from_lookup_skips_unconfigured() {
        let vars = lookup(&[
            ("DEEPSEEK_API_KEY", "d".to_string()),
            ("GROQ_API_KEY", "g".to_string()),
        ]);
        let chain = FallbackChain::from_lookup(None, vars).unwrap();
        assert_eq!(chain.provider_names(), vec!["groq", "deepseek"]);

        let vars = lookup(&[
            ("DEEPSEEK_API_KEY", "d".to_string()),
            ("GROQ_API_KEY", "g".to_string()),
        ]);
        let chain = FallbackChain::from_lookup(Some(ProviderKind::DeepSeek), vars).unwrap();
        assert_eq!(chain.provider_names(), vec!["deepseek", "groq"]);
    }

    #[test]
    fn test_no_keys_configured() {
        let result = FallbackChain::from_lookup(None, lookup(&[]));
        assert!(matches!(result, Err(LLMError::NoProviderConfigured(keys)) if keys.contains("GROQ_API_KEY")));
    }

    #[test]
    fn test_with_preferred() {
        let chain = FallbackChain::new(vec![
            ScriptedProvider::arc("piapi", None),
            ScriptedProvider::arc("groq", None),
        ])
        .with_preferred("groq")
        .with_preferred("missing");
        assert_eq!(chain.provider_names(), vec!["groq", "piapi"]);
        assert_eq!(chain.len(), 2);
    }

    #[tokio::test]
    async fn test_http_fallback_to_second_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/piapi/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/groq/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama-3.3-70b-versatile",
                "choices": [{"message": {"content": "1) Preço spot"}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vars = lookup(&[
            ("PIAPI_API_KEY", "p".to_string()),
            ("PIAPI_API_BASE", format!("{}/piapi", server.uri())),
            ("GROQ_API_KEY", "g".to_string()),
            ("GROQ_API_BASE", format!("{}/groq", server.uri())),
        ]);
        let chain = FallbackChain::from_lookup(None, vars).unwrap();

        let generation = chain
            .generate("sys", "user", &GenerationOptions::new(0.35, 1600))
            .await
            .unwrap();

        assert_eq!(generation.provider, "groq");
        assert_eq!(generation.text, "1) Preço spot");
        assert_eq!(generation.failures.len(), 1);
        assert!(generation.failures[0].error.contains("500"));
    }
}
