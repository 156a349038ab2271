//! Provider registry.
//!
//! Holds registered LLM provider instances and resolves model specs of the
//! form `"provider_id/model_name"` (the model part is optional). The
//! registry boots empty; providers are registered by the embedding
//! application after construction. An empty registry is not a startup
//! error: the gateway still serves, and the chat endpoint answers 503
//! until a provider appears.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use cf_domain::config::LlmConfig;

use crate::traits::LlmProvider;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProviderRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider resolved from a model spec: the adapter plus the model name
/// to request from it (when the spec named one).
#[derive(Clone)]
pub struct ResolvedModel {
    pub provider: Arc<dyn LlmProvider>,
    pub model: Option<String>,
}

/// Holds all registered LLM providers and role assignments.
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn LlmProvider>>>,
    roles: HashMap<String, String>,
    default_model: Option<String>,
}

impl ProviderRegistry {
    /// Build an empty registry carrying the role map and default model
    /// from config. Adapters are added with [`register`](Self::register).
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            roles: config.roles.clone(),
            default_model: config.default_model.clone(),
        }
    }

    /// Register (or replace) a provider under its id.
    pub fn register(&self, provider_id: impl Into<String>, provider: Arc<dyn LlmProvider>) {
        let provider_id = provider_id.into();
        tracing::info!(provider_id = %provider_id, "registered LLM provider");
        self.providers.write().insert(provider_id, provider);
    }

    /// Look up a provider by its id.
    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.read().get(provider_id).cloned()
    }

    /// True when no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Resolve a `"provider_id/model_name"` spec to a provider + model.
    ///
    /// When `spec` is `None`, falls back to the configured default model,
    /// then to any registered provider (with no model override).
    pub fn resolve(&self, spec: Option<&str>) -> Option<ResolvedModel> {
        let spec = spec.or(self.default_model.as_deref());

        if let Some(spec) = spec {
            let (provider_id, model) = match spec.split_once('/') {
                Some((id, model)) => (id, Some(model.to_owned())),
                None => (spec, None),
            };
            if let Some(provider) = self.get(provider_id) {
                return Some(ResolvedModel { provider, model });
            }
            tracing::warn!(spec = %spec, "model spec names an unregistered provider");
        }

        // Fallback: first available provider.
        let providers = self.providers.read();
        providers.values().next().cloned().map(|provider| ResolvedModel {
            provider,
            model: None,
        })
    }

    /// Resolve the provider assigned to a role (e.g. "chat", "title"),
    /// falling back through [`resolve`](Self::resolve)'s default chain.
    pub fn for_role(&self, role: &str) -> Option<ResolvedModel> {
        match self.roles.get(role) {
            Some(spec) => self.resolve(Some(spec)),
            None => self.resolve(None),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::capability::LlmCapabilities;
    use cf_domain::error::{Error, Result};
    use cf_domain::stream::{BoxStream, ProviderEvent};

    struct NullProvider {
        id: String,
        caps: LlmCapabilities,
    }

    #[async_trait::async_trait]
    impl LlmProvider for NullProvider {
        async fn chat(&self, _req: crate::ChatRequest) -> Result<crate::ChatResponse> {
            Err(Error::Other("not implemented".into()))
        }
        async fn chat_stream(
            &self,
            _req: crate::ChatRequest,
        ) -> Result<BoxStream<'static, Result<ProviderEvent>>> {
            Err(Error::Other("not implemented".into()))
        }
        fn capabilities(&self) -> &LlmCapabilities {
            &self.caps
        }
        fn provider_id(&self) -> &str {
            &self.id
        }
    }

    fn null(id: &str) -> Arc<dyn LlmProvider> {
        Arc::new(NullProvider {
            id: id.to_owned(),
            caps: LlmCapabilities::default(),
        })
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let reg = ProviderRegistry::from_config(&LlmConfig::default());
        assert!(reg.is_empty());
        assert!(reg.resolve(Some("openai/gpt-4o")).is_none());
        assert!(reg.for_role("chat").is_none());
    }

    #[test]
    fn resolves_provider_and_model_from_spec() {
        let reg = ProviderRegistry::from_config(&LlmConfig::default());
        reg.register("openai", null("openai"));

        let resolved = reg.resolve(Some("openai/gpt-4o")).unwrap();
        assert_eq!(resolved.provider.provider_id(), "openai");
        assert_eq!(resolved.model.as_deref(), Some("gpt-4o"));

        // A bare provider id is a valid spec with no model override.
        let resolved = reg.resolve(Some("openai")).unwrap();
        assert!(resolved.model.is_none());
    }

    #[test]
    fn role_lookup_falls_back_to_default_model() {
        let mut config = LlmConfig::default();
        config.default_model = Some("openai/gpt-4o-mini".into());
        config
            .roles
            .insert("title".into(), "anthropic/claude-haiku".into());

        let reg = ProviderRegistry::from_config(&config);
        reg.register("openai", null("openai"));
        reg.register("anthropic", null("anthropic"));

        let title = reg.for_role("title").unwrap();
        assert_eq!(title.provider.provider_id(), "anthropic");
        assert_eq!(title.model.as_deref(), Some("claude-haiku"));

        // No "chat" role configured: default model wins.
        let chat = reg.for_role("chat").unwrap();
        assert_eq!(chat.provider.provider_id(), "openai");
        assert_eq!(chat.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn unregistered_spec_falls_back_to_any_provider() {
        let reg = ProviderRegistry::from_config(&LlmConfig::default());
        reg.register("local", null("local"));

        let resolved = reg.resolve(Some("missing/model-x")).unwrap();
        assert_eq!(resolved.provider.provider_id(), "local");
        assert!(resolved.model.is_none());
    }
}
