use std::sync::Arc;

use cf_domain::config::Config;
use cf_domain::error::Result;
use cf_knowledge::{KnowledgeBackend, RestKnowledgeClient};
use cf_providers::ProviderRegistry;
use cf_store::ChatStore;
use cf_tools::{CommandScaffoldRunner, ScaffoldRunner};

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Registered LLM providers. May be empty at boot; the chat endpoint
    /// answers 503 until one is registered.
    pub llm: Arc<ProviderRegistry>,
    pub store: Arc<ChatStore>,
    /// Knowledge backend; `None` when disabled in config.
    pub knowledge: Option<Arc<dyn KnowledgeBackend>>,
    pub scaffold: Arc<dyn ScaffoldRunner>,
}

impl AppState {
    /// Build the full service graph from config.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = Arc::new(ChatStore::new(&config.storage.state_path)?);
        let llm = Arc::new(ProviderRegistry::from_config(&config.llm));

        let knowledge: Option<Arc<dyn KnowledgeBackend>> = if config.knowledge.enabled {
            Some(Arc::new(RestKnowledgeClient::new(&config.knowledge)?))
        } else {
            None
        };

        let scaffold: Arc<dyn ScaffoldRunner> =
            Arc::new(CommandScaffoldRunner::new(config.scaffold.clone()));

        Ok(Self {
            config: Arc::new(config),
            llm,
            store,
            knowledge,
            scaffold,
        })
    }
}
