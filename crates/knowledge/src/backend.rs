//! The `KnowledgeBackend` trait defines the interface for knowledge
//! search backends (REST, test doubles).

use async_trait::async_trait;
use cf_domain::error::Result;

use crate::types::{KnowledgeHit, KnowledgeSearchRequest};

/// Abstraction over the knowledge backend's search surface.
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    /// Cheap availability probe. A `false` here makes the search tool
    /// answer with an availability error instead of attempting a search.
    async fn is_available(&self) -> bool;

    /// Run a search and return scored hits, best first.
    async fn search(&self, req: KnowledgeSearchRequest) -> Result<Vec<KnowledgeHit>>;
}
