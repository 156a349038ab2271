//! Knowledge search tool.
//!
//! Queries the external knowledge backend and formats the hits into
//! model-visible context, prefixed with the machine-parseable marker
//! `[knowledge:{N} results]` the stream translator keys on.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use cf_domain::config::KnowledgeConfig;
use cf_domain::tool::{Tool, ToolDefinition};
use cf_knowledge::{KnowledgeBackend, KnowledgeHit, KnowledgeSearchRequest, SearchType};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Arguments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct KnowledgeArgs {
    query: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    collection: Option<String>,
    #[serde(default)]
    search_type: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Searches the knowledge base. Always offered when the model supports
/// tools; the backend may still be absent or down, which surfaces as an
/// `Error:` result, never an exception.
pub struct KnowledgeSearchTool {
    backend: Option<Arc<dyn KnowledgeBackend>>,
    config: KnowledgeConfig,
}

impl KnowledgeSearchTool {
    pub fn new(backend: Option<Arc<dyn KnowledgeBackend>>, config: KnowledgeConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait::async_trait]
impl Tool for KnowledgeSearchTool {
    fn name(&self) -> &'static str {
        "search_knowledge"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_knowledge".into(),
            description: "Search the knowledge base for domain-specific context before \
                          answering."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query (at least 2 characters)" },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional tag filter"
                    },
                    "collection": { "type": "string", "description": "Collection to search (defaults to the configured one)" },
                    "search_type": {
                        "type": "string",
                        "enum": ["semantic", "keyword", "hybrid"],
                        "description": "Search mode (defaults to semantic)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> String {
        let args: KnowledgeArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return format!("Error: Invalid arguments: {e}"),
        };

        if args.query.trim().chars().count() < 2 {
            return "Error: Search query is too short. Please provide a more specific query."
                .into();
        }

        let Some(backend) = self.backend.as_ref() else {
            return "Error: Knowledge base is not available.".into();
        };
        if !backend.is_available().await {
            return "Error: Knowledge base is not available.".into();
        }

        let req = KnowledgeSearchRequest {
            query: args.query.trim().to_owned(),
            tags: args.tags.unwrap_or_default(),
            collection: args
                .collection
                .or_else(|| Some(self.config.default_collection.clone())),
            search_type: SearchType::parse_or_default(args.search_type.as_deref().unwrap_or("")),
            limit: self.config.max_results,
        };

        match backend.search(req).await {
            Ok(hits) => format_results(&hits),
            Err(e) => {
                tracing::warn!(error = %e, "knowledge search failed");
                format!("Knowledge search failed: {e}")
            }
        }
    }
}

/// Format hits behind the `[knowledge:{N} results]` marker. The text
/// after the first blank line is what the translator surfaces to the
/// user as "Knowledge Base Results".
fn format_results(hits: &[KnowledgeHit]) -> String {
    if hits.is_empty() {
        return "[knowledge:0 results]\n\nNo matching entries found.".into();
    }

    let formatted = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            let mut block = match hit.title.as_deref() {
                Some(title) => format!("{}. **{}**\n{}", i + 1, title, hit.content.trim()),
                None => format!("{}. {}", i + 1, hit.content.trim()),
            };
            if let Some(source) = hit.source.as_deref() {
                block.push_str(&format!("\n(source: {source})"));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("[knowledge:{} results]\n\n{}", hits.len(), formatted)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::error::{Error, Result};

    struct StubBackend {
        available: bool,
        hits: Result<Vec<KnowledgeHit>>,
    }

    impl StubBackend {
        fn with_hits(hits: Vec<KnowledgeHit>) -> Arc<Self> {
            Arc::new(Self {
                available: true,
                hits: Ok(hits),
            })
        }
    }

    #[async_trait::async_trait]
    impl KnowledgeBackend for StubBackend {
        async fn is_available(&self) -> bool {
            self.available
        }
        async fn search(&self, _req: KnowledgeSearchRequest) -> Result<Vec<KnowledgeHit>> {
            match &self.hits {
                Ok(hits) => Ok(hits.clone()),
                Err(e) => Err(Error::Knowledge(e.to_string())),
            }
        }
    }

    fn hit(title: &str, content: &str) -> KnowledgeHit {
        KnowledgeHit {
            title: Some(title.to_owned()),
            content: content.to_owned(),
            score: 0.9,
            source: None,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn short_query_is_rejected_with_exact_message() {
        let tool = KnowledgeSearchTool::new(
            Some(StubBackend::with_hits(vec![])),
            KnowledgeConfig::default(),
        );
        let result = tool.execute(serde_json::json!({ "query": "x" })).await;
        assert_eq!(
            result,
            "Error: Search query is too short. Please provide a more specific query."
        );
    }

    #[tokio::test]
    async fn missing_backend_reports_unavailable() {
        let tool = KnowledgeSearchTool::new(None, KnowledgeConfig::default());
        let result = tool.execute(serde_json::json!({ "query": "eloquent" })).await;
        assert_eq!(result, "Error: Knowledge base is not available.");
    }

    #[tokio::test]
    async fn unavailable_backend_reports_unavailable() {
        let backend = Arc::new(StubBackend {
            available: false,
            hits: Ok(vec![]),
        });
        let tool = KnowledgeSearchTool::new(Some(backend), KnowledgeConfig::default());
        let result = tool.execute(serde_json::json!({ "query": "eloquent" })).await;
        assert_eq!(result, "Error: Knowledge base is not available.");
    }

    #[tokio::test]
    async fn results_carry_the_marker_prefix() {
        let backend = StubBackend::with_hits(vec![
            hit("Eloquent basics", "Models map tables to classes."),
            hit("Migrations", "Schema changes are versioned."),
        ]);
        let tool = KnowledgeSearchTool::new(Some(backend), KnowledgeConfig::default());
        let result = tool.execute(serde_json::json!({ "query": "eloquent" })).await;

        assert!(result.starts_with("[knowledge:2 results]\n\n"));
        assert!(result.contains("**Eloquent basics**"));
        assert!(result.contains("2. **Migrations**"));
    }

    #[tokio::test]
    async fn backend_failure_uses_failure_prefix_not_error_prefix() {
        let backend = Arc::new(StubBackend {
            available: true,
            hits: Err(Error::Knowledge("connection reset".into())),
        });
        let tool = KnowledgeSearchTool::new(Some(backend), KnowledgeConfig::default());
        let result = tool.execute(serde_json::json!({ "query": "eloquent" })).await;
        assert!(result.starts_with("Knowledge search failed:"));
    }

    #[tokio::test]
    async fn zero_hits_still_use_marker_format() {
        let tool = KnowledgeSearchTool::new(
            Some(StubBackend::with_hits(vec![])),
            KnowledgeConfig::default(),
        );
        let result = tool.execute(serde_json::json!({ "query": "nothing here" })).await;
        assert!(result.starts_with("[knowledge:0 results]"));
    }
}
