use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search DTOs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeSearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    pub search_type: SearchType,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Semantic,
    Keyword,
    Hybrid,
}

impl SearchType {
    /// Parse a tool-supplied search type, defaulting to semantic.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Self::Keyword,
            "hybrid" => Self::Hybrid,
            _ => Self::Semantic,
        }
    }
}

/// One scored search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeHit {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponseBody {
    #[serde(default)]
    pub results: Vec<KnowledgeHit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_type_parses_with_semantic_default() {
        assert_eq!(SearchType::parse_or_default("keyword"), SearchType::Keyword);
        assert_eq!(SearchType::parse_or_default("HYBRID"), SearchType::Hybrid);
        assert_eq!(SearchType::parse_or_default("whatever"), SearchType::Semantic);
    }

    #[test]
    fn hit_parses_with_sparse_fields() {
        let hit: KnowledgeHit =
            serde_json::from_str(r#"{"content":"Laravel uses Eloquent."}"#).unwrap();
        assert!(hit.title.is_none());
        assert_eq!(hit.score, 0.0);
        assert!(hit.tags.is_empty());
    }
}
