use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Knowledge backend connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// When false, the knowledge search tool reports the backend as
    /// unavailable without making network calls.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "d_kb_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    /// Collection searched when the model does not name one.
    #[serde(default = "d_collection")]
    pub default_collection: String,
    /// Maximum results requested per search.
    #[serde(default = "d_5")]
    pub max_results: u32,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: d_kb_url(),
            api_key: None,
            timeout_ms: 8000,
            default_collection: d_collection(),
            max_results: 5,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_kb_url() -> String {
    "http://localhost:6333".into()
}
fn d_8000() -> u64 {
    8000
}
fn d_collection() -> String {
    "default".into()
}
fn d_5() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_config_disabled_by_default() {
        let cfg: KnowledgeConfig = toml::from_str("").unwrap();
        assert!(!cfg.enabled);
        assert_eq!(cfg.max_results, 5);
        assert_eq!(cfg.default_collection, "default");
    }

    #[test]
    fn knowledge_config_parses_overrides() {
        let toml_str = r#"
            enabled = true
            base_url = "http://kb.internal:6333"
            api_key = "secret"
            max_results = 10
        "#;
        let cfg: KnowledgeConfig = toml::from_str(toml_str).unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.max_results, 10);
    }
}
