use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider system
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model roles: `chat` (streaming turns), `title` (chat titles),
    /// `artifact` (artifact content generation). Values are
    /// "provider_id/model_name" specs. A missing role falls back to the
    /// default model, then to any registered provider.
    #[serde(default)]
    pub roles: HashMap<String, String>,
    /// Default "provider_id/model_name" spec for chats that carry no
    /// model of their own.
    #[serde(default)]
    pub default_model: Option<String>,
    /// Request timeout applied by adapters.
    #[serde(default = "d_20000u")]
    pub default_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            roles: HashMap::new(),
            default_model: None,
            default_timeout_ms: 20_000,
        }
    }
}

fn d_20000u() -> u64 {
    20_000
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
