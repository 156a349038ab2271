use serde::{Deserialize, Serialize};

/// LLM model capabilities — every {provider, model} advertises these.
/// The pipeline only sends tool schemas when `supports_tools` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmCapabilities {
    pub supports_tools: bool,
    pub supports_streaming: bool,
}

impl Default for LlmCapabilities {
    fn default() -> Self {
        Self {
            supports_tools: false,
            supports_streaming: true,
        }
    }
}
