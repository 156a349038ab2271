use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scaffold command
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// External scaffolding command, invoked via `sh -c`. The scaffold
    /// tool appends the generated artisan-style arguments. When unset,
    /// scaffold generation still returns the summary and suggested code
    /// without running anything.
    #[serde(default)]
    pub command: Option<String>,
    /// Working directory for the command.
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    /// Hard timeout for the command.
    #[serde(default = "d_60")]
    pub timeout_sec: u64,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            command: None,
            workdir: None,
            timeout_sec: 60,
        }
    }
}

fn d_60() -> u64 {
    60
}
