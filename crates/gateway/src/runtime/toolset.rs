//! Per-turn tool activation.
//!
//! Decides which tools this turn's completion call may invoke: none when
//! the model lacks tool support, otherwise knowledge search always plus
//! the trigger-gated artifact and scaffold tools. Tools needing per-turn
//! context (the owning message id) are constructed with it here.

use std::sync::Arc;

use uuid::Uuid;

use cf_domain::tool::Tool;
use cf_providers::ResolvedModel;
use cf_tools::triggers;
use cf_tools::{ArtifactCreationTool, KnowledgeSearchTool, ScaffoldGenerationTool};

use crate::state::AppState;

/// Build the tool set for one turn.
pub fn activate_tools(
    state: &AppState,
    user_message: &str,
    message_id: Uuid,
    resolved: &ResolvedModel,
) -> Vec<Arc<dyn Tool>> {
    if !resolved.provider.capabilities().supports_tools {
        return Vec::new();
    }

    let mut tools: Vec<Arc<dyn Tool>> = Vec::new();

    // Knowledge search is always offered when tool support is on.
    tools.push(Arc::new(KnowledgeSearchTool::new(
        state.knowledge.clone(),
        state.config.knowledge.clone(),
    )));

    if triggers::matches(user_message, triggers::ARTIFACT_TRIGGERS) {
        let generator = state
            .llm
            .for_role("artifact")
            .unwrap_or_else(|| resolved.clone());
        tools.push(Arc::new(
            ArtifactCreationTool::new(Arc::clone(&state.store), generator)
                .with_message(message_id),
        ));
    }

    if triggers::matches(user_message, triggers::SCAFFOLD_TRIGGERS) {
        tools.push(Arc::new(ScaffoldGenerationTool::new(Arc::clone(
            &state.scaffold,
        ))));
    }

    tools
}
