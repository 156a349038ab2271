//! Asynchronous chat title (re)generation.
//!
//! Dispatched fire-and-forget at the reconciler's checkpoints; failures
//! are logged and dropped, never surfaced to the request.

use uuid::Uuid;

use cf_domain::error::Result;
use cf_domain::tool::Message;
use cf_providers::ChatRequest;
use cf_store::MessageRole;

use crate::state::AppState;

const TITLE_PROMPT: &str =
    "Generate a concise title (at most six words) for a conversation that starts \
     with the user's message. Reply with the title only, no surrounding quotes.";

const MAX_TITLE_CHARS: usize = 80;

/// Spawn title regeneration for a chat. Does not block the caller.
pub fn spawn_title_regeneration(state: AppState, chat_id: Uuid) {
    tokio::spawn(async move {
        if let Err(e) = regenerate_title(&state, chat_id).await {
            tracing::warn!(chat_id = %chat_id, error = %e, "title regeneration failed");
        }
    });
}

async fn regenerate_title(state: &AppState, chat_id: Uuid) -> Result<()> {
    let Some(resolved) = state.llm.for_role("title") else {
        return Ok(());
    };

    let messages = state.store.messages(chat_id);
    let Some(first_user) = messages.iter().find(|m| m.role == MessageRole::User) else {
        return Ok(());
    };

    let req = ChatRequest {
        messages: vec![
            Message::system(TITLE_PROMPT),
            Message::user(first_user.parts.text.clone()),
        ],
        tools: Vec::new(),
        temperature: Some(0.3),
        max_tokens: Some(32),
        model: resolved.model.clone(),
    };

    let resp = resolved.provider.chat(req).await?;
    let title: String = resp
        .content
        .trim()
        .trim_matches('"')
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    if title.is_empty() {
        return Ok(());
    }

    tracing::debug!(chat_id = %chat_id, title = %title, "chat title updated");
    state.store.set_chat_title(chat_id, title)
}
