//! Conversation history builder.
//!
//! Maps a chat's persisted messages, in creation order, to the
//! role-tagged wire messages the completion call consumes. Read-only; no
//! filtering, truncation, or summarization; the full history is always
//! sent.

use uuid::Uuid;

use cf_domain::tool::Message;
use cf_store::{ChatStore, MessageRole};

/// Build the completion-call history for a chat.
pub fn build_history(store: &ChatStore, chat_id: Uuid) -> Vec<Message> {
    store
        .messages(chat_id)
        .into_iter()
        .map(|m| match m.role {
            MessageRole::User => Message::user(m.parts.text),
            MessageRole::Assistant => Message::assistant(m.parts.text),
        })
        .collect()
}
