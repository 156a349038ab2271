//! Persistence reconciler.
//!
//! The assistant placeholder row is created before streaming starts (its
//! existence marks "a turn is in progress"); this module settles it once
//! streaming ends. A successful turn with visible output fills the row
//! and touches the chat; an empty turn leaves no trace; a failed turn
//! keeps partial text but rolls back fully when nothing visible was
//! produced.

use uuid::Uuid;

use cf_domain::error::Result;
use cf_store::ChatStore;

use super::title;
use super::translate::Translator;
use crate::state::AppState;

/// Finalize a completed turn.
///
/// Title (re)generation fires when the chat reaches exactly 2 messages
/// (first exchange) or a multiple of 10 (periodic refresh); it is
/// fire-and-forget and never blocks this path.
pub fn finalize_turn(
    state: &AppState,
    chat_id: Uuid,
    message_id: Uuid,
    translator: &Translator,
) -> Result<()> {
    if !translator.has_output() {
        // Empty-but-successful completion: the placeholder disappears.
        tracing::debug!(chat_id = %chat_id, "empty turn, deleting placeholder");
        return state.store.delete_message(message_id);
    }

    state.store.update_message_text(message_id, translator.text())?;
    state.store.touch_chat(chat_id)?;

    let count = state.store.message_count(chat_id);
    if count == 2 || count % 10 == 0 {
        title::spawn_title_regeneration(state.clone(), chat_id);
    }

    Ok(())
}

/// Clean up after a failed turn.
///
/// Partial success is preserved: when any text reached the transcript,
/// the row stays as-is. Only a turn that failed before producing visible
/// text is rolled back: attached artifacts first, then the placeholder.
/// Best-effort: failures here are logged, not propagated, so the caller
/// can still emit its single error event.
pub fn cleanup_failed_turn(store: &ChatStore, message_id: Uuid, accumulated_text: &str) {
    if !accumulated_text.is_empty() {
        if let Err(e) = store.update_message_text(message_id, accumulated_text) {
            tracing::warn!(message_id = %message_id, error = %e, "failed to persist partial text");
        }
        return;
    }

    match store.delete_artifacts_for_message(message_id) {
        Ok(0) => {}
        Ok(n) => tracing::debug!(message_id = %message_id, artifacts = n, "rolled back orphaned artifacts"),
        Err(e) => tracing::warn!(message_id = %message_id, error = %e, "failed to delete orphaned artifacts"),
    }
    if let Err(e) = store.delete_message(message_id) {
        tracing::warn!(message_id = %message_id, error = %e, "failed to delete placeholder message");
    }
}
