//! Core runtime — the orchestrator that ties the chat store, trigger
//! matching, tool activation, LLM streaming, translation, and
//! persistence reconciliation into one deterministic flow per request.
//!
//! Entry point: [`stream_turn`] takes a chat + user message and returns a
//! channel of wire [`ChatEvent`]s suitable for NDJSON streaming.

pub mod history;
pub mod prompt;
pub mod reconcile;
pub mod title;
pub mod toolset;
pub mod translate;

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use cf_domain::error::{Error, Result};
use cf_providers::{completion_stream, CompletionRequest};
use cf_store::{ArtifactSummary, MessageRole};

use crate::state::AppState;
use self::translate::Translator;

/// Maximum number of tool-call rounds per turn. Two rounds, then the
/// model must answer in plain text.
const MAX_TOOL_STEPS: u32 = 2;

/// The one error message a client ever sees; details stay in the logs.
const GENERIC_STREAM_ERROR: &str = "An error occurred while streaming the response.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ChatEvent — the wire event type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Events streamed to the client, one NDJSON line each.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ChatEvent {
    /// A fragment of assistant text.
    #[serde(rename = "text")]
    Text { content: String },

    /// An artifact was created during this turn (reference only, never
    /// the raw content).
    #[serde(rename = "artifact")]
    Artifact { artifact: ArtifactSummary },

    /// The turn failed; this is always the final event when present.
    #[serde(rename = "error")]
    Error { content: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Run parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Input to a single streamed turn.
pub struct StreamInput {
    pub chat_id: Uuid,
    pub user_message: String,
    /// Model spec override ("provider_id/model_name"). `None` = use the
    /// chat's stored model, then config defaults.
    pub model: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// stream_turn — the core orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one chat turn: persist the user message, create the assistant
/// placeholder, open the completion call, and translate its events to
/// the returned channel as they arrive.
///
/// On any pipeline failure the placeholder is reconciled (partial text
/// kept, empty turns rolled back) and the channel carries exactly one
/// generic error event as its last item. A dropped receiver does not
/// abort the turn; persistence still settles.
pub fn stream_turn(state: AppState, input: StreamInput) -> mpsc::Receiver<ChatEvent> {
    let (tx, rx) = mpsc::channel::<ChatEvent>(64);

    tokio::spawn(async move {
        let mut translator = Translator::new();
        let mut placeholder_id: Option<Uuid> = None;

        let result =
            stream_turn_inner(&state, &input, &tx, &mut translator, &mut placeholder_id).await;

        if let Err(e) = result {
            tracing::error!(chat_id = %input.chat_id, error = %e, "chat stream failed");
            if let Some(message_id) = placeholder_id {
                reconcile::cleanup_failed_turn(&state.store, message_id, translator.text());
            }
            let _ = tx
                .send(ChatEvent::Error {
                    content: GENERIC_STREAM_ERROR.into(),
                })
                .await;
        }
    });

    rx
}

async fn stream_turn_inner(
    state: &AppState,
    input: &StreamInput,
    tx: &mpsc::Sender<ChatEvent>,
    translator: &mut Translator,
    placeholder_id: &mut Option<Uuid>,
) -> Result<()> {
    // 1. Resolve the chat and its model.
    let (chat, is_new) = state.store.resolve_or_create_chat(input.chat_id)?;
    if is_new {
        tracing::info!(chat_id = %chat.id, "new chat created");
    }
    if input.model.is_some() && input.model != chat.model {
        state.store.set_chat_model(chat.id, input.model.clone())?;
    }
    let model_spec = input.model.clone().or(chat.model);

    let resolved = state
        .llm
        .resolve(model_spec.as_deref())
        .ok_or_else(|| Error::Other("no LLM providers available".into()))?;

    // 2. Persist the user turn, then snapshot the history (which now
    //    ends with it).
    state
        .store
        .append_message(chat.id, MessageRole::User, input.user_message.as_str())?;
    let history = history::build_history(&state.store, chat.id);

    // 3. Create the assistant placeholder before streaming starts, so a
    //    reconnecting UI has a row to attach to.
    let placeholder = state
        .store
        .append_message(chat.id, MessageRole::Assistant, "")?;
    *placeholder_id = Some(placeholder.id);

    // 4. Activate tools (capability gate + trigger gate) and build the
    //    system prompt.
    let tools = toolset::activate_tools(state, &input.user_message, placeholder.id, &resolved);
    let system_prompt = prompt::system_prompt(&tools);

    tracing::debug!(
        chat_id = %chat.id,
        provider = resolved.provider.provider_id(),
        tools = tools.len(),
        history = history.len(),
        "opening completion call"
    );

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(cf_domain::tool::Message::system(system_prompt));
    messages.extend(history);

    // 5. Drive the completion and translate every event as it arrives.
    let req = CompletionRequest {
        messages,
        tools,
        max_steps: MAX_TOOL_STEPS,
        model: resolved.model.clone(),
        temperature: None,
    };
    let mut stream = completion_stream(resolved.provider.clone(), req);

    while let Some(event) = stream.next().await {
        let event = event?;
        for chat_event in translator.apply(event, &state.store) {
            // A closed receiver means the client went away; the turn
            // still runs to completion so persistence reconciles.
            let _ = tx.send(chat_event).await;
        }
    }

    // 6. Settle persistence before the channel closes.
    reconcile::finalize_turn(state, chat.id, placeholder.id, translator)?;
    Ok(())
}
