//! Stream event translator — the pipeline's state machine.
//!
//! Consumes completion events (text deltas, tool results) and produces
//! wire [`ChatEvent`]s while accumulating the full response text and any
//! artifact ids signalled through side-channel markers. The accumulated
//! text is exactly the concatenation, in event order, of every emitted
//! text fragment; nothing is ever un-appended.
//!
//! Tool results that are `Error:`-prefixed or match no known marker are
//! absorbed: no text mutation, no wire event. Tool internals never leak
//! into the visible transcript.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use cf_domain::stream::CompletionEvent;
use cf_store::ChatStore;

use super::ChatEvent;

/// Tool whose non-error results are narrated into the transcript.
const SCAFFOLD_TOOL: &str = "generate_laravel_model";
/// Tool whose marker-tagged results are narrated as knowledge context.
const KNOWLEDGE_TOOL: &str = "search_knowledge";

fn artifact_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\[artifact:([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})\]",
        )
        .unwrap()
    })
}

fn knowledge_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[knowledge:(\d+) results\]").unwrap())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Translator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-turn accumulator. `ACCUMULATING` is the only steady state; the
/// translator simply stops being fed when the upstream stream ends.
#[derive(Default)]
pub struct Translator {
    text: String,
    artifact_ids: Vec<Uuid>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full accumulated response text; this is the value the
    /// reconciler eventually persists.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Artifact ids recorded from markers (whether or not the lookup
    /// found a row).
    pub fn artifact_ids(&self) -> &[Uuid] {
        &self.artifact_ids
    }

    /// True when the turn produced anything a user can see.
    pub fn has_output(&self) -> bool {
        !self.text.is_empty() || !self.artifact_ids.is_empty()
    }

    /// Apply one upstream event; returns the wire events to emit, in
    /// order. Emission must happen before the next `apply` call to
    /// preserve upstream ordering.
    pub fn apply(&mut self, event: CompletionEvent, store: &ChatStore) -> Vec<ChatEvent> {
        match event {
            CompletionEvent::TextDelta { text } => {
                self.text.push_str(&text);
                vec![ChatEvent::Text { content: text }]
            }
            CompletionEvent::ToolResult { tool_name, content } => {
                self.apply_tool_result(&tool_name, &content, store)
            }
            // Tool-call announcements and terminal bookkeeping carry no
            // user-visible payload.
            CompletionEvent::ToolCall { .. } | CompletionEvent::Done { .. } => Vec::new(),
        }
    }

    fn apply_tool_result(
        &mut self,
        tool_name: &str,
        result: &str,
        store: &ChatStore,
    ) -> Vec<ChatEvent> {
        let mut events = Vec::new();

        if tool_name == SCAFFOLD_TOOL && !result.starts_with("Error:") {
            let narration = format!("\n\n{result}");
            self.text.push_str(&narration);
            events.push(ChatEvent::Text { content: narration });
        }

        if tool_name == KNOWLEDGE_TOOL {
            if let Some(context) = knowledge_context(result) {
                let narration = format!("\n\n**Knowledge Base Results:**{context}");
                self.text.push_str(&narration);
                events.push(ChatEvent::Text { content: narration });
            }
        }

        // Artifact markers are scanned regardless of which tool returned
        // the string.
        for artifact_id in artifact_markers(result) {
            self.artifact_ids.push(artifact_id);
            match store.get_artifact(artifact_id) {
                Some(artifact) => events.push(ChatEvent::Artifact {
                    artifact: artifact.summary(),
                }),
                None => {
                    tracing::warn!(
                        artifact_id = %artifact_id,
                        "artifact marker does not match a stored artifact"
                    );
                }
            }
        }

        events
    }
}

/// Everything after the first blank line of a marker-tagged knowledge
/// result; `None` when the marker is absent.
fn knowledge_context(result: &str) -> Option<&str> {
    if !knowledge_marker_re().is_match(result) {
        return None;
    }
    result.find("\n\n").map(|idx| &result[idx + 2..])
}

/// All artifact uuids embedded in a tool result.
fn artifact_markers(result: &str) -> Vec<Uuid> {
    artifact_marker_re()
        .captures_iter(result)
        .filter_map(|caps| Uuid::parse_str(&caps[1]).ok())
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
