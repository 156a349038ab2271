use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A boxed async stream, used for LLM streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Raw events emitted by a provider adapter during streaming
/// (provider-agnostic).
///
/// Tool calls arrive incrementally: `ToolCallStarted` opens an assembly
/// buffer, `ToolCallDelta` extends the argument JSON, `ToolCallFinished`
/// closes it. Some adapters only emit start + delta; the step runner
/// drains unfinished buffers after `Done`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ProviderEvent {
    /// A text token chunk.
    #[serde(rename = "token")]
    Token { text: String },

    /// A tool call has started.
    #[serde(rename = "tool_call_started")]
    ToolCallStarted { call_id: String, tool_name: String },

    /// Incremental tool call argument data.
    #[serde(rename = "tool_call_delta")]
    ToolCallDelta { call_id: String, delta: String },

    /// A tool call is complete with full arguments.
    #[serde(rename = "tool_call_finished")]
    ToolCallFinished {
        call_id: String,
        tool_name: String,
        arguments: serde_json::Value,
    },

    /// Stream is finished.
    #[serde(rename = "done")]
    Done {
        usage: Option<Usage>,
        finish_reason: Option<String>,
    },

    /// An error occurred during streaming.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Events of a full completion call, after the step runner has resolved
/// tool rounds. This is what the chat pipeline consumes: text deltas and
/// finished tool results, in upstream order, with at most `max_steps`
/// tool rounds before the model must answer in plain text.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CompletionEvent {
    /// A text token chunk from the assistant.
    #[serde(rename = "text_delta")]
    TextDelta { text: String },

    /// The model is invoking a tool (informational; the runner executes it).
    #[serde(rename = "tool_call")]
    ToolCall {
        tool_name: String,
        arguments: serde_json::Value,
    },

    /// A tool finished executing. `content` is the tool's returned string;
    /// tool failures arrive here as `Error:`-prefixed content, never as a
    /// stream error.
    #[serde(rename = "tool_result")]
    ToolResult { tool_name: String, content: String },

    /// The completion is finished.
    #[serde(rename = "done")]
    Done { usage: Option<Usage> },
}

/// Token usage for a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Accumulate another round's usage into this one.
    pub fn add(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}
