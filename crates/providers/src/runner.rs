//! Step runner — drives tool-call rounds over a raw provider stream.
//!
//! A completion call is one or more provider rounds: the model streams
//! tokens and (possibly) tool calls; the runner executes each requested
//! tool, feeds the results back as messages, and opens the next round.
//! `max_steps` bounds the number of tool rounds; the round after the
//! last permitted one is sent without tool definitions, so the model has
//! to answer in plain text.
//!
//! Entry point: [`completion_stream`] returns a lazy stream of
//! [`CompletionEvent`]s; nothing upstream is pulled until the consumer
//! polls.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::Value;

use cf_domain::error::Error;
use cf_domain::stream::{BoxStream, CompletionEvent, ProviderEvent, Usage};
use cf_domain::tool::{ContentPart, Message, MessageContent, Role, Tool, ToolCall};

use crate::traits::{ChatRequest, LlmProvider};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CompletionRequest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A full completion call: the conversation plus the executable tools the
/// model may invoke, bounded by `max_steps` tool rounds.
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<Arc<dyn Tool>>,
    /// Maximum number of tool-call rounds before the model must answer in
    /// plain text.
    pub max_steps: u32,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// completion_stream — the round loop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run a completion against `provider`, executing tools between rounds.
///
/// Tool execution is sequential, in the order the model requested the
/// calls. A tool the model names that is not in the request's tool set
/// produces an `Error:`-prefixed result rather than a stream error, so
/// the turn continues.
pub fn completion_stream(
    provider: Arc<dyn LlmProvider>,
    req: CompletionRequest,
) -> BoxStream<'static, cf_domain::error::Result<CompletionEvent>> {
    Box::pin(async_stream::try_stream! {
        let CompletionRequest { mut messages, tools, max_steps, model, temperature } = req;

        let tool_map: HashMap<String, Arc<dyn Tool>> = tools
            .iter()
            .map(|t| (t.name().to_owned(), Arc::clone(t)))
            .collect();
        let tool_defs: Vec<_> = tools.iter().map(|t| t.definition()).collect();

        let mut total_usage = Usage::default();

        // Rounds 0..max_steps may call tools; round max_steps is forced
        // tool-less so the stream always ends in text (or nothing).
        for step in 0..=max_steps {
            let round_tools = if step < max_steps {
                tool_defs.clone()
            } else {
                Vec::new()
            };

            let chat_req = ChatRequest {
                messages: messages.clone(),
                tools: round_tools,
                temperature,
                max_tokens: None,
                model: model.clone(),
            };

            let mut stream = provider.chat_stream(chat_req).await?;

            let mut text_buf = String::new();
            let mut pending: Vec<ToolCall> = Vec::new();
            let mut round_usage: Option<Usage> = None;

            // Tool call assembly state: call_id -> (name, args_json).
            let mut tc_bufs: HashMap<String, (String, String)> = HashMap::new();

            while let Some(event) = stream.next().await {
                match event? {
                    ProviderEvent::Token { text } => {
                        text_buf.push_str(&text);
                        yield CompletionEvent::TextDelta { text };
                    }
                    ProviderEvent::ToolCallStarted { call_id, tool_name } => {
                        tc_bufs.insert(call_id, (tool_name, String::new()));
                    }
                    ProviderEvent::ToolCallDelta { call_id, delta } => {
                        if let Some((_, args)) = tc_bufs.get_mut(&call_id) {
                            args.push_str(&delta);
                        }
                    }
                    ProviderEvent::ToolCallFinished { call_id, tool_name, arguments } => {
                        pending.push(ToolCall {
                            call_id: call_id.clone(),
                            tool_name,
                            arguments,
                        });
                        tc_bufs.remove(&call_id);
                    }
                    ProviderEvent::Done { usage, finish_reason: _ } => {
                        round_usage = usage;
                    }
                    ProviderEvent::Error { message } => {
                        Err(Error::Provider {
                            provider: provider.provider_id().to_owned(),
                            message,
                        })?;
                    }
                }
            }

            // Assemble any tool calls that came through start/delta but not
            // through ToolCallFinished (some adapters only use start+delta).
            for (call_id, (name, args_str)) in tc_bufs.drain() {
                let arguments = if args_str.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    match serde_json::from_str(&args_str) {
                        Ok(v) => v,
                        Err(e) => {
                            tracing::warn!(
                                call_id = %call_id,
                                tool = %name,
                                error = %e,
                                "tool call arguments are not valid JSON; defaulting to empty object"
                            );
                            Value::Object(Default::default())
                        }
                    }
                };
                pending.push(ToolCall { call_id, tool_name: name, arguments });
            }

            if let Some(u) = &round_usage {
                total_usage.add(u);
            }

            // No tool calls: the model has answered.
            if pending.is_empty() {
                break;
            }

            // ── Tool dispatch (sequential, in request order) ──────────
            messages.push(build_assistant_tool_message(&text_buf, &pending));

            for tc in &pending {
                yield CompletionEvent::ToolCall {
                    tool_name: tc.tool_name.clone(),
                    arguments: tc.arguments.clone(),
                };

                let content = match tool_map.get(&tc.tool_name) {
                    Some(tool) => tool.execute(tc.arguments.clone()).await,
                    None => {
                        tracing::warn!(tool = %tc.tool_name, "model invoked an unknown tool");
                        format!("Error: Unknown tool '{}'.", tc.tool_name)
                    }
                };

                messages.push(Message::tool_result(&tc.call_id, &content));

                yield CompletionEvent::ToolResult {
                    tool_name: tc.tool_name.clone(),
                    content,
                };
            }
        }

        yield CompletionEvent::Done { usage: Some(total_usage) };
    })
}

/// Build the assistant message that carries a round's text and tool calls
/// back into the conversation for the next round.
fn build_assistant_tool_message(text: &str, tool_calls: &[ToolCall]) -> Message {
    let mut parts = Vec::new();

    if !text.is_empty() {
        parts.push(ContentPart::Text {
            text: text.to_owned(),
        });
    }

    for tc in tool_calls {
        parts.push(ContentPart::ToolUse {
            id: tc.call_id.clone(),
            name: tc.tool_name.clone(),
            input: tc.arguments.clone(),
        });
    }

    Message {
        role: Role::Assistant,
        content: MessageContent::Parts(parts),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
