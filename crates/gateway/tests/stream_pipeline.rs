//! End-to-end pipeline tests: scripted provider in, wire events and
//! persisted state out.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use cf_domain::capability::LlmCapabilities;
use cf_domain::config::Config;
use cf_domain::error::Result;
use cf_domain::stream::{BoxStream, ProviderEvent};
use cf_gateway::runtime::{stream_turn, ChatEvent, StreamInput};
use cf_gateway::state::AppState;
use cf_providers::{ChatRequest, ChatResponse, LlmProvider};
use cf_store::{ArtifactType, MessageRole};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scripted provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Plays back pre-scripted streaming rounds and serves a canned
/// non-streaming completion (artifact generation, titles).
struct ScriptedProvider {
    rounds: Mutex<VecDeque<Vec<Result<ProviderEvent>>>>,
    requests: Mutex<Vec<ChatRequest>>,
    chat_content: String,
    caps: LlmCapabilities,
}

impl ScriptedProvider {
    fn new(rounds: Vec<Vec<Result<ProviderEvent>>>) -> Arc<Self> {
        Arc::new(Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(Vec::new()),
            chat_content: "canned completion".into(),
            caps: LlmCapabilities {
                supports_tools: true,
                supports_streaming: true,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
        Ok(ChatResponse {
            content: self.chat_content.clone(),
            tool_calls: Vec::new(),
            usage: None,
            model: "scripted".into(),
            finish_reason: Some("stop".into()),
        })
    }

    async fn chat_stream(
        &self,
        req: ChatRequest,
    ) -> Result<BoxStream<'static, Result<ProviderEvent>>> {
        self.requests.lock().push(req);
        let round = self.rounds.lock().pop_front().unwrap_or_default();
        Ok(Box::pin(futures_util::stream::iter(round)))
    }

    fn capabilities(&self) -> &LlmCapabilities {
        &self.caps
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

// ── Event shorthands ───────────────────────────────────────────────

fn token(text: &str) -> Result<ProviderEvent> {
    Ok(ProviderEvent::Token { text: text.into() })
}

fn done() -> Result<ProviderEvent> {
    Ok(ProviderEvent::Done {
        usage: None,
        finish_reason: Some("stop".into()),
    })
}

fn tool_call(name: &str, args: serde_json::Value) -> Result<ProviderEvent> {
    Ok(ProviderEvent::ToolCallFinished {
        call_id: "c1".into(),
        tool_name: name.into(),
        arguments: args,
    })
}

// ── Harness ────────────────────────────────────────────────────────

fn test_state(dir: &tempfile::TempDir, provider: Arc<ScriptedProvider>) -> AppState {
    let mut config = Config::default();
    config.storage.state_path = dir.path().to_path_buf();
    let state = AppState::from_config(config).expect("state builds");
    state.llm.register("scripted", provider);
    state
}

async fn run_turn(state: &AppState, chat_id: Uuid, message: &str) -> Vec<ChatEvent> {
    let mut rx = stream_turn(
        state.clone(),
        StreamInput {
            chat_id,
            user_message: message.into(),
            model: None,
        },
    );

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn text_contents(events: &[ChatEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ChatEvent::Text { content } => Some(content.clone()),
            _ => None,
        })
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenarios
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn plain_text_turn_streams_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![vec![token("Hi"), token(" there"), done()]]);
    let state = test_state(&dir, provider);
    let chat_id = Uuid::new_v4();

    let events = run_turn(&state, chat_id, "Say hi").await;

    assert_eq!(text_contents(&events), vec!["Hi", " there"]);
    assert!(!events.iter().any(|e| matches!(e, ChatEvent::Error { .. })));

    let messages = state.store.messages(chat_id);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].parts.text, "Say hi");
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].parts.text, "Hi there");
}

#[tokio::test]
async fn first_exchange_triggers_title_generation() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![vec![token("Hello!"), done()]]);
    let state = test_state(&dir, provider);
    let chat_id = Uuid::new_v4();

    run_turn(&state, chat_id, "Say hello").await;

    // Title generation is fire-and-forget; poll briefly.
    let mut title = None;
    for _ in 0..40 {
        title = state.store.get_chat(chat_id).and_then(|c| c.title);
        if title.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
    assert_eq!(title.as_deref(), Some("canned completion"));
}

#[tokio::test]
async fn artifact_turn_emits_reference_and_keeps_content_out_of_wire() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![
        vec![
            tool_call(
                "create_artifact",
                serde_json::json!({
                    "name": "Circle",
                    "purpose": "a simple SVG drawing of a circle",
                    "type": "svg"
                }),
            ),
            done(),
        ],
        vec![token("Here's your circle."), done()],
    ]);
    let state = test_state(&dir, provider);
    let chat_id = Uuid::new_v4();

    let events = run_turn(&state, chat_id, "Create a simple SVG of a circle").await;

    let artifact_events: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ChatEvent::Artifact { artifact } => Some(artifact.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(artifact_events.len(), 1);
    assert_eq!(artifact_events[0].kind, ArtifactType::Svg);
    assert_eq!(artifact_events[0].title, "Circle");

    assert_eq!(text_contents(&events), vec!["Here's your circle."]);

    // The artifact row is attached to the assistant message and holds
    // the generated content the wire event omitted.
    let messages = state.store.messages(chat_id);
    let assistant = &messages[1];
    assert_eq!(assistant.parts.text, "Here's your circle.");
    let artifacts = state.store.artifacts_for_message(assistant.id);
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].content, "canned completion");
    assert_eq!(artifacts[0].id, artifact_events[0].id);
}

#[tokio::test]
async fn untriggered_turn_offers_only_knowledge_search() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![vec![token("4"), done()]]);
    let state = test_state(&dir, Arc::clone(&provider));
    let chat_id = Uuid::new_v4();

    let events = run_turn(&state, chat_id, "What is 2+2?").await;

    assert_eq!(text_contents(&events), vec!["4"]);

    let requests = provider.requests.lock();
    let tool_names: Vec<_> = requests[0].tools.iter().map(|t| t.name.clone()).collect();
    assert_eq!(tool_names, vec!["search_knowledge"]);
}

#[tokio::test]
async fn midstream_failure_keeps_partial_text_and_emits_one_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![vec![
        token("Partial"),
        Ok(ProviderEvent::Error {
            message: "connection reset by provider".into(),
        }),
    ]]);
    let state = test_state(&dir, provider);
    let chat_id = Uuid::new_v4();

    let events = run_turn(&state, chat_id, "Say something long").await;

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], ChatEvent::Text { content } if content == "Partial"));
    match &events[1] {
        ChatEvent::Error { content } => {
            assert_eq!(content, "An error occurred while streaming the response.");
            // Internals never leak.
            assert!(!content.contains("connection reset"));
        }
        other => panic!("expected error event, got {other:?}"),
    }

    // Partial success is preserved.
    let messages = state.store.messages(chat_id);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].parts.text, "Partial");
}

#[tokio::test]
async fn empty_completion_rolls_back_placeholder_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![vec![done()]]);
    let state = test_state(&dir, provider);
    let chat_id = Uuid::new_v4();

    let events = run_turn(&state, chat_id, "Say nothing").await;

    assert!(events.is_empty(), "unexpected events: {events:?}");

    // Only the user message remains; the placeholder left no trace.
    let messages = state.store.messages(chat_id);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
}

#[tokio::test]
async fn failing_tool_never_surfaces_its_error_string() {
    let dir = tempfile::tempdir().unwrap();
    // Query of length 1 makes the knowledge tool return an Error: string.
    let provider = ScriptedProvider::new(vec![
        vec![tool_call("search_knowledge", serde_json::json!({ "query": "x" })), done()],
        vec![token("Answering from general knowledge."), done()],
    ]);
    let state = test_state(&dir, provider);
    let chat_id = Uuid::new_v4();

    let events = run_turn(&state, chat_id, "Tell me about our setup").await;

    for event in &events {
        let json = serde_json::to_string(event).unwrap();
        assert!(!json.contains("Error:"), "tool error leaked: {json}");
    }
    assert_eq!(
        text_contents(&events),
        vec!["Answering from general knowledge."]
    );

    let messages = state.store.messages(chat_id);
    assert_eq!(messages[1].parts.text, "Answering from general knowledge.");
}

#[tokio::test]
async fn scaffold_result_is_narrated_into_the_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![
        vec![
            tool_call(
                "generate_laravel_model",
                serde_json::json!({
                    "name": "BlogPost",
                    "fields": "title:string, body:text:nullable",
                    "with": "migration"
                }),
            ),
            done(),
        ],
        vec![token("All set."), done()],
    ]);
    let state = test_state(&dir, provider);
    let chat_id = Uuid::new_v4();

    let events = run_turn(&state, chat_id, "I need an eloquent model for blog posts").await;

    let texts = text_contents(&events);
    assert_eq!(texts.len(), 2);
    assert!(texts[0].starts_with("\n\nGenerated Laravel scaffolding for model BlogPost."));
    assert_eq!(texts[1], "All set.");

    let messages = state.store.messages(chat_id);
    let persisted = &messages[1].parts.text;
    assert!(persisted.contains("Generated Laravel scaffolding for model BlogPost."));
    assert!(persisted.ends_with("All set."));
    // The persisted text is exactly the concatenation of the emitted
    // text events.
    assert_eq!(*persisted, texts.concat());
}

#[tokio::test]
async fn multiple_turns_accumulate_history() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec![
        vec![token("First answer"), done()],
        vec![token("Second answer"), done()],
    ]);
    let state = test_state(&dir, Arc::clone(&provider));
    let chat_id = Uuid::new_v4();

    run_turn(&state, chat_id, "First question").await;
    run_turn(&state, chat_id, "Second question").await;

    let requests = provider.requests.lock();
    // Second call: system + first question + first answer + second question.
    assert_eq!(requests[1].messages.len(), 4);

    let messages = state.store.messages(chat_id);
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3].parts.text, "Second answer");
}
