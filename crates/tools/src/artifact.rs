//! Artifact creation tool.
//!
//! Generates a typed content blob (code, markup, diagram, component) via
//! a one-shot completion call, persists it as an [`Artifact`] row on the
//! current assistant message, and returns a marker string the stream
//! translator scans for: `[artifact:{uuid}]`.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use cf_domain::tool::{Message, Tool, ToolDefinition};
use cf_providers::{ChatRequest, ResolvedModel};
use cf_store::{Artifact, ArtifactType, ChatStore};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Arguments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct ArtifactArgs {
    name: String,
    purpose: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    requirements: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Creates artifacts for the current assistant message.
///
/// Stateless except for per-turn context: the owning message id is
/// injected with [`with_message`](Self::with_message) before the turn's
/// completion call opens.
pub struct ArtifactCreationTool {
    store: Arc<ChatStore>,
    generator: ResolvedModel,
    message_id: Option<Uuid>,
}

impl ArtifactCreationTool {
    pub fn new(store: Arc<ChatStore>, generator: ResolvedModel) -> Self {
        Self {
            store,
            generator,
            message_id: None,
        }
    }

    /// Bind the tool to the assistant message being streamed.
    pub fn with_message(mut self, message_id: Uuid) -> Self {
        self.message_id = Some(message_id);
        self
    }

    async fn generate_content(&self, kind: ArtifactType, args: &ArtifactArgs) -> Result<String, String> {
        let mut user_prompt = format!("Name: {}\nPurpose: {}", args.name, args.purpose);
        if let Some(req) = args.requirements.as_deref().filter(|r| !r.trim().is_empty()) {
            user_prompt.push_str("\nRequirements: ");
            user_prompt.push_str(req);
        }

        let req = ChatRequest {
            messages: vec![
                Message::system(generation_system_prompt(kind)),
                Message::user(user_prompt),
            ],
            tools: Vec::new(),
            temperature: Some(0.7),
            max_tokens: None,
            model: self.generator.model.clone(),
        };

        match self.generator.provider.chat(req).await {
            Ok(resp) => Ok(resp.content),
            Err(e) => {
                tracing::warn!(error = %e, "artifact content generation failed");
                Err(format!("Error: Artifact generation failed: {e}"))
            }
        }
    }
}

#[async_trait::async_trait]
impl Tool for ArtifactCreationTool {
    fn name(&self) -> &'static str {
        "create_artifact"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "create_artifact".into(),
            description:
                "Create a visual or interactive artifact (code, markdown, html, svg, mermaid \
                 diagram, react or vue component) rendered alongside the chat."
                    .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Short display name for the artifact" },
                    "purpose": { "type": "string", "description": "What the artifact should do or show (at least 10 characters)" },
                    "type": {
                        "type": "string",
                        "enum": ["code", "markdown", "html", "svg", "mermaid", "react", "vue"],
                        "description": "Kind of artifact to generate"
                    },
                    "requirements": { "type": "string", "description": "Optional extra constraints (colors, data, layout)" }
                },
                "required": ["name", "purpose", "type"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> String {
        let args: ArtifactArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return format!("Error: Invalid arguments: {e}"),
        };

        if args.purpose.trim().chars().count() < 10 {
            return "Error: Purpose is too vague. Please provide at least 10 characters \
                    describing what to create."
                .into();
        }

        let Some(message_id) = self.message_id else {
            return "Error: Message context not set. Cannot create an artifact outside of a \
                    message."
                .into();
        };

        let kind = ArtifactType::parse_or_default(args.kind.as_deref().unwrap_or(""));

        let raw = match self.generate_content(kind, &args).await {
            Ok(content) => content,
            Err(error_string) => return error_string,
        };

        let mut content = strip_code_fences(&raw);
        if matches!(kind, ArtifactType::React | ArtifactType::Vue) {
            // The rendering sandbox supplies framework globals; generated
            // import statements would fail to resolve there.
            content = strip_import_lines(&content);
        }

        let artifact = Artifact {
            id: Uuid::new_v4(),
            message_id,
            identifier: slugify(&args.name),
            kind,
            title: args.name.clone(),
            language: kind.language().map(str::to_owned),
            content,
            version: 1,
            created_at: Utc::now(),
        };
        let artifact_id = artifact.id;

        if let Err(e) = self.store.insert_artifact(artifact) {
            tracing::warn!(error = %e, "failed to persist artifact");
            return format!("Error: Failed to save artifact: {e}");
        }

        format!(
            "Artifact created successfully: [artifact:{artifact_id}] - {}",
            args.name
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generation prompts & content cleanup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn generation_system_prompt(kind: ArtifactType) -> &'static str {
    match kind {
        ArtifactType::Code => {
            "You generate clean, self-contained code. Output only the code, \
             no explanations and no markdown fences."
        }
        ArtifactType::Markdown => {
            "You generate well-structured markdown documents. Output only the \
             document body."
        }
        ArtifactType::Html => {
            "You generate a single self-contained HTML document with inline CSS \
             and JavaScript. No external resources. Output only the HTML."
        }
        ArtifactType::Svg => {
            "You generate standalone SVG markup with a viewBox attribute. \
             Output only the <svg> element."
        }
        ArtifactType::Mermaid => {
            "You generate mermaid diagram definitions. Output only the diagram \
             source, starting with the diagram type keyword."
        }
        ArtifactType::React => {
            "You generate a single React function component using hooks, \
             exported as default. React is available as a global; do not write \
             import statements. Output only the component code."
        }
        ArtifactType::Vue => {
            "You generate a single-file Vue 3 component using the composition \
             API. Vue is available as a global; do not write import statements. \
             Output only the component code."
        }
    }
}

/// Remove a wrapping markdown code fence (with optional info string).
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(after) = trimmed.strip_prefix("```") else {
        return trimmed.to_owned();
    };
    let body = match after.find('\n') {
        Some(i) => &after[i + 1..],
        None => return trimmed.to_owned(),
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim_end().to_owned()
}

/// Drop top-level `import …` lines (react/vue sandboxes provide globals).
fn strip_import_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("import "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_start()
        .to_owned()
}

/// Derive a stable logical identifier from the display name.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_owned();
    if slug.is_empty() {
        "artifact".into()
    } else {
        slug
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
