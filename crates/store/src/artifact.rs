use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Artifact type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The renderable kind of a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Code,
    Markdown,
    Html,
    Svg,
    Mermaid,
    React,
    Vue,
}

impl ArtifactType {
    /// Map a requested type string to a variant. Unknown values fall back
    /// to `Html` rather than failing the tool call.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Self::Code,
            "markdown" => Self::Markdown,
            "html" => Self::Html,
            "svg" => Self::Svg,
            "mermaid" => Self::Mermaid,
            "react" => Self::React,
            "vue" => Self::Vue,
            _ => Self::Html,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Svg => "svg",
            Self::Mermaid => "mermaid",
            Self::React => "react",
            Self::Vue => "vue",
        }
    }

    /// The syntax-highlighting language derived from the type. `Code`
    /// carries no fixed language (the generator decides).
    pub fn language(&self) -> Option<&'static str> {
        match self {
            Self::Code => None,
            Self::Markdown => Some("markdown"),
            Self::Html => Some("html"),
            Self::Svg => Some("xml"),
            Self::Mermaid => Some("mermaid"),
            Self::React => Some("jsx"),
            Self::Vue => Some("vue"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Artifact
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A named, typed, generated content blob produced by the artifact tool
/// during a turn. Created once per successful tool invocation; never
/// edited in place; deleted only when a failed/empty assistant turn is
/// cleaned up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    /// The assistant message this artifact belongs to.
    pub message_id: Uuid,
    /// Caller-chosen logical name, stable across regenerations (distinct
    /// from `id`).
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: ArtifactType,
    pub title: String,
    #[serde(default)]
    pub language: Option<String>,
    pub content: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// The slim wire representation: everything a client needs to render
    /// a reference chip, never the raw content.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            id: self.id,
            identifier: self.identifier.clone(),
            kind: self.kind,
            title: self.title.clone(),
            language: self.language.clone(),
        }
    }
}

/// Wire-level artifact reference (id + metadata, no content).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub id: Uuid,
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: ArtifactType,
    pub title: String,
    pub language: Option<String>,
}
