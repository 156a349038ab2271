//! Built-in tools for ChatForge.
//!
//! Three capabilities the completion engine may invoke during a chat
//! turn, plus the trigger matcher that decides which of them to offer:
//! - `create_artifact`: generate a typed content blob and persist it
//! - `search_knowledge`: query the external knowledge backend
//! - `generate_laravel_model`: parse a model description and run the
//!   external scaffolding command
//!
//! Every tool reports user-input problems by returning an
//! `Error:`-prefixed string; none of them panic or surface `Err` to the
//! step runner.

pub mod artifact;
pub mod knowledge;
pub mod scaffold;
pub mod triggers;

pub use artifact::ArtifactCreationTool;
pub use knowledge::KnowledgeSearchTool;
pub use scaffold::{CommandScaffoldRunner, ScaffoldGenerationTool, ScaffoldRunner};
