//! `cf-knowledge` — client crate for the external knowledge backend.
//!
//! Provides the [`KnowledgeBackend`] trait that abstracts over the
//! backend's search API, a production REST implementation
//! ([`RestKnowledgeClient`]), and the typed DTOs the search tool
//! formats into model-visible context.

pub mod backend;
pub mod rest;
pub mod types;

pub use backend::KnowledgeBackend;
pub use rest::RestKnowledgeClient;
pub use types::{KnowledgeHit, KnowledgeSearchRequest, SearchType};
