//! `cf-domain` — shared types for all ChatForge crates.
//!
//! Holds the error type, configuration tree, provider-agnostic message and
//! tool types, streaming event enums, and model capabilities. Every other
//! crate in the workspace depends on this one and nothing else here pulls
//! in I/O beyond serde.

pub mod capability;
pub mod config;
pub mod error;
pub mod stream;
pub mod tool;
