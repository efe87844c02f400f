//! Devcrew SDK
//!
//! Shared types and errors for devcrew components.
//! This crate is used by the engine and its integration tests.

/// Error types and handling
pub mod errors;

/// Role and response types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, ErrorHint};
pub use types::{AgentResponse, Role};
