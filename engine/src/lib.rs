//! devcrew engine library
//!
//! Planning, agent dispatch and file generation behind the `devcrew` binary.
//! It is used by both the main binary and integration tests.

/// Specialist agents and the role directory
pub mod agents;

/// CLI interface module
pub mod cli;

/// Configuration management module
pub mod config;

/// Build orchestration module
pub mod conductor;

/// Command handlers module
pub mod handlers;

/// Chat-completion transport
pub mod llm;

/// Secret management module
pub mod secrets;

/// Telemetry and Observability
pub mod telemetry;

/// Code extraction and project file writing
pub mod tools;
