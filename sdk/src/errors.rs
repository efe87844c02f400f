//! Error types and handling
//!
//! This module provides the error types shared by every devcrew crate.
//! All errors implement the `ErrorHint` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never embed API keys. Provider response bodies are
//! scrubbed by the engine before they are logged.

use thiserror::Error;

/// Trait for devcrew error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information.
pub trait ErrorHint {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors only affect the current task or file. Non-recoverable
    /// errors stop the whole command.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration, unsupported models
/// - **Secrets**: Missing API key, keychain failures
/// - **Agents**: Unknown roles or agent names
/// - **File System**: Generated paths escaping the project root
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, ErrorHint};
///
/// let error = EngineError::AgentNotFound("devops".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal = EngineError::MissingApiKey;
/// assert!(!fatal.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid model '{model}' for {scope}")]
    InvalidModel { model: String, scope: String },

    // Secret errors
    #[error("API key is not set")]
    MissingApiKey,

    #[error("Keyring error: {0}")]
    KeyringError(String),

    // Agent directory errors
    #[error("Agent type {0} not found")]
    AgentNotFound(String),

    #[error("No agent found matching '{0}'")]
    NoAgentMatching(String),

    // File system errors
    #[error("Path outside project: {0:?}")]
    PathOutsideProject(std::path::PathBuf),

    #[error("Failed to create project structure at {path:?}: {source}")]
    ProjectStructure {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorHint for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::InvalidModel { .. } => {
                "Pick a supported model with 'devcrew config set-model <model>'"
            }

            Self::MissingApiKey => {
                "Set GROQ_API_KEY or run 'devcrew config set-key <key>' to store one"
            }
            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",

            Self::AgentNotFound(_) => "This specialist is not available. Run 'devcrew agents'",
            Self::NoAgentMatching(_) => "Use one of the names listed by 'devcrew agents'",

            Self::PathOutsideProject(_) => "Generated files must stay inside the project",
            Self::ProjectStructure { .. } => {
                "Check that the output directory is writable"
            }

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_)
            | Self::InvalidModel { .. }
            | Self::MissingApiKey
            | Self::ProjectStructure { .. } => false,

            // Task- and file-scoped errors only skip one unit of work
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_not_found_message() {
        let err = EngineError::AgentNotFound("devops".to_string());
        assert_eq!(err.to_string(), "Agent type devops not found");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_project_structure_is_fatal() {
        let err = EngineError::ProjectStructure {
            path: std::path::PathBuf::from("generated-project"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("generated-project"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(_)));
        assert_eq!(err.user_hint(), "File system operation failed");
    }
}
