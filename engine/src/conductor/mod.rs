//! Conductor System
//!
//! Turns a one-line project description into generated files: plan, run
//! each task through its specialist, materialize the code blocks.

pub mod context;
pub mod orchestrator;
pub mod planner;
pub mod progress;
pub mod types;

pub use orchestrator::BuildOrchestrator;
pub use progress::{BuildEvent, JsonReporter, ProgressSink, RecordingSink, TerminalReporter};
pub use types::{BuildReport, BuildSummary, ParsedPlan, Task, TaskStatus};

use crate::llm::LLMError;
use sdk::errors::{EngineError, ErrorHint};
use thiserror::Error;

/// Conditions that end a build before the task loop
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("project description is empty")]
    EmptyDescription,

    #[error("failed to create project structure: {0}")]
    ProjectStructure(#[source] EngineError),

    #[error("planner agent unavailable: {0}")]
    PlannerUnavailable(#[source] EngineError),

    #[error("planning failed: {0}")]
    Planning(#[source] LLMError),

    #[error("no executable tasks found in plan")]
    NoTasks,
}

impl ErrorHint for BuildError {
    fn user_hint(&self) -> &str {
        match self {
            BuildError::EmptyDescription => {
                "Describe the project, e.g. devcrew build \"a todo app with auth\""
            }
            BuildError::ProjectStructure(e) => e.user_hint(),
            BuildError::PlannerUnavailable(e) => e.user_hint(),
            BuildError::Planning(LLMError::AuthenticationFailed(_)) => {
                "Check your Groq API key with: devcrew config set-key <KEY>"
            }
            BuildError::Planning(LLMError::RateLimitExceeded) => {
                "Groq rate limit reached. Wait a moment and retry"
            }
            BuildError::Planning(_) => {
                "The planner request failed. Check your network connection and retry"
            }
            BuildError::NoTasks => {
                "The planner returned no usable tasks. Try a more specific description"
            }
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BuildError::Planning(LLMError::RateLimitExceeded)
                | BuildError::Planning(LLMError::Timeout)
                | BuildError::Planning(LLMError::NetworkError(_))
        )
    }
}
