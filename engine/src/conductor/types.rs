use chrono::{DateTime, Utc};
use sdk::types::{AgentResponse, Role};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Lifecycle of a task. A task that was skipped or whose call failed stays
/// `Pending`; only `Completed` carries a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "result", rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed(AgentResponse),
}

/// One unit of work parsed from the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub role: Role,
    pub description: String,
    pub status: TaskStatus,
}

impl Task {
    /// `n` is the 1-based position among accepted plan lines
    pub fn new(n: usize, role: Role, description: impl Into<String>) -> Self {
        Self {
            id: format!("task_{}", n),
            role,
            description: description.into(),
            status: TaskStatus::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed(_))
    }

    pub fn result(&self) -> Option<&AgentResponse> {
        match &self.status {
            TaskStatus::Completed(response) => Some(response),
            TaskStatus::Pending => None,
        }
    }

    pub fn complete(&mut self, response: AgentResponse) {
        self.status = TaskStatus::Completed(response);
    }
}

/// Output of the plan parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPlan {
    pub tasks: Vec<Task>,
    /// Well-formed lines whose role token is not a known specialist
    pub dropped: usize,
}

/// A generated file that could not be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Accumulator folded over the task list
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub run_id: String,
    pub description: String,
    pub project_root: PathBuf,
    pub started_at: DateTime<Utc>,
    #[serde(serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub total_stages: usize,
    pub tasks: Vec<Task>,
    /// Tasks whose role had no specialist
    pub skipped: usize,
    /// Tasks whose agent call returned an error
    pub failed: usize,
    pub dropped_lines: usize,
    pub tokens_used: u64,
    pub files_written: Vec<PathBuf>,
    pub files_failed: Vec<FileFailure>,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl BuildReport {
    pub fn new(run_id: String, description: &str, project_root: PathBuf) -> Self {
        Self {
            run_id,
            description: description.to_string(),
            project_root,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            total_stages: 2,
            tasks: Vec::new(),
            skipped: 0,
            failed: 0,
            dropped_lines: 0,
            tokens_used: 0,
            files_written: Vec::new(),
            files_failed: Vec::new(),
        }
    }

    pub fn completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed()).count()
    }

    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            run_id: self.run_id.clone(),
            project_root: self.project_root.clone(),
            total_stages: self.total_stages,
            elapsed_secs: self.elapsed.as_secs_f64(),
            tasks: self.tasks.len(),
            completed: self.completed(),
            skipped: self.skipped,
            failed: self.failed,
            dropped_lines: self.dropped_lines,
            tokens_used: self.tokens_used,
            files_written: self.files_written.len(),
            files_failed: self.files_failed.len(),
        }
    }
}

/// Counts-only view of a finished build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub run_id: String,
    pub project_root: PathBuf,
    pub total_stages: usize,
    pub elapsed_secs: f64,
    pub tasks: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub dropped_lines: usize,
    pub tokens_used: u64,
    pub files_written: usize,
    pub files_failed: usize,
}
