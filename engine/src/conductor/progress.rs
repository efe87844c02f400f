//! Build progress events
//!
//! The orchestrator never prints. It emits [`BuildEvent`]s to a
//! [`ProgressSink`]; the CLI picks a colored terminal renderer or a
//! line-per-event JSON renderer.

use crate::conductor::types::BuildSummary;
use colored::Colorize;
use sdk::types::Role;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BuildEvent {
    Started {
        run_id: String,
        description: String,
        project_root: PathBuf,
    },
    /// `total` is unknown until the plan has been parsed
    StageStarted {
        stage: usize,
        total: Option<usize>,
        name: String,
    },
    StageCompleted {
        stage: usize,
        total: Option<usize>,
        name: String,
        elapsed_secs: f64,
    },
    TaskSkipped {
        task_id: String,
        role: Role,
        reason: String,
    },
    TaskFailed {
        task_id: String,
        role: Role,
        error: String,
    },
    FileWritten {
        path: PathBuf,
    },
    FileFailed {
        path: String,
        error: String,
    },
    Finished {
        summary: BuildSummary,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &BuildEvent);
}

/// Keeps every event, for assertions
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BuildEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: &BuildEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// One JSON object per line on stdout
pub struct JsonReporter;

impl ProgressSink for JsonReporter {
    fn emit(&self, event: &BuildEvent) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Failed to serialize progress event: {}", e),
        }
    }
}

/// Colored human-readable output
pub struct TerminalReporter;

impl TerminalReporter {
    fn bar(stage: usize, total: usize) -> String {
        let filled = (stage * 20 / total.max(1)).min(20);
        format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
    }

    fn counter(stage: usize, total: Option<usize>) -> String {
        match total {
            Some(total) => format!("{}/{}", stage, total),
            None => stage.to_string(),
        }
    }

    fn finished(summary: &BuildSummary) {
        let rule = "═".repeat(60);
        println!();
        println!("{}", rule);
        if summary.completed == summary.tasks {
            println!("{}", "🎉 BUILD COMPLETED".green().bold());
        } else {
            println!("{}", "🎉 BUILD COMPLETED WITH WARNINGS".yellow().bold());
        }
        println!("{}", rule);
        println!("📊 Total stages: {}", summary.total_stages);
        println!(
            "✅ Tasks: {} completed, {} skipped, {} failed (of {})",
            summary.completed, summary.skipped, summary.failed, summary.tasks
        );
        if summary.dropped_lines > 0 {
            println!("🚫 Plan lines with unknown agents: {}", summary.dropped_lines);
        }
        println!(
            "📄 Files: {} written, {} failed",
            summary.files_written, summary.files_failed
        );
        println!("🔢 Tokens used: {}", summary.tokens_used);
        println!("⏱️  Total time: {:.0}s", summary.elapsed_secs);
        println!("📁 Project location: {}", summary.project_root.display());
        println!();
        println!("{}", "Manual setup required:".cyan());
        println!("  cd {}", summary.project_root.display());
        println!("  # install dependencies and start the app as the generated README describes");
        println!();
        println!("💡 devcrew only generates files - you must run setup commands manually");
    }
}

impl ProgressSink for TerminalReporter {
    fn emit(&self, event: &BuildEvent) {
        match event {
            BuildEvent::Started { description, .. } => {
                println!("🚀 Building: {}\n", description.bold());
            }
            BuildEvent::StageStarted { stage, total, name } => {
                let bar = total
                    .map(|t| format!(" [{}]", Self::bar(*stage, t)))
                    .unwrap_or_default();
                println!(
                    "{}{}",
                    format!("🔄 Stage {}: {}", Self::counter(*stage, *total), name)
                        .cyan()
                        .bold(),
                    bar
                );
            }
            BuildEvent::StageCompleted {
                stage,
                total,
                name,
                elapsed_secs,
            } => {
                println!(
                    "{}",
                    format!(
                        "✅ Stage {}: {} completed (⏱️ {:.0}s)",
                        Self::counter(*stage, *total),
                        name,
                        elapsed_secs
                    )
                    .green()
                    .bold()
                );
            }
            BuildEvent::TaskSkipped { task_id, role, reason } => {
                println!(
                    "{}",
                    format!("⚠️  Skipping {} - agent {} not available: {}", task_id, role, reason)
                        .yellow()
                        .bold()
                );
            }
            BuildEvent::TaskFailed { task_id, role, error } => {
                println!(
                    "{}",
                    format!("❌ Task {} ({}) failed: {}", task_id, role, error)
                        .red()
                        .bold()
                );
            }
            BuildEvent::FileWritten { path } => {
                println!("   {} {}", "📄".dimmed(), path.display());
            }
            BuildEvent::FileFailed { path, error } => {
                println!(
                    "{}",
                    format!("⚠️  Failed to write {}: {}", path, error).yellow()
                );
            }
            BuildEvent::Finished { summary } => Self::finished(summary),
        }
    }
}
