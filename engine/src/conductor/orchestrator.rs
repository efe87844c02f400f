//! Build Orchestrator
//!
//! Runs one build end to end: scaffold the project, ask the planner for a
//! numbered plan, then hand each task to its specialist in order. Each
//! successful response is mined for annotated code blocks, which are
//! written under the project root.
//!
//! The task loop is a fold into [`BuildReport`]. Only the scaffold and
//! planning steps can abort a build; everything after that is best-effort.

use crate::agents::AgentRegistry;
use crate::conductor::context::build_context;
use crate::conductor::planner::{parse_plan, planning_prompt, stage_name};
use crate::conductor::progress::{BuildEvent, ProgressSink};
use crate::conductor::types::{BuildReport, FileFailure, Task};
use crate::conductor::BuildError;
use crate::secrets::scrub;
use crate::tools::{extract_code_blocks, ProjectWriter};
use sdk::types::{AgentResponse, Role};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

const STRUCTURE_STAGE: &str = "Creating project structure";
const PLANNING_STAGE: &str = "Planning project";

pub struct BuildOrchestrator {
    registry: AgentRegistry,
    writer: ProjectWriter,
    progress: Arc<dyn ProgressSink>,
}

impl BuildOrchestrator {
    pub fn new(
        registry: AgentRegistry,
        writer: ProjectWriter,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            registry,
            writer,
            progress,
        }
    }

    /// Run the whole pipeline for `description`.
    pub async fn execute_build(&self, description: &str) -> Result<BuildReport, BuildError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(BuildError::EmptyDescription);
        }

        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("build", run_id = %run_id);
        self.run(run_id, description).instrument(span).await
    }

    async fn run(&self, run_id: String, description: &str) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let mut report = BuildReport::new(run_id, description, self.writer.root().to_path_buf());

        info!(description, root = %self.writer.root().display(), "Starting build");
        self.progress.emit(&BuildEvent::Started {
            run_id: report.run_id.clone(),
            description: description.to_string(),
            project_root: report.project_root.clone(),
        });

        // Stage 1
        self.stage_started(1, None, STRUCTURE_STAGE);
        self.writer
            .create_project_structure()
            .await
            .map_err(BuildError::ProjectStructure)?;
        self.stage_completed(1, None, STRUCTURE_STAGE, started);

        // Stage 2
        self.stage_started(2, None, PLANNING_STAGE);
        let plan_text = self.acquire_plan(description).await?;
        let plan = parse_plan(&plan_text);
        if plan.dropped > 0 {
            warn!(dropped = plan.dropped, "Plan lines referenced unknown agents");
        }
        if plan.tasks.is_empty() {
            return Err(BuildError::NoTasks);
        }
        report.dropped_lines = plan.dropped;
        report.total_stages = plan.tasks.len() + 2;
        let total = Some(report.total_stages);
        self.stage_completed(2, total, PLANNING_STAGE, started);
        info!(tasks = plan.tasks.len(), "Plan parsed");

        for (i, task) in plan.tasks.into_iter().enumerate() {
            report = self.run_task(report, task, i + 3, started).await;
        }

        report.elapsed = started.elapsed();
        let summary = report.summary();
        info!(
            completed = summary.completed,
            skipped = summary.skipped,
            failed = summary.failed,
            files = summary.files_written,
            "Build finished"
        );
        self.progress.emit(&BuildEvent::Finished { summary });

        Ok(report)
    }

    async fn acquire_plan(&self, description: &str) -> Result<String, BuildError> {
        let planner = self
            .registry
            .resolve(Role::Planner)
            .map_err(BuildError::PlannerUnavailable)?;

        let prompt = planning_prompt(description);
        debug!(prompt_chars = prompt.chars().count(), "Requesting plan");

        let response = planner.process("", &prompt).await.map_err(|e| {
            warn!("Planning failed: {}", scrub(&e.to_string()));
            BuildError::Planning(e)
        })?;

        Ok(response.content)
    }

    /// One step of the fold: the task is always appended to the report,
    /// completed or left pending.
    async fn run_task(
        &self,
        mut report: BuildReport,
        mut task: Task,
        stage: usize,
        started: Instant,
    ) -> BuildReport {
        let total = Some(report.total_stages);
        let name = stage_name(&task);
        let span = tracing::info_span!("task", task_id = %task.id, role = %task.role);

        async move {
            self.stage_started(stage, total, &name);

            let specialist = match self.registry.resolve(task.role) {
                Ok(specialist) => specialist,
                Err(e) => {
                    warn!("Skipping task: {}", e);
                    self.progress.emit(&BuildEvent::TaskSkipped {
                        task_id: task.id.clone(),
                        role: task.role,
                        reason: e.to_string(),
                    });
                    report.skipped += 1;
                    report.tasks.push(task);
                    return report;
                }
            };

            let context = build_context(&report.tasks);
            debug!(context_chars = context.chars().count(), "Invoking specialist");

            match specialist.process(&context, &task.description).await {
                Ok(response) => {
                    report.tokens_used += u64::from(response.tokens_used);
                    self.materialize(&mut report, &response).await;
                    task.complete(response);
                    self.stage_completed(stage, total, &name, started);
                }
                Err(e) => {
                    let error = scrub(&e.to_string());
                    warn!("Task failed: {}", error);
                    self.progress.emit(&BuildEvent::TaskFailed {
                        task_id: task.id.clone(),
                        role: task.role,
                        error,
                    });
                    report.failed += 1;
                }
            }

            report.tasks.push(task);
            report
        }
        .instrument(span)
        .await
    }

    /// Write every annotated code block in the response. Failures are
    /// recorded per file.
    async fn materialize(&self, report: &mut BuildReport, response: &AgentResponse) {
        for (path, content) in extract_code_blocks(&response.content) {
            if content.trim().is_empty() {
                debug!(path = %path, "Skipping empty code block");
                continue;
            }

            match self.writer.write_file(&path, &content).await {
                Ok(written) => {
                    self.progress.emit(&BuildEvent::FileWritten {
                        path: written.clone(),
                    });
                    report.files_written.push(written);
                }
                Err(e) => {
                    warn!(path = %path, "Failed to write file: {}", e);
                    self.progress.emit(&BuildEvent::FileFailed {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                    report.files_failed.push(FileFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    fn stage_started(&self, stage: usize, total: Option<usize>, name: &str) {
        info!(stage, "{}", name);
        self.progress.emit(&BuildEvent::StageStarted {
            stage,
            total,
            name: name.to_string(),
        });
    }

    fn stage_completed(&self, stage: usize, total: Option<usize>, name: &str, started: Instant) {
        self.progress.emit(&BuildEvent::StageCompleted {
            stage,
            total,
            name: name.to_string(),
            elapsed_secs: started.elapsed().as_secs_f64(),
        });
    }
}
