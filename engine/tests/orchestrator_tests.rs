//! End-to-end builds against scripted specialists

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use devcrew_engine::agents::{profile, AgentProfile, AgentRegistry, Specialist};
use devcrew_engine::conductor::{
    BuildError, BuildEvent, BuildOrchestrator, ProgressSink, RecordingSink, TaskStatus,
};
use devcrew_engine::llm::LLMError;
use devcrew_engine::tools::ProjectWriter;
use sdk::types::{AgentResponse, Role};

/// Answers every request with the same text, or fails
struct Scripted {
    profile: &'static AgentProfile,
    reply: Option<String>,
    seen: Mutex<Vec<(String, String)>>,
}

impl Scripted {
    fn ok(role: Role, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            profile: profile(role),
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(role: Role) -> Arc<Self> {
        Arc::new(Self {
            profile: profile(role),
            reply: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Specialist for Scripted {
    fn profile(&self) -> &AgentProfile {
        self.profile
    }

    async fn process(&self, context: &str, request: &str) -> Result<AgentResponse, LLMError> {
        self.seen
            .lock()
            .unwrap()
            .push((context.to_string(), request.to_string()));

        match &self.reply {
            Some(text) => Ok(AgentResponse::new(text.clone(), 10, "scripted-model")),
            None => Err(LLMError::NetworkError(
                "connection reset, key gsk_abcdefghijklmnopqrstuvwxyz".to_string(),
            )),
        }
    }
}

fn orchestrator(
    root: &Path,
    specialists: &[Arc<Scripted>],
) -> (BuildOrchestrator, Arc<RecordingSink>) {
    let mut registry = AgentRegistry::new();
    for s in specialists {
        registry.register(Arc::clone(s) as Arc<dyn Specialist>);
    }
    let sink = Arc::new(RecordingSink::new());
    let progress: Arc<dyn ProgressSink> = sink.clone();
    let orchestrator = BuildOrchestrator::new(
        registry,
        ProjectWriter::new(root.join("generated-project")),
        progress,
    );
    (orchestrator, sink)
}

#[tokio::test]
async fn test_two_task_build_passes_context_forward() {
    let dir = tempfile::tempdir().unwrap();
    let planner = Scripted::ok(
        Role::Planner,
        "Here is the plan:\n1. [BACKEND] Create todo API\n2. [FRONTEND] Build todo UI\n",
    );
    let backend = Scripted::ok(Role::Backend, "API done");
    let frontend = Scripted::ok(Role::Frontend, "UI done");
    let (orchestrator, sink) = orchestrator(
        dir.path(),
        &[planner.clone(), backend.clone(), frontend.clone()],
    );

    let report = orchestrator.execute_build("a todo app").await.unwrap();

    let ids: Vec<&str> = report.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["task_1", "task_2"]);
    assert_eq!(report.tasks[0].role, Role::Backend);
    assert_eq!(report.tasks[1].role, Role::Frontend);
    assert!(report.tasks.iter().all(|t| t.is_completed()));
    assert_eq!(report.total_stages, 4);
    assert_eq!(report.tokens_used, 30);

    // Planner sees the fixed prompt with no context
    let planner_calls = planner.calls();
    assert_eq!(planner_calls.len(), 1);
    assert_eq!(planner_calls[0].0, "");
    assert!(planner_calls[0]
        .1
        .starts_with("Create a detailed execution plan for: \"a todo app\""));

    assert_eq!(backend.calls()[0], (String::new(), "Create todo API".to_string()));
    assert_eq!(
        frontend.calls()[0],
        (
            "Previous task results:\n- Create todo API (backend): API done".to_string(),
            "Build todo UI".to_string()
        )
    );

    let stages: Vec<usize> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            BuildEvent::StageCompleted { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(stages, vec![1, 2, 3, 4]);
    assert!(matches!(
        sink.events().last(),
        Some(BuildEvent::Finished { summary }) if summary.completed == 2
    ));
}

#[tokio::test]
async fn test_unknown_roles_only_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let planner = Scripted::ok(Role::Planner, "3. [UNKNOWN_ROLE] Do something");
    let (orchestrator, _) = orchestrator(dir.path(), &[planner]);

    let err = orchestrator.execute_build("anything").await.unwrap_err();
    assert!(matches!(err, BuildError::NoTasks));
    assert_eq!(err.to_string(), "no executable tasks found in plan");
}

#[tokio::test]
async fn test_only_annotated_blocks_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let planner = Scripted::ok(Role::Planner, "1. [BACKEND] Create server");
    let backend = Scripted::ok(
        Role::Backend,
        "Server:\n```javascript\n// filename: src/server.js\nconst app = express();\n```\n\
         And a snippet:\n```javascript\nconsole.log('no name');\n```\n",
    );
    let (orchestrator, sink) = orchestrator(dir.path(), &[planner, backend]);

    let report = orchestrator.execute_build("an express server").await.unwrap();

    let root = dir.path().join("generated-project");
    assert_eq!(report.files_written, vec![root.join("src/server.js")]);
    assert_eq!(
        std::fs::read_to_string(root.join("src/server.js")).unwrap(),
        "const app = express();\n"
    );
    assert!(root.join("docs").is_dir());

    let written = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, BuildEvent::FileWritten { .. }))
        .count();
    assert_eq!(written, 1);
}

#[tokio::test]
async fn test_missing_specialist_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let planner = Scripted::ok(
        Role::Planner,
        "1. [SECURITY] Audit auth\n2. [FRONTEND] Build login form",
    );
    let frontend = Scripted::ok(Role::Frontend, "form done");
    let (orchestrator, sink) = orchestrator(dir.path(), &[planner, frontend.clone()]);

    let report = orchestrator.execute_build("a login page").await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.tasks[0].status, TaskStatus::Pending);
    assert!(report.tasks[1].is_completed());
    // A skipped task contributes nothing to later context
    assert_eq!(frontend.calls()[0].0, "");
    assert!(sink.events().iter().any(|e| matches!(
        e,
        BuildEvent::TaskSkipped { task_id, role: Role::Security, .. } if task_id == "task_1"
    )));
}

#[tokio::test]
async fn test_failed_call_leaves_task_pending_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let planner = Scripted::ok(
        Role::Planner,
        "1. [BACKEND] Create API\n2. [FRONTEND] Build UI\n3. [BACKEND] Add tests",
    );
    let backend = Scripted::failing(Role::Backend);
    let frontend = Scripted::ok(Role::Frontend, "UI done");
    let (orchestrator, sink) =
        orchestrator(dir.path(), &[planner, backend.clone(), frontend.clone()]);

    let report = orchestrator.execute_build("a todo app").await.unwrap();

    assert_eq!(report.failed, 2);
    assert_eq!(report.completed(), 1);
    assert_eq!(backend.calls().len(), 2);

    // Task 3 sees the frontend result, not the failed task 1
    assert_eq!(
        backend.calls()[1].0,
        "Previous task results:\n- Build UI (frontend): UI done"
    );

    let failure = sink
        .events()
        .into_iter()
        .find_map(|e| match e {
            BuildEvent::TaskFailed { error, .. } => Some(error),
            _ => None,
        })
        .unwrap();
    assert!(failure.contains("[REDACTED]"));
}

#[tokio::test]
async fn test_escaping_and_empty_blocks_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let planner = Scripted::ok(Role::Planner, "1. [BACKEND] Write files");
    let backend = Scripted::ok(
        Role::Backend,
        "```js\n// filename: ../evil.js\nboom();\n```\n\
         ```js\n// filename: src/empty.js\n   \n```\n\
         ```js\n// filename: src/ok.js\nok();\n```\n",
    );
    let (orchestrator, _) = orchestrator(dir.path(), &[planner, backend]);

    let report = orchestrator.execute_build("files").await.unwrap();

    assert_eq!(report.files_written.len(), 1);
    assert_eq!(report.files_failed.len(), 1);
    assert_eq!(report.files_failed[0].path, "../evil.js");
    assert!(!dir.path().join("evil.js").exists());
    assert!(!dir.path().join("generated-project/src/empty.js").exists());
    assert!(report.tasks[0].is_completed());
}

#[tokio::test]
async fn test_planner_problems_are_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let (orchestrator_without_planner, _) =
        orchestrator(dir.path(), &[Scripted::ok(Role::Backend, "x")]);
    let err = orchestrator_without_planner
        .execute_build("a todo app")
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::PlannerUnavailable(_)));

    let (orchestrator_failing, _) = orchestrator(dir.path(), &[Scripted::failing(Role::Planner)]);
    let err = orchestrator_failing.execute_build("a todo app").await.unwrap_err();
    assert!(matches!(err, BuildError::Planning(LLMError::NetworkError(_))));
}

#[tokio::test]
async fn test_blank_description_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, sink) = orchestrator(dir.path(), &[]);

    let err = orchestrator.execute_build("   ").await.unwrap_err();
    assert!(matches!(err, BuildError::EmptyDescription));
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_unwritable_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("generated-project"), "not a directory").unwrap();
    let (orchestrator, _) = orchestrator(dir.path(), &[Scripted::ok(Role::Planner, "")]);

    let err = orchestrator.execute_build("a todo app").await.unwrap_err();
    assert!(matches!(err, BuildError::ProjectStructure(_)));
}

#[tokio::test]
async fn test_dropped_lines_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let planner = Scripted::ok(
        Role::Planner,
        "1. [DEVOPS] Deploy\n2. [BACKEND] Create API\n3. [QA] Test it",
    );
    let (orchestrator, _) = orchestrator(
        dir.path(),
        &[planner, Scripted::ok(Role::Backend, "done")],
    );

    let report = orchestrator.execute_build("an api").await.unwrap();
    assert_eq!(report.dropped_lines, 2);
    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.tasks[0].id, "task_1");
    assert_eq!(report.total_stages, 3);
}
