use devcrew_engine::conductor::context::{build_context, truncate, RESULT_PREVIEW_CHARS};
use devcrew_engine::conductor::planner::{parse_plan, sanitize_description};
use devcrew_engine::conductor::Task;
use devcrew_engine::tools::filesystem::normalize_relative;
use proptest::prelude::*;
use sdk::types::{AgentResponse, Role};

fn role_token() -> impl Strategy<Value = (Role, &'static str)> {
    prop_oneof![
        Just((Role::Planner, "PLANNER")),
        Just((Role::Frontend, "frontend")),
        Just((Role::Backend, "Backend")),
        Just((Role::Security, "SECURITY")),
    ]
}

proptest! {
    #[test]
    fn test_well_formed_lines_parse(
        n in 1u32..1000,
        (role, token) in role_token(),
        bold in any::<bool>(),
        description in "[A-Za-z]([A-Za-z0-9 ,()]{0,60}[A-Za-z0-9)])?",
        trailing in prop_oneof![Just(""), Just("."), Just(":")],
    ) {
        let tag = if bold {
            format!("**[{}]**", token)
        } else {
            format!("[{}]", token)
        };
        let line = format!("{}. {} {}{}", n, tag, description, trailing);

        let plan = parse_plan(&line);
        prop_assert_eq!(plan.tasks.len(), 1);
        prop_assert_eq!(plan.tasks[0].role, role);
        prop_assert_eq!(&plan.tasks[0].description, &sanitize_description(&description));
        prop_assert_eq!(plan.tasks[0].id.as_str(), "task_1");
    }

    #[test]
    fn test_ids_contiguous_despite_unknown_roles(
        known in proptest::collection::vec(any::<bool>(), 1..20),
    ) {
        let text: String = known
            .iter()
            .enumerate()
            .map(|(i, ok)| {
                let role = if *ok { "BACKEND" } else { "MYSTERY" };
                format!("{}. [{}] Step {}\n", i + 1, role, i)
            })
            .collect();

        let plan = parse_plan(&text);
        let expected = known.iter().filter(|ok| **ok).count();
        prop_assert_eq!(plan.tasks.len(), expected);
        prop_assert_eq!(plan.dropped, known.len() - expected);
        for (i, task) in plan.tasks.iter().enumerate() {
            prop_assert_eq!(&task.id, &format!("task_{}", i + 1));
        }
    }

    #[test]
    fn test_unnumbered_text_has_no_tasks(text in "[^0-9]*") {
        prop_assert!(parse_plan(&text).tasks.is_empty());
    }

    #[test]
    fn test_truncate_bounds(text in "\\PC{0,400}") {
        let cut = truncate(&text, RESULT_PREVIEW_CHARS);
        let len = text.chars().count();
        if len <= RESULT_PREVIEW_CHARS {
            prop_assert_eq!(cut, text);
        } else {
            prop_assert!(cut.ends_with("..."));
            prop_assert_eq!(cut.chars().count(), RESULT_PREVIEW_CHARS + 3);
            prop_assert!(text.starts_with(&cut[..cut.len() - 3]));
        }
    }

    #[test]
    fn test_context_lines_match_completed_tasks(
        completed in proptest::collection::vec(any::<bool>(), 0..10),
    ) {
        let tasks: Vec<Task> = completed
            .iter()
            .enumerate()
            .map(|(i, done)| {
                let mut task = Task::new(i + 1, Role::Backend, format!("step {}", i));
                if *done {
                    task.complete(AgentResponse::new("result", 1, "m"));
                }
                task
            })
            .collect();

        let context = build_context(&tasks);
        let done = completed.iter().filter(|d| **d).count();
        if done == 0 {
            prop_assert_eq!(context, "");
        } else {
            prop_assert_eq!(context.lines().count(), done + 1);
            prop_assert!(context.starts_with("Previous task results:\n"));
        }
    }

    #[test]
    fn test_parent_escape_always_rejected(
        depth in 1usize..5,
        name in "[a-z]{1,8}\\.js",
    ) {
        let path = format!("{}{}", "../".repeat(depth), name);
        prop_assert!(normalize_relative(&path).is_err());
        let absolute = format!("/{}", name);
        prop_assert!(normalize_relative(&absolute).is_err());
    }
}
