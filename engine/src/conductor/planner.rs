//! Conductor Planner
//!
//! Builds the planning prompt and turns the planner's numbered list into
//! [`Task`]s. Recognised lines look like
//!
//! ```text
//! 1. [BACKEND] Create REST API endpoints
//! 2. **[FRONTEND]** Build the login form (depends on task 1)
//! ```
//!
//! Parsing is a single pass over the lines with no regex engine. Lines that
//! do not match are ignored; matching lines with an unknown role are dropped
//! and counted.

use crate::conductor::types::{ParsedPlan, Task};
use sdk::types::Role;

/// Prompt sent to the planner for a build request
pub fn planning_prompt(description: &str) -> String {
    format!(
        r#"Create a detailed execution plan for: "{}"

Please structure your response as a numbered list of tasks that can be executed by specialized agents.
For each task, specify:
1. The task description
2. Which agent should handle it (backend, frontend, security, etc.)
3. Any dependencies on other tasks

Format your response like this:
1. [AGENT_TYPE] Task description
2. [AGENT_TYPE] Task description (depends on task 1)
...

Available agents: backend, frontend, security, planner
Focus on creating actionable, specific tasks that agents can execute independently.
When providing code, use proper code blocks with filenames where possible."#,
        description
    )
}

/// Classification of one plan line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanLine<'a> {
    Task { role: Role, description: String },
    UnknownRole(&'a str),
    NoMatch,
}

/// Parse planner output into an ordered task list.
pub fn parse_plan(plan_text: &str) -> ParsedPlan {
    let mut plan = ParsedPlan::default();

    for line in plan_text.lines() {
        match scan_line(line) {
            PlanLine::Task { role, description } => {
                let n = plan.tasks.len() + 1;
                plan.tasks.push(Task::new(n, role, description));
            }
            PlanLine::UnknownRole(token) => {
                tracing::warn!(role = token, "Dropping plan line with unknown agent");
                plan.dropped += 1;
            }
            PlanLine::NoMatch => {}
        }
    }

    plan
}

/// Scan a single line: `<digits>. [*[*]][ROLE][*[*]] <description>`
pub fn scan_line(line: &str) -> PlanLine<'_> {
    let line = line.trim();

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return PlanLine::NoMatch;
    }
    let Some(rest) = line[digits..].strip_prefix('.') else {
        return PlanLine::NoMatch;
    };

    let rest = skip_stars(rest.trim_start());
    let Some(rest) = rest.strip_prefix('[') else {
        return PlanLine::NoMatch;
    };

    let token_len = rest.len() - rest.trim_start_matches(is_word_char).len();
    if token_len == 0 {
        return PlanLine::NoMatch;
    }
    let (token, rest) = rest.split_at(token_len);
    let Some(rest) = rest.strip_prefix(']') else {
        return PlanLine::NoMatch;
    };

    let Some(description) = take_description(skip_stars(rest).trim_start()) else {
        return PlanLine::NoMatch;
    };

    match Role::from_token(token) {
        Some(role) => PlanLine::Task { role, description },
        None => PlanLine::UnknownRole(token),
    }
}

/// Trim, then drop one trailing `.` and then one trailing `:`.
pub fn sanitize_description(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(':').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Progress label for a task: role plus the first 40 characters of its description
pub fn stage_name(task: &Task) -> String {
    let short: String = task.description.chars().take(40).collect();
    format!("{}: {}", task.role, short)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Up to two `*`, each optional
fn skip_stars(s: &str) -> &str {
    let s = s.strip_prefix('*').unwrap_or(s);
    s.strip_prefix('*').unwrap_or(s)
}

/// Text up to a code fence or end of line. The first character always
/// belongs to the description.
fn take_description(s: &str) -> Option<String> {
    let first = s.chars().next()?;
    let search_from = first.len_utf8();
    let end = s[search_from..]
        .find("```")
        .map(|i| i + search_from)
        .unwrap_or(s.len());

    let description = sanitize_description(&s[..end]);
    if description.is_empty() {
        None
    } else {
        Some(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(line: &str) -> (Role, String) {
        match scan_line(line) {
            PlanLine::Task { role, description } => (role, description),
            other => panic!("expected task, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_line() {
        assert_eq!(
            task("1. [BACKEND] Create todo API"),
            (Role::Backend, "Create todo API".to_string())
        );
    }

    #[test]
    fn test_bold_and_case() {
        assert_eq!(
            task("12. **[Frontend]** Build todo UI."),
            (Role::Frontend, "Build todo UI".to_string())
        );
        assert_eq!(
            task("3.*[security]* Audit auth:"),
            (Role::Security, "Audit auth".to_string())
        );
    }

    #[test]
    fn test_only_one_trailing_char_trimmed() {
        assert_eq!(task("1. [BACKEND] Do it..").1, "Do it.");
        assert_eq!(task("1. [BACKEND] Steps.:").1, "Steps.");
        assert_eq!(task("1. [BACKEND] Steps:.").1, "Steps");
    }

    #[test]
    fn test_description_stops_at_fence() {
        assert_eq!(
            task("2. [BACKEND] Add server ```js const x = 1;```").1,
            "Add server"
        );
    }

    #[test]
    fn test_first_bracket_group_only() {
        let (role, description) = task("1. [BACKEND] [FRONTEND] Shared types");
        assert_eq!(role, Role::Backend);
        assert_eq!(description, "[FRONTEND] Shared types");
    }

    #[test]
    fn test_non_matching_lines() {
        assert_eq!(scan_line(""), PlanLine::NoMatch);
        assert_eq!(scan_line("Overview of the project"), PlanLine::NoMatch);
        assert_eq!(scan_line("- [BACKEND] bullet"), PlanLine::NoMatch);
        assert_eq!(scan_line("1 [BACKEND] missing dot"), PlanLine::NoMatch);
        assert_eq!(scan_line("1. BACKEND no brackets"), PlanLine::NoMatch);
        assert_eq!(scan_line("1. [] empty role"), PlanLine::NoMatch);
        assert_eq!(scan_line("1. [BACKEND]"), PlanLine::NoMatch);
        assert_eq!(scan_line("1. [BACKEND] ."), PlanLine::NoMatch);
        assert_eq!(scan_line("1. ***[BACKEND] too many stars"), PlanLine::NoMatch);
    }

    #[test]
    fn test_unknown_role() {
        assert_eq!(
            scan_line("3. [UNKNOWN_ROLE] Do something"),
            PlanLine::UnknownRole("UNKNOWN_ROLE")
        );
    }

    #[test]
    fn test_parse_plan_ids_contiguous() {
        let plan = parse_plan(
            "Overview\n\n1. [BACKEND] Create API\n2. [DEVOPS] Deploy\n3. [FRONTEND] Build UI\n",
        );
        assert_eq!(plan.dropped, 1);
        let ids: Vec<&str> = plan.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["task_1", "task_2"]);
        assert_eq!(plan.tasks[1].role, Role::Frontend);
    }

    #[test]
    fn test_parse_plan_empty_inputs() {
        assert!(parse_plan("").tasks.is_empty());
        assert!(parse_plan("no numbered lines here").tasks.is_empty());
    }

    #[test]
    fn test_dependency_text_kept_verbatim() {
        let plan = parse_plan("2. [FRONTEND] Build UI (depends on task 1)");
        assert_eq!(plan.tasks[0].description, "Build UI (depends on task 1)");
    }

    #[test]
    fn test_planning_prompt_embeds_description() {
        let prompt = planning_prompt("a todo app");
        assert!(prompt.starts_with("Create a detailed execution plan for: \"a todo app\""));
        assert!(prompt.contains("1. [AGENT_TYPE] Task description"));
        assert!(prompt.contains("Available agents: backend, frontend, security, planner"));
    }

    #[test]
    fn test_stage_name_truncates_on_char_boundary() {
        let task = Task::new(1, Role::Frontend, "é".repeat(50));
        let name = stage_name(&task);
        assert_eq!(name, format!("frontend: {}", "é".repeat(40)));
    }
}
