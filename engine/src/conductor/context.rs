//! Context Builder
//!
//! Summarizes completed tasks so the next specialist sees what came before.

use crate::conductor::types::Task;

/// Characters of each prior result kept in the summary
pub const RESULT_PREVIEW_CHARS: usize = 200;

const HEADER: &str = "Previous task results:";

/// Build the context string from tasks that ran earlier in this build.
///
/// Returns an empty string when none of them completed.
pub fn build_context(previous_tasks: &[Task]) -> String {
    let lines: Vec<String> = previous_tasks
        .iter()
        .filter_map(|task| {
            task.result().map(|result| {
                format!(
                    "- {} ({}): {}",
                    task.description,
                    task.role,
                    truncate(&result.content, RESULT_PREVIEW_CHARS)
                )
            })
        })
        .collect();

    if lines.is_empty() {
        return String::new();
    }

    format!("{}\n{}", HEADER, lines.join("\n"))
}

/// Keep the first `max_chars` characters, appending `...` when anything was cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
