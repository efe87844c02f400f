//! Code block extraction
//!
//! Pulls fenced code blocks out of an agent response and pairs each with the
//! file path the agent gave it. A path is discovered, in order, from:
//!
//! 1. the fence info string: ` ```rust src/main.rs ` or ` ```filename=src/main.rs `
//! 2. a marker comment on the first content line: `// filename: x`, `# filename: x`,
//!    `<!-- filename: x -->`, `/* filename: x */`, `-- filename: x` (`file:` also works)
//! 3. a heading, bold or code-span line right before the fence: `### src/app.js`,
//!    `**src/app.js**`, `` `src/app.js` ``
//!
//! Blocks with no discoverable path are dropped. Marker lines are not written.
//! A fence with an info string inside a block nests, so a markdown file may
//! quote its own fenced snippets.

const FENCE: &str = "```";

/// Insertion-ordered `path -> content` map produced by [`extract_code_blocks`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeBlocks {
    entries: Vec<(String, String)>,
}

impl CodeBlocks {
    pub fn insert(&mut self, path: String, content: String) {
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = content,
            None => self.entries.push((path, content)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}

impl IntoIterator for CodeBlocks {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Extract `path -> content` pairs in first-seen order.
///
/// A later block for an already-seen path replaces the earlier content but
/// keeps its position.
pub fn extract_code_blocks(text: &str) -> CodeBlocks {
    let mut blocks = CodeBlocks::default();
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim_start();
        let Some(info) = trimmed.strip_prefix(FENCE) else {
            i += 1;
            continue;
        };

        let Some(close) = closing_fence(&lines, i + 1) else {
            // Unterminated fence: nothing after it can be trusted
            break;
        };

        let mut body = &lines[i + 1..close];
        let marker = body.first().and_then(|line| marker_filename(line));
        if marker.is_some() {
            body = &body[1..];
        }

        let path = info_filename(info)
            .or(marker)
            .or_else(|| preceding_filename(&lines[..i]));

        match path {
            Some(path) => {
                let mut content = body.join("\n");
                if !content.is_empty() {
                    content.push('\n');
                }
                blocks.insert(path, content);
            }
            None => tracing::debug!(line = i + 1, "Dropping code block without filename"),
        }

        i = close + 1;
    }

    blocks
}

/// Index of the bare fence that closes the block opened before `start`.
///
/// A fence with an info string inside the block opens a nested block (a
/// README quoting a shell snippet), and the next bare fence closes it.
fn closing_fence(lines: &[&str], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, line) in lines.iter().enumerate().skip(start) {
        let Some(info) = line.trim().strip_prefix(FENCE) else {
            continue;
        };
        if !info.trim().is_empty() {
            depth += 1;
        } else if depth == 0 {
            return Some(j);
        } else {
            depth -= 1;
        }
    }
    None
}

/// Filename carried by the fence info string.
fn info_filename(info: &str) -> Option<String> {
    for (idx, token) in info.split_whitespace().enumerate() {
        for key in ["filename=", "file="] {
            if let Some(value) = strip_prefix_ignore_case(token, key) {
                return clean_path(value);
            }
        }

        // The first token is a language tag unless it is clearly a path
        if (idx > 0 || token.contains('/')) && looks_like_path(token) {
            return clean_path(token);
        }
    }
    None
}

/// Filename from a `filename:` marker comment.
fn marker_filename(line: &str) -> Option<String> {
    let line = line.trim();
    let (inner, closer) = if let Some(rest) = line.strip_prefix("<!--") {
        (rest, Some("-->"))
    } else if let Some(rest) = line.strip_prefix("/*") {
        (rest, Some("*/"))
    } else if let Some(rest) = line.strip_prefix("//") {
        (rest, None)
    } else if let Some(rest) = line.strip_prefix("--") {
        (rest, None)
    } else if let Some(rest) = line.strip_prefix('#') {
        (rest, None)
    } else {
        return None;
    };

    let mut inner = inner.trim();
    if let Some(closer) = closer {
        inner = inner.strip_suffix(closer).unwrap_or(inner).trim();
    }

    let value = strip_prefix_ignore_case(inner, "filename:")
        .or_else(|| strip_prefix_ignore_case(inner, "file:"))?;

    clean_path(value).filter(|p| looks_like_path(p))
}

/// Filename from the heading, bold or code-span line just above a fence.
fn preceding_filename(before: &[&str]) -> Option<String> {
    let line = before.iter().rev().find(|l| !l.trim().is_empty())?.trim();

    let decorated = line.starts_with('#') || line.starts_with("**") || line.starts_with('`');
    if !decorated {
        return None;
    }

    let mut text = strip_decoration(line.trim_start_matches('#'));
    for label in ["filename:", "file:"] {
        if let Some(rest) = strip_prefix_ignore_case(text, label) {
            text = strip_decoration(rest);
        }
    }

    if text.contains(char::is_whitespace) || !looks_like_path(text) {
        return None;
    }
    clean_path(text)
}

/// Drop markdown emphasis, code spans and trailing colons from both ends,
/// in any nesting order: `` **`src/app.js`**: `` becomes `src/app.js`.
fn strip_decoration(s: &str) -> &str {
    s.trim_matches(|c: char| c == '*' || c == '`' || c == ':' || c.is_whitespace())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn looks_like_path(s: &str) -> bool {
    !s.is_empty()
        && !s.contains(char::is_whitespace)
        && (s.contains('.') || s.contains('/'))
        && s.chars().any(|c| c.is_alphanumeric())
        && !s.ends_with('/')
}

fn clean_path(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
