//! Comment groups and their documentation text.

/// A sequence of comments with no blank line or other token between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    /// Raw comments, `//` or `/* */` markers included.
    pub comments: Vec<String>,
}

impl CommentGroup {
    pub fn new(comments: Vec<String>) -> Self {
        Self { comments }
    }

    /// Documentation text of the group.
    ///
    /// Comment markers and the first space after `//` are removed, directive
    /// comments such as `//go:generate` are dropped, trailing whitespace is
    /// trimmed, leading blank lines are removed and runs of blank lines are
    /// collapsed. Non-empty text always ends with a newline.
    pub fn text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for comment in &self.comments {
            let body = if let Some(rest) = comment.strip_prefix("//") {
                if let Some(rest) = rest.strip_prefix(' ') {
                    rest
                } else if is_directive(rest) {
                    continue;
                } else {
                    rest
                }
            } else if let Some(rest) = comment.strip_prefix("/*") {
                rest.strip_suffix("*/").unwrap_or(rest)
            } else {
                comment.as_str()
            };

            lines.extend(body.split('\n').map(|line| line.trim_end().to_string()));
        }

        let mut kept: Vec<String> = Vec::with_capacity(lines.len() + 1);
        for line in lines {
            let previous_blank = kept.last().is_none_or(|last| last.is_empty());
            if !line.is_empty() || !previous_blank {
                kept.push(line);
            }
        }

        if kept.last().is_some_and(|last| !last.is_empty()) {
            kept.push(String::new());
        }
        kept.join("\n")
    }
}

/// Text of an optional group, empty when absent.
pub fn text_of(group: Option<&CommentGroup>) -> String {
    group.map(CommentGroup::text).unwrap_or_default()
}

/// Tool directives: `//line `, `//extern `, `//export ` and `//tool:args`.
fn is_directive(text: &str) -> bool {
    if text.starts_with("line ") || text.starts_with("extern ") || text.starts_with("export ") {
        return true;
    }

    let Some(colon) = text.find(':') else {
        return false;
    };
    if colon == 0 || colon + 1 >= text.len() {
        return false;
    }

    text.bytes()
        .take(colon + 2)
        .enumerate()
        .filter(|(idx, _)| *idx != colon)
        .all(|(_, b)| b.is_ascii_lowercase() || b.is_ascii_digit())
}
