//! Text helpers shared by the page-context builders.

use super::state::EditorTab;

pub const TRUNCATION_MARKER: &str = "... [truncated]";

pub const CODE_LIMIT: usize = 3000;
pub const QUESTION_LIMIT: usize = 1500;
pub const OUTPUT_LIMIT: usize = 1000;
pub const SUMMARY_LIMIT: usize = 800;

/// Keeps the first `limit` characters of `text` and appends the truncation
/// marker when the text is longer than `limit`.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Removes every `<...>` span. An unclosed `<` is left in place along with
/// everything after it.
pub fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Code shown in a workspace: the active tab when the index points at one,
/// otherwise every tab under a `// Tab N` header.
pub fn editor_code(tabs: &[EditorTab], active: Option<usize>) -> Option<String> {
    if let Some(tab) = active.and_then(|index| tabs.get(index)) {
        return Some(tab.value.clone());
    }
    if tabs.is_empty() {
        return None;
    }
    let joined = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("// Tab {}\n{}", i + 1, tab.value))
        .collect::<Vec<_>>()
        .join("\n\n");
    Some(joined)
}

pub fn fenced(language: &str, code: &str) -> String {
    format!("```{language}\n{code}\n```")
}
