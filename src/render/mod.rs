//! Splits assistant replies into plain-text runs and fenced code blocks.

pub mod html;

use crate::types::ChatMessage;
use serde::Serialize;

pub const FENCE: &str = "```";
pub const DEFAULT_LANGUAGE: &str = "javascript";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplaySegment {
    Text { lines: Vec<String> },
    Code { language: String, source: String },
}

impl DisplaySegment {
    fn text(run: &str) -> Self {
        DisplaySegment::Text {
            lines: run.split('\n').map(str::to_string).collect(),
        }
    }
}

/// A segment tagged with a key that stays the same across re-renders of the
/// same message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyedSegment {
    pub key: String,
    #[serde(flatten)]
    pub segment: DisplaySegment,
}

struct Fence<'a> {
    start: usize,
    end: usize,
    language: Option<&'a str>,
    body: &'a str,
}

enum Scan {
    Outside { cursor: usize },
    Inside { opener: usize, tag_end: usize },
}

/// Finds the next complete fence at or after `from`.
fn next_fence(content: &str, from: usize) -> Option<Fence<'_>> {
    let mut scan = Scan::Outside { cursor: from };
    loop {
        scan = match scan {
            Scan::Outside { cursor } => {
                let opener = cursor + content[cursor..].find(FENCE)?;
                let after = opener + FENCE.len();
                let tag_end = content[after..]
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .map_or(content.len(), |len| after + len);
                if content[tag_end..].starts_with('\n') {
                    Scan::Inside { opener, tag_end }
                } else {
                    Scan::Outside { cursor: opener + 1 }
                }
            }
            Scan::Inside { opener, tag_end } => {
                let body_start = tag_end + 1;
                let close = body_start + content[body_start..].find(FENCE)?;
                let tag = &content[opener + FENCE.len()..tag_end];
                return Some(Fence {
                    start: opener,
                    end: close + FENCE.len(),
                    language: (!tag.is_empty()).then_some(tag),
                    body: &content[body_start..close],
                });
            }
        };
    }
}

/// Splits `content` into text and code segments, in order.
///
/// A fence is three backticks, an optional word-character language tag and a
/// newline; its body ends at the nearest following three backticks. Without a
/// closing marker the opener is plain text. One newline on each side of a
/// fence belongs to the fence.
pub fn render_message(content: &str) -> Vec<DisplaySegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    while let Some(fence) = next_fence(content, cursor) {
        push_run(&mut segments, &content[cursor..fence.start], cursor > 0, true);

        let source = fence.body.strip_suffix('\n').unwrap_or(fence.body);
        segments.push(DisplaySegment::Code {
            language: fence.language.unwrap_or(DEFAULT_LANGUAGE).to_string(),
            source: source.to_string(),
        });
        cursor = fence.end;
    }

    if segments.is_empty() {
        return vec![DisplaySegment::text(content)];
    }
    push_run(&mut segments, &content[cursor..], true, false);
    segments
}

/// Emits the text between two boundaries, dropping the newline that belongs
/// to a neighbouring fence.
fn push_run(segments: &mut Vec<DisplaySegment>, run: &str, after_fence: bool, before_fence: bool) {
    if run.is_empty() || (after_fence && before_fence && run == "\n") {
        return;
    }
    let mut run = run;
    if after_fence {
        run = run.strip_prefix('\n').unwrap_or(run);
    }
    if before_fence {
        run = run.strip_suffix('\n').unwrap_or(run);
    }
    segments.push(DisplaySegment::text(run));
}

/// Renders a transcript message with keys of the form `{message_id}-{index}`.
pub fn render_chat_message(message: &ChatMessage) -> Vec<KeyedSegment> {
    render_message(&message.content)
        .into_iter()
        .enumerate()
        .map(|(index, segment)| KeyedSegment {
            key: segment_key(&message.id, index),
            segment,
        })
        .collect()
}

pub fn segment_key(message_id: &str, index: usize) -> String {
    format!("{message_id}-{index}")
}

/// Joins segments back into message text, writing the language tag on every
/// fence.
pub fn to_markdown(segments: &[DisplaySegment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            DisplaySegment::Text { lines } => lines.join("\n"),
            DisplaySegment::Code { language, source } => {
                format!("{FENCE}{language}\n{source}\n{FENCE}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[&str]) -> DisplaySegment {
        DisplaySegment::Text {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn code(language: &str, source: &str) -> DisplaySegment {
        DisplaySegment::Code {
            language: language.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn splits_text_code_text() {
        assert_eq!(
            render_message("a\n```js\nx=1\n```\nb"),
            vec![text(&["a"]), code("js", "x=1"), text(&["b"])]
        );
    }

    #[test]
    fn unterminated_fence_is_text() {
        let content = "a\n```js\nx=1";
        assert_eq!(render_message(content), vec![text(&["a", "```js", "x=1"])]);
    }

    #[test]
    fn missing_language_defaults() {
        assert_eq!(
            render_message("```\nlet x = 1;\n```"),
            vec![code(DEFAULT_LANGUAGE, "let x = 1;")]
        );
    }

    #[test]
    fn closes_at_nearest_fence() {
        assert_eq!(
            render_message("```py\na\n```\nmid\n```py\nb\n```"),
            vec![code("py", "a"), text(&["mid"]), code("py", "b")]
        );
    }

    #[test]
    fn adjacent_fences_emit_no_empty_text() {
        assert_eq!(
            render_message("```a\n1\n```\n```b\n2\n```"),
            vec![code("a", "1"), code("b", "2")]
        );
    }

    #[test]
    fn opener_with_invalid_tag_is_skipped() {
        let content = "``` js\nx\n```";
        assert_eq!(render_message(content), vec![text(&["``` js", "x", "```"])]);
    }

    #[test]
    fn fourth_backtick_shifts_opener() {
        assert_eq!(
            render_message("````js\nx\n```"),
            vec![text(&["`"]), code("js", "x")]
        );
    }

    #[test]
    fn empty_body() {
        assert_eq!(render_message("```js\n```"), vec![code("js", "")]);
    }

    #[test]
    fn keys_follow_position() {
        let message = ChatMessage::assistant("hi\n```js\n1\n```");
        let keyed = render_chat_message(&message);
        assert_eq!(keyed.len(), 2);
        assert_eq!(keyed[0].key, format!("{}-0", message.id));
        assert_eq!(keyed[1].key, format!("{}-1", message.id));
        assert_eq!(render_chat_message(&message), keyed);
    }

    #[test]
    fn blank_line_between_fences_is_kept() {
        assert_eq!(
            render_message("```a\n1\n```\n\n```b\n2\n```\n"),
            vec![code("a", "1"), text(&[""]), code("b", "2"), text(&[""])]
        );
    }

    #[test]
    fn reconstructs_line_fenced_content() {
        let content = "intro\n\n```rust\nfn main() {}\n\n```\nouter\nend";
        assert_eq!(to_markdown(&render_message(content)), content);
    }
}
