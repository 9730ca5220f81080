//! HTML presentation of rendered segments for web front-ends.

use super::{DisplaySegment, FENCE, KeyedSegment, render_chat_message};
use crate::types::ChatMessage;
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options
});

pub fn segment_to_html(segment: &DisplaySegment) -> String {
    match segment {
        DisplaySegment::Text { lines } => markdown_to_html(&lines.join("\n"), &MARKDOWN_OPTIONS),
        DisplaySegment::Code { language, source } => {
            let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
            let mut plugins = ComrakPlugins::default();
            plugins.render.codefence_syntax_highlighter = Some(&adapter);
            let fenced = format!("{FENCE}{language}\n{source}\n{FENCE}\n");
            markdown_to_html_with_plugins(&fenced, &MARKDOWN_OPTIONS, &plugins)
        }
    }
}

fn keyed_to_html(keyed: &KeyedSegment) -> String {
    let kind = match keyed.segment {
        DisplaySegment::Text { .. } => "text",
        DisplaySegment::Code { .. } => "code",
    };
    format!(
        "<div class=\"segment segment-{kind}\" data-segment-key=\"{}\">{}</div>",
        keyed.key,
        segment_to_html(&keyed.segment)
    )
}

/// Renders a whole transcript message, one keyed `div` per segment.
pub fn message_to_html(message: &ChatMessage) -> String {
    render_chat_message(message)
        .iter()
        .map(keyed_to_html)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_goes_through_markdown() {
        let html = segment_to_html(&DisplaySegment::Text {
            lines: vec!["**bold**".to_string()],
        });
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn markup_in_text_is_not_passed_through() {
        let html = segment_to_html(&DisplaySegment::Text {
            lines: vec!["<script>alert(1)</script>".to_string()],
        });
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn code_is_wrapped_in_pre() {
        let html = segment_to_html(&DisplaySegment::Code {
            language: "rust".to_string(),
            source: "fn main() {}".to_string(),
        });
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn message_divs_carry_keys() {
        let message = ChatMessage::assistant("look:\n```js\n1;\n```");
        let html = message_to_html(&message);
        assert!(html.contains(&format!("data-segment-key=\"{}-0\"", message.id)));
        assert!(html.contains(&format!("data-segment-key=\"{}-1\"", message.id)));
        assert!(html.contains("segment-code"));
    }
}
