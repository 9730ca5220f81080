//! Read-only snapshot of the host application's state.
//!
//! Every field defaults so partial snapshots deserialize cleanly; the extractor
//! treats anything missing as "not selected".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationStateView {
    pub playground: PlaygroundState,
    pub assessment_workspace: AssessmentWorkspace,
    pub grading_workspace: GradingWorkspace,
    pub assessments: HashMap<u32, Assessment>,
    pub gradings: HashMap<u32, Vec<GradingQuestion>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorWorkspace {
    pub tabs: Vec<EditorTab>,
    pub active_tab_index: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorTab {
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaygroundState {
    pub editor: EditorWorkspace,
    pub repl_value: String,
    pub output: Vec<OutputEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssessmentWorkspace {
    pub editor: EditorWorkspace,
    pub current_assessment: Option<u32>,
    pub current_question: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradingWorkspace {
    pub editor: EditorWorkspace,
    pub current_submission: Option<u32>,
    pub current_question: Option<usize>,
}

/// One line of program output shown under the REPL.
///
/// Entry kinds this crate does not know about are kept as raw JSON in
/// [`OutputEntry::Other`] instead of failing the whole snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputEntry {
    Result { value: Value },
    Errors { errors: Vec<String> },
    Code { value: String },
    Running,
    #[serde(untagged)]
    Other(Value),
}

impl OutputEntry {
    pub fn display(&self) -> String {
        match self {
            OutputEntry::Result { value } | OutputEntry::Other(value) => value_text(value),
            OutputEntry::Errors { errors } => errors.join("\n"),
            OutputEntry::Code { value } => value.clone(),
            OutputEntry::Running => "running".to_string(),
        }
    }
}

/// Strings as-is, anything else in its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Assessment {
    pub title: String,
    pub long_summary: String,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Programming,
    Mcq,
    Voting,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub content: String,
    /// Code for programming questions; other kinds store choice indices and
    /// the like, so the raw value is kept.
    pub answer: Option<Value>,
}

impl Question {
    /// The answer when it is non-empty text.
    pub fn answer_text(&self) -> Option<&str> {
        self.answer
            .as_ref()
            .and_then(Value::as_str)
            .filter(|answer| !answer.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingQuestion {
    pub question: Question,
    pub student: Student,
    pub grade: Grade,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    pub name: String,
    pub username: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grade {
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_snapshot_deserializes() {
        let state: ApplicationStateView = serde_json::from_str(
            r#"{
                "playground": {
                    "editor": { "tabs": [{ "value": "1+1;" }], "activeTabIndex": 0 },
                    "output": [
                        { "type": "result", "value": 2 },
                        { "type": "errors", "errors": ["Line 1: oops"] },
                        { "type": "running" }
                    ]
                },
                "assessments": { "3": { "title": "Mission 1", "questions": [{ "type": "contest" }] } }
            }"#,
        )
        .unwrap();

        assert_eq!(state.playground.editor.active_tab_index, Some(0));
        assert_eq!(state.playground.output[0].display(), "2");
        assert_eq!(state.playground.output[1].display(), "Line 1: oops");
        assert_eq!(state.playground.output[2].display(), "running");
        assert_eq!(state.assessments[&3].questions[0].question_type, QuestionType::Other);
        assert!(state.gradings.is_empty());
    }

    #[test]
    fn string_results_render_raw() {
        let entry = OutputEntry::Result {
            value: Value::String("hello".into()),
        };
        assert_eq!(entry.display(), "hello");
    }

    #[test]
    fn unknown_output_kinds_are_kept() {
        let state: ApplicationStateView = serde_json::from_str(
            r#"{"playground":{"output":[{"type":"result","value":1},{"type":"blocks","value":"x"},"plain"]}}"#,
        )
        .unwrap();

        let output = &state.playground.output;
        assert_eq!(output.len(), 3);
        assert_eq!(output[0].display(), "1");
        assert!(matches!(output[1], OutputEntry::Other(_)));
        assert_eq!(output[1].display(), r#"{"type":"blocks","value":"x"}"#);
        assert_eq!(output[2].display(), "plain");
    }

    #[test]
    fn non_text_answers_load() {
        let state: ApplicationStateView = serde_json::from_str(
            r#"{"assessments":{"7":{"title":"T","questions":[
                {"type":"mcq","content":"Pick","answer":2},
                {"type":"programming","content":"Write","answer":"f();"},
                {"type":"programming","content":"Blank","answer":""}
            ]}}}"#,
        )
        .unwrap();

        let questions = &state.assessments[&7].questions;
        assert_eq!(questions[0].question_type, QuestionType::Mcq);
        assert_eq!(questions[0].answer, Some(Value::from(2)));
        assert_eq!(questions[0].answer_text(), None);
        assert_eq!(questions[1].answer_text(), Some("f();"));
        assert_eq!(questions[2].answer_text(), None);
    }
}
