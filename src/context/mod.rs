//! Page-context extraction.
//!
//! Maps the current route plus a snapshot of application state to a page tag
//! and a human-readable description that travels with every outgoing message.
//! Extraction never fails: unknown routes and missing state degrade to less
//! detail, never to an error.

pub mod state;
pub mod text;

use serde::{Deserialize, Serialize};
use std::fmt;

use state::{ApplicationStateView, EditorWorkspace, OutputEntry, QuestionType};
use text::{
    CODE_LIMIT, OUTPUT_LIMIT, QUESTION_LIMIT, SUMMARY_LIMIT, editor_code, fenced, strip_html,
    truncate,
};

const RECENT_OUTPUT_ENTRIES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Playground,
    Grading,
    GroundControl,
    AdminPanel,
    Achievements,
    Sourcecast,
    Game,
    Stories,
    Assessment,
    MissionControl,
    Contributors,
    Welcome,
    General,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Playground => "playground",
            PageType::Grading => "grading",
            PageType::GroundControl => "groundcontrol",
            PageType::AdminPanel => "adminpanel",
            PageType::Achievements => "achievements",
            PageType::Sourcecast => "sourcecast",
            PageType::Game => "game",
            PageType::Stories => "stories",
            PageType::Assessment => "assessment",
            PageType::MissionControl => "missioncontrol",
            PageType::Contributors => "contributors",
            PageType::Welcome => "welcome",
            PageType::General => "general",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            PageType::Playground => {
                "The user is in the Playground, a free-form editor where they can write and run programs."
            }
            PageType::Grading => {
                "The user is on the grading page, reviewing and grading a student's submission."
            }
            PageType::GroundControl => {
                "The user is in Ground Control, where staff upload and manage assessments."
            }
            PageType::AdminPanel => {
                "The user is in the admin panel, managing course configuration and users."
            }
            PageType::Achievements => {
                "The user is viewing achievements and goals for the course."
            }
            PageType::Sourcecast => {
                "The user is on Sourcecast, watching or recording a code-along session."
            }
            PageType::Game => "The user is playing the course story game.",
            PageType::Stories => "The user is viewing the course stories.",
            PageType::Assessment => {
                "The user is working on a course assessment in the assessment workspace."
            }
            PageType::MissionControl => {
                "The user is in Mission Control, testing assessments before release."
            }
            PageType::Contributors => "The user is viewing the list of platform contributors.",
            PageType::Welcome => "The user is on the welcome page and has not joined a course yet.",
            PageType::General => "The user is browsing the learning platform.",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one extraction; computed per outgoing message and never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub page_type: PageType,
    pub page_context: String,
}

const COURSE_SECTIONS: &[(&str, PageType)] = &[
    ("groundcontrol", PageType::GroundControl),
    ("adminpanel", PageType::AdminPanel),
    ("achievements", PageType::Achievements),
    ("sourcecast", PageType::Sourcecast),
    ("game", PageType::Game),
    ("stories", PageType::Stories),
];

const TOP_LEVEL_PAGES: &[(&str, PageType)] = &[
    ("/mission-control", PageType::MissionControl),
    ("/contributors", PageType::Contributors),
    ("/welcome", PageType::Welcome),
];

pub fn extract_context(route: &str, state: &ApplicationStateView) -> PageContext {
    if route.starts_with("/playground") {
        return playground_context(route, state);
    }

    if let Some(section) = course_section(route) {
        if section.starts_with("grading") {
            return grading_context(route, state);
        }
        if let Some((_, page_type)) = COURSE_SECTIONS
            .iter()
            .find(|(prefix, _)| section.starts_with(prefix))
        {
            return ContextBuilder::new(*page_type, route).finish();
        }
        return assessment_context(route, state);
    }

    let page_type = TOP_LEVEL_PAGES
        .iter()
        .find(|(prefix, _)| route.starts_with(prefix))
        .map(|(_, page_type)| *page_type)
        .unwrap_or(PageType::General);
    ContextBuilder::new(page_type, route).finish()
}

/// The part of a `/courses/{id}/...` route after the course id, or `None` when
/// the route is not under a course.
fn course_section(route: &str) -> Option<&str> {
    let rest = route.strip_prefix("/courses/")?;
    let (course_id, section) = rest.split_once('/').unwrap_or((rest, ""));
    if course_id.is_empty() {
        return None;
    }
    Some(section)
}

struct ContextBuilder {
    page_type: PageType,
    sections: Vec<String>,
}

impl ContextBuilder {
    fn new(page_type: PageType, route: &str) -> Self {
        Self {
            page_type,
            sections: vec![format!(
                "{}\nCurrent route: {}",
                page_type.description(),
                route
            )],
        }
    }

    fn push(&mut self, section: String) {
        self.sections.push(section);
    }

    fn push_code(&mut self, heading: &str, code: &str) {
        self.push(format!(
            "{heading}:\n{}",
            fenced("javascript", &truncate(code, CODE_LIMIT))
        ));
    }

    fn push_editor(&mut self, heading: &str, editor: &EditorWorkspace) {
        if let Some(code) = editor_code(&editor.tabs, editor.active_tab_index)
            && !code.trim().is_empty()
        {
            self.push_code(heading, &code);
        }
    }

    fn finish(self) -> PageContext {
        PageContext {
            page_type: self.page_type,
            page_context: self.sections.join("\n\n"),
        }
    }
}

fn playground_context(route: &str, state: &ApplicationStateView) -> PageContext {
    let playground = &state.playground;
    let mut ctx = ContextBuilder::new(PageType::Playground, route);

    ctx.push_editor("Current code in editor", &playground.editor);

    if !playground.repl_value.trim().is_empty() {
        ctx.push(format!("REPL input: {}", playground.repl_value));
    }

    if !playground.output.is_empty() {
        let skip = playground.output.len().saturating_sub(RECENT_OUTPUT_ENTRIES);
        let recent = playground.output[skip..]
            .iter()
            .map(OutputEntry::display)
            .collect::<Vec<_>>()
            .join("\n");
        ctx.push(format!("Recent output:\n{}", truncate(&recent, OUTPUT_LIMIT)));
    }

    ctx.finish()
}

fn grading_context(route: &str, state: &ApplicationStateView) -> PageContext {
    let workspace = &state.grading_workspace;
    let mut ctx = ContextBuilder::new(PageType::Grading, route);

    let selected = workspace
        .current_submission
        .zip(workspace.current_question)
        .and_then(|(submission, question)| state.gradings.get(&submission)?.get(question));

    if let Some(entry) = selected {
        let question = strip_html(&entry.question.content);
        ctx.push(format!("Question:\n{}", truncate(&question, QUESTION_LIMIT)));

        if let Some(answer) = entry.question.answer_text() {
            ctx.push_code("Student's answer", answer);
        }

        if let Some(comments) = entry.grade.comments.as_deref().filter(|c| !c.is_empty()) {
            ctx.push(format!("Existing grader comments:\n{}", strip_html(comments)));
        }

        ctx.push(format!(
            "Student: {} ({})",
            entry.student.name, entry.student.username
        ));
    }

    ctx.push_editor("Code in grading editor", &workspace.editor);
    ctx.finish()
}

fn assessment_context(route: &str, state: &ApplicationStateView) -> PageContext {
    let workspace = &state.assessment_workspace;
    let mut ctx = ContextBuilder::new(PageType::Assessment, route);

    let assessment = workspace
        .current_assessment
        .and_then(|id| state.assessments.get(&id));

    if let Some(assessment) = assessment {
        ctx.push(format!("Assessment: {}", assessment.title));
        let summary = strip_html(&assessment.long_summary);
        if !summary.trim().is_empty() {
            ctx.push(format!("Summary:\n{}", truncate(&summary, SUMMARY_LIMIT)));
        }

        let question = workspace
            .current_question
            .and_then(|index| assessment.questions.get(index));
        if let Some(question) = question {
            let content = strip_html(&question.content);
            ctx.push(format!("Question:\n{}", truncate(&content, QUESTION_LIMIT)));

            if question.question_type == QuestionType::Programming
                && let Some(answer) = question.answer_text()
            {
                ctx.push_code("Current answer", answer);
            }
        }
    }

    ctx.push_editor("Code in assessment editor", &workspace.editor);
    ctx.finish()
}
