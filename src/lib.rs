pub mod ai;
pub mod config;
pub mod context;
pub mod render;
pub mod session;
pub mod types;

pub use ai::{AssistantBackend, AssistantError, HttpAssistant};
pub use context::{PageContext, PageType, extract_context};
pub use render::{DisplaySegment, render_message};
pub use session::ChatSession;
