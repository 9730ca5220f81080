//! Remote assistant endpoint
//!
//! The assistant service is an opaque request/response endpoint with two
//! operations: start (or reset) a conversation, and send a message together
//! with the current page context.
//!
//! # Architecture
//!
//! - `AssistantBackend` - the seam the chat session talks to
//! - `http` - reqwest-backed implementation of the endpoint
//!
//! # Usage
//!
//! ```rust,no_run
//! use academy_assistant::ai::{AssistantBackend, HttpAssistant};
//!
//! # async fn example() -> Result<(), academy_assistant::ai::AssistantError> {
//! let assistant = HttpAssistant::new("https://example.org/v2/assistant", None);
//! let start = assistant.start_conversation().await?;
//! let _reply = assistant
//!     .send_message(&start.conversation_id, "Hello!", "The user is browsing.", "general")
//!     .await?;
//! # Ok(())
//! # }
//! ```
mod http;

pub use http::HttpAssistant;

use crate::types::ChatMessage;
use async_trait::async_trait;

/// Used when the endpoint does not say how long a message may be.
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("assistant endpoint error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// What the endpoint returns when a conversation is started or reset.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversationStart {
    pub conversation_id: String,
    pub messages: Vec<ChatMessage>,
    pub max_content_size: usize,
}

#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn start_conversation(&self) -> AssistantResult<ConversationStart>;

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        page_context: &str,
        page_type: &str,
    ) -> AssistantResult<String>;
}
