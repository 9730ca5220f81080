//! Chat panel state: the transcript, the single in-flight request and the
//! currently expanded code snippet.

use crate::ai::{AssistantBackend, AssistantResult, DEFAULT_MAX_CONTENT_SIZE};
use crate::context::state::ApplicationStateView;
use crate::context::{PageContext, extract_context};
use crate::types::ChatMessage;
use tracing::{debug, info, warn};

pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

pub const WELCOME_MESSAGE: &str = "Hi! I'm your learning assistant. Ask me anything about what you're working on and I'll take a look at the page you're on.";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("message is empty")]
    Empty,

    #[error("message is {length} characters long, the limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("a reply is still pending")]
    Busy,

    #[error("no conversation has been started")]
    NotStarted,
}

/// A user message that has been appended to the transcript and is waiting for
/// its reply.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingMessage {
    pub conversation_id: String,
    pub text: String,
    pub context: PageContext,
}

pub struct ChatSession<B> {
    backend: B,
    conversation_id: Option<String>,
    messages: Vec<ChatMessage>,
    max_content_size: usize,
    loading: bool,
    active_snippet: Option<String>,
}

impl<B: AssistantBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            conversation_id: None,
            messages: Vec::new(),
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            loading: false,
            active_snippet: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn max_content_size(&self) -> usize {
        self.max_content_size
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Resets the transcript and loads whatever history the endpoint has.
    pub async fn start(&mut self) {
        self.messages.clear();
        self.active_snippet = None;
        self.loading = false;

        match self.backend.start_conversation().await {
            Ok(start) => {
                info!(
                    conversation_id = %start.conversation_id,
                    history = start.messages.len(),
                    "conversation started"
                );
                self.conversation_id = Some(start.conversation_id);
                self.max_content_size = start.max_content_size;
                self.messages = start.messages;
                if self.messages.is_empty() {
                    self.messages.push(ChatMessage::assistant(WELCOME_MESSAGE));
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to start conversation");
                self.conversation_id = None;
                self.messages.push(ChatMessage::assistant(FAILURE_MESSAGE));
            }
        }
    }

    /// Explicit "clear chat": starts over with a fresh conversation.
    pub async fn clear(&mut self) {
        debug!("clearing conversation");
        self.start().await;
    }

    /// Validates `text`, appends it as a user message and marks the session
    /// busy until [`ChatSession::finish_send`] is called.
    pub fn begin_send(
        &mut self,
        text: &str,
        route: &str,
        state: &ApplicationStateView,
    ) -> Result<PendingMessage, SessionError> {
        if self.loading {
            return Err(SessionError::Busy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::Empty);
        }
        let length = text.chars().count();
        if length > self.max_content_size {
            return Err(SessionError::TooLong {
                length,
                limit: self.max_content_size,
            });
        }
        let conversation_id = self
            .conversation_id
            .clone()
            .ok_or(SessionError::NotStarted)?;

        let context = extract_context(route, state);
        self.messages.push(ChatMessage::user(text));
        self.loading = true;

        Ok(PendingMessage {
            conversation_id,
            text: text.to_string(),
            context,
        })
    }

    /// Appends the reply, or the generic failure message when the request
    /// failed.
    pub fn finish_send(&mut self, reply: AssistantResult<String>) {
        let content = match reply {
            Ok(content) => content,
            Err(err) => {
                warn!(error = %err, "assistant request failed");
                FAILURE_MESSAGE.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(content));
        self.loading = false;
    }

    pub async fn send(
        &mut self,
        text: &str,
        route: &str,
        state: &ApplicationStateView,
    ) -> Result<(), SessionError> {
        let pending = self.begin_send(text, route, state)?;
        debug!(page_type = %pending.context.page_type, "page context extracted");
        let reply = self
            .backend
            .send_message(
                &pending.conversation_id,
                &pending.text,
                &pending.context.page_context,
                pending.context.page_type.as_str(),
            )
            .await;
        self.finish_send(reply);
        Ok(())
    }

    pub fn active_snippet(&self) -> Option<&str> {
        self.active_snippet.as_deref()
    }

    /// Expands the snippet with `key`, or collapses it when it is already the
    /// expanded one.
    pub fn toggle_snippet(&mut self, key: &str) {
        if self.active_snippet.as_deref() == Some(key) {
            self.active_snippet = None;
        } else {
            self.active_snippet = Some(key.to_string());
        }
    }
}
