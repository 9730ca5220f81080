use super::{
    AssistantBackend, AssistantError, AssistantResult, ConversationStart,
    DEFAULT_MAX_CONTENT_SIZE,
};
use crate::types::{ChatMessage, Role};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct HttpAssistant {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl HttpAssistant {
    pub fn new(endpoint: impl Into<String>, access_token: Option<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            endpoint,
            access_token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}{}", self.endpoint, path));
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct WireMessage {
    role: Role,
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    conversation_id: String,
    #[serde(default)]
    messages: Option<Vec<WireMessage>>,
    #[serde(default)]
    max_content_size: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageRequest<'a> {
    message: &'a str,
    page_context: &'a str,
    page_type: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    response: String,
}

/// Reads the body and turns a non-success status into an error.
async fn success_body(response: reqwest::Response) -> AssistantResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        warn!(%status, "assistant endpoint rejected request");
        Err(AssistantError::Status { status, body })
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistant {
    async fn start_conversation(&self) -> AssistantResult<ConversationStart> {
        debug!(endpoint = %self.endpoint, "starting conversation");
        let response = self.post("/chats").send().await?;
        let body = success_body(response).await?;
        let parsed: StartResponse = serde_json::from_str(&body)?;

        let messages = parsed
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|wire| ChatMessage::new(wire.role, wire.content))
            .collect();

        Ok(ConversationStart {
            conversation_id: parsed.conversation_id,
            messages,
            max_content_size: parsed.max_content_size.unwrap_or(DEFAULT_MAX_CONTENT_SIZE),
        })
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        page_context: &str,
        page_type: &str,
    ) -> AssistantResult<String> {
        debug!(conversation_id, page_type, "sending message");
        let response = self
            .post(&format!("/chats/{conversation_id}/message"))
            .json(&MessageRequest {
                message,
                page_context,
                page_type,
            })
            .send()
            .await?;
        let body = success_body(response).await?;

        // Plain-text bodies are taken as the reply itself
        match serde_json::from_str::<MessageResponse>(&body) {
            Ok(parsed) => Ok(parsed.response),
            Err(_) => Ok(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let assistant = HttpAssistant::new("http://localhost:4000/assistant/", None);
        assert_eq!(assistant.endpoint(), "http://localhost:4000/assistant");
    }

    #[test]
    fn message_request_is_camel_case() {
        let json = serde_json::to_value(MessageRequest {
            message: "hi",
            page_context: "ctx",
            page_type: "playground",
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "hi", "pageContext": "ctx", "pageType": "playground" })
        );
    }
}
