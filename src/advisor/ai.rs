use crate::config::Settings;
use crate::error::AdvisorError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Returned as the answer when the response carries no message content.
pub const NO_CONTENT: &str = "No content received";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}
#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}
#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn answer(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_else(|| NO_CONTENT.to_string())
    }
}

/// Client for the account-scoped chat-completions endpoint. Every call is a
/// fresh system + user exchange; nothing is retained between calls.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    endpoint: String,
    auth_token: String,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(settings: &Settings) -> Self {
        let endpoint = format!(
            "{}/accounts/{}/ai/v1/chat/completions",
            settings.api_base.trim_end_matches('/'),
            settings.account_id
        );
        Self {
            http: Client::new(),
            endpoint,
            auth_token: settings.auth_token.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        }
    }
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
    pub fn build_request(&self, system_prompt: &str, user_text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_text)],
            max_tokens: self.max_tokens,
        }
    }

    /// One POST, no retry. Non-2xx statuses and undecodable bodies are errors.
    pub async fn request(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String, AdvisorError> {
        if user_text.trim().is_empty() {
            return Err(AdvisorError::EmptyInput);
        }
        let body = self.build_request(system_prompt, user_text);
        debug!(model = %body.model, chars = user_text.len(), "sending completion");
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.auth_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: ChatResponse = resp.json().await?;
        Ok(parsed.answer())
    }

    /// Same as [`request`](Self::request) with the failure flattened to its
    /// message, so callers only ever see text.
    pub async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, String> {
        match self.request(system_prompt, user_text).await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!("completion failed: {e}");
                Err(e.to_string())
            }
        }
    }
}

/// Text shown in the target pane for a finished request.
pub fn render_answer(result: Result<String, String>) -> String {
    match result {
        Ok(answer) => answer,
        Err(e) => format!("Error: {e}"),
    }
}
