//! Chat-completion request payload and the builder that derives it from
//! configuration plus the raw command argument.

use serde::Serialize;

use crate::config::LlmConfig;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Body of `POST {api_address}/chat/completions`.
///
/// `stop` is always serialized; `None` goes out as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stop: Option<Vec<String>>,
}

impl ChatRequest {
    /// Content of the trailing user message.
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Map configuration and the command argument onto a request.
///
/// The argument becomes the final `user` message exactly as received: no
/// trimming and no length checks. A configured system prompt is placed
/// ahead of it. Sampling parameters are copied unchanged.
pub fn build_request(config: &LlmConfig, user_message: &str) -> ChatRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &config.system_prompt {
        messages.push(ChatMessage::system(system.as_str()));
    }
    messages.push(ChatMessage::user(user_message));

    let s = config.sampling;
    ChatRequest {
        model: config.model.clone(),
        messages,
        temperature: s.temperature,
        max_tokens: s.max_tokens,
        top_p: s.top_p,
        frequency_penalty: s.frequency_penalty,
        presence_penalty: s.presence_penalty,
        stop: config.stop.clone(),
    }
}
