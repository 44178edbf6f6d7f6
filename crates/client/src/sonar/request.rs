//! Chat completions request types and validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sonar::SonarError;

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name, e.g. `sonar` or `sonar-pro`.
    pub model: String,

    /// Conversation, oldest first.
    pub messages: Vec<ChatMessage>,

    /// Structured-output hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Message author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// `response_format` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

/// JSON schema the reply content must follow.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub schema: Value,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

impl ChatRequest {
    /// System + user request asking for content matching `schema`.
    pub fn structured(model: &str, system: &str, prompt: String, schema: Value) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            response_format: Some(ResponseFormat::JsonSchema { json_schema: JsonSchemaFormat { schema } }),
        }
    }

    /// Validate the request before sending it.
    pub fn validate(&self) -> Result<(), SonarError> {
        if self.model.trim().is_empty() {
            return Err(SonarError::InvalidRequest("model cannot be empty".to_string()));
        }

        if self.messages.is_empty() {
            return Err(SonarError::InvalidRequest("at least one message is required".to_string()));
        }

        if let Some(idx) = self.messages.iter().position(|m| m.content.trim().is_empty()) {
            return Err(SonarError::InvalidRequest(format!("message {idx} has empty content")));
        }

        Ok(())
    }
}
