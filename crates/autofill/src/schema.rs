use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

use crate::error::AutofillError;

/// Body of `POST /autofill`. Only the presence of `input_text` is checked.
#[derive(Debug, Clone)]
pub struct AutofillRequest {
    pub input_text: Value,
}

impl AutofillRequest {
    /// Decode a raw request body. A body that is not JSON, or has no
    /// `input_text`, is an internal error rather than a client error.
    pub fn from_slice(body: &[u8]) -> Result<Self, AutofillError> {
        let payload: Value =
            serde_json::from_slice(body).map_err(|e| AutofillError::Internal(e.to_string()))?;

        let input_text = payload
            .get("input_text")
            .cloned()
            .ok_or_else(|| AutofillError::Internal("missing field `input_text`".to_string()))?;

        Ok(Self { input_text })
    }

    /// Text placed in the prompt: strings as they are, any other value as JSON.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.input_text {
            Value::String(text) => Cow::Borrowed(text),
            other => Cow::Owned(other.to_string()),
        }
    }
}

/// One role-tagged message sent to the completion service.
#[derive(Debug, Clone, PartialEq, Serialize)]
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
