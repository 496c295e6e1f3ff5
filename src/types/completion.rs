//! Chat-completion response envelope returned by the inference backend.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

/// Successful completion envelope: `{choices: [{message: {content}}], ..}`.
///
/// Fields the orchestration layer does not read are preserved verbatim in
/// `extra` so the envelope round-trips unmodified to callers that want usage
/// or provider metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: String,
}

impl ChatCompletion {
    /// Text of the first choice.
    ///
    /// An envelope without choices, or with empty content, is a malformed
    /// backend reply and surfaces as `InvalidResponse`.
    pub fn content(&self) -> Result<&str> {
        let choice = self.choices.first().ok_or_else(|| {
            Error::invalid_response(
                "completion has no choices",
                ErrorContext::new().with_source("chat_completion"),
            )
        })?;
        if choice.message.content.is_empty() {
            return Err(Error::invalid_response(
                "completion content is empty",
                ErrorContext::new().with_source("chat_completion"),
            ));
        }
        Ok(&choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_from_first_choice() {
        let envelope: ChatCompletion = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": "hello"}}],
            "usage": {"total_tokens": 12}
        }))
        .unwrap();

        assert_eq!(envelope.content().unwrap(), "hello");
        // Unread fields survive in the envelope
        assert_eq!(envelope.extra["usage"]["total_tokens"], 12);
    }

    #[test]
    fn test_missing_choices_is_invalid_response() {
        let envelope: ChatCompletion =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        let err = envelope.content().unwrap_err();
        assert_eq!(err.kind(), "invalid_response");
    }

    #[test]
    fn test_empty_content_is_invalid_response() {
        let envelope: ChatCompletion = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": ""}}]
        }))
        .unwrap();
        assert_eq!(envelope.content().unwrap_err().kind(), "invalid_response");
    }
}
