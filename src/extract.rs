//! Tolerant JSON recovery from free-text model completions.
//!
//! The backend is instructed to reply with JSON but routinely wraps it in
//! prose or a markdown fence. Selection is tiered, first match wins:
//!
//! 1. the interior of a ```` ```json ```` fenced block
//! 2. the largest `{...}` brace-delimited substring
//! 3. the whole text
//!
//! The selected candidate must then parse; a candidate that does not parse is
//! an [`InvalidResponse`](crate::Error::InvalidResponse) carrying a bounded
//! preview of the original text.

use crate::{Error, ErrorContext, Result};
use regex::Regex;

const PREVIEW_CHARS: usize = 200;

/// Recover a JSON object from a free-text completion.
///
/// Pure function: no side effects, same text always yields the same result.
pub fn json_object(text: &str) -> Result<serde_json::Value> {
    let candidate = select_candidate(text);

    serde_json::from_str(candidate).map_err(|e| {
        Error::invalid_response(
            "completion text does not contain valid JSON",
            ErrorContext::new()
                .with_preview(text.chars().take(PREVIEW_CHARS).collect::<String>())
                .with_source("response_extractor")
                .with_details(e.to_string()),
        )
    })
}

fn select_candidate(text: &str) -> &str {
    // Tier 1: fenced ```json block
    if let Ok(re) = Regex::new(r"(?s)```json\s*(.*?)\s*```") {
        if let Some(captures) = re.captures(text) {
            if let Some(inner) = captures.get(1) {
                return inner.as_str();
            }
        }
    }

    // Tier 2: largest brace-delimited substring (greedy, first `{` to last `}`)
    if let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) {
        if open < close {
            return &text[open..=close];
        }
    }

    // Tier 3: the whole text
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_block() {
        let text = "Here is the analysis:\n```json\n{\"job_title\": \"Engineer\"}\n```\nHope that helps!";
        let value = json_object(text).unwrap();
        assert_eq!(value["job_title"], "Engineer");
    }

    #[test]
    fn test_bare_object_in_prose() {
        let text = "Sure! {\"match_score\": 85.5, \"missing_skills\": [\"Go\"]} as requested.";
        let value = json_object(text).unwrap();
        assert_eq!(value["match_score"], 85.5);
    }

    #[test]
    fn test_raw_json() {
        let expected = json!({"skills": ["Rust", "Python"], "keywords": []});
        let value = json_object(&expected.to_string()).unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_fenced_block_wins_over_bare_braces() {
        let text = "{\"decoy\": true}\n```json\n{\"real\": true}\n```";
        let value = json_object(text).unwrap();
        assert_eq!(value, json!({"real": true}));
    }

    #[test]
    fn test_nested_object_recovered_intact() {
        let inner = json!({
            "requirements": [{"category": "technical_skill", "skill": "Rust"}],
            "meta": {"depth": {"level": 3}}
        });
        let text = format!("prose before {} prose after", inner);
        assert_eq!(json_object(&text).unwrap(), inner);
    }

    #[test]
    fn test_invalid_json_carries_bounded_preview() {
        let text = format!("not json at all {}", "y".repeat(1000));
        let err = json_object(&text).unwrap_err();
        assert_eq!(err.kind(), "invalid_response");

        let preview = err.context().unwrap().preview.as_deref().unwrap();
        assert!(preview.chars().count() <= 200);
        assert!(preview.starts_with("not json at all"));
    }

    #[test]
    fn test_idempotent() {
        let text = "```json\n{\"a\": 1}\n```";
        let first = json_object(text).unwrap();
        let second = json_object(text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(json_object("").unwrap_err().kind(), "invalid_response");
    }
}
