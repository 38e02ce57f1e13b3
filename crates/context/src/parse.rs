// SPDX-License-Identifier: MIT

use crate::data::{PanicContextData, ValidationPhase};
use crate::error::ContextError;
use regex::Regex;
use std::sync::LazyLock;

/// Matches the first fenced ```json ... ``` block in a markdown document.
/// Non-greedy and dot-matches-newline over the captured body, so the first
/// fence is always the one extracted even if later fences exist.
#[allow(clippy::expect_used)]
static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*\n(.*?)\n```").expect("constant regex pattern is valid"));

/// Extract the first fenced JSON block's raw text from `content`.
pub fn extract_fence(content: &str) -> Result<&str, ContextError> {
    JSON_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ContextError::NoFence)
}

/// Parse the fenced block into [`PanicContextData`], without validating it
/// against any phase's required-field set.
pub fn parse(content: &str) -> Result<PanicContextData, ContextError> {
    let fence = extract_fence(content)?;
    Ok(serde_json::from_str(fence)?)
}

/// Parse and validate in one call: a parse failure or an absent fence
/// surfaces as its own error variant before validation ever runs; a
/// successful parse that's missing required fields for `phase` surfaces
/// every missing field at once, not just the first.
pub fn parse_and_validate(content: &str, phase: ValidationPhase) -> Result<PanicContextData, ContextError> {
    let data = parse(content)?;
    let missing = data.missing_fields(phase);
    if missing.is_empty() {
        Ok(data)
    } else {
        Err(ContextError::MissingFields(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> String {
        format!("# Panic Info\n\nsome prose\n\n```json\n{json}\n```\n")
    }

    #[test]
    fn extracts_first_fence_only() {
        let content = format!(
            "```json\n{{\"panic_location\": \"a\"}}\n```\n\nmore text\n\n```json\n{{\"panic_location\": \"b\"}}\n```\n"
        );
        let fence = extract_fence(&content).unwrap();
        assert!(fence.contains("\"a\""));
        assert!(!fence.contains("\"b\""));
    }

    #[test]
    fn missing_fence_is_an_error() {
        let err = extract_fence("just some markdown, no fence here").unwrap_err();
        assert!(matches!(err, ContextError::NoFence));
    }

    #[test]
    fn parses_valid_context_document() {
        let content = doc(r#"{"panic_location": "loc", "panic_message": "msg", "tcl_test_file": "test/x.test"}"#);
        let data = parse(&content).unwrap();
        assert_eq!(data.panic_location.as_deref(), Some("loc"));
    }

    #[test]
    fn invalid_json_in_fence_is_an_error() {
        let content = doc("{not valid json}");
        let err = parse(&content).unwrap_err();
        assert!(matches!(err, ContextError::InvalidJson(_)));
    }

    #[test]
    fn parse_and_validate_accumulates_all_missing_fields() {
        let content = doc(r#"{"panic_location": "loc"}"#);
        let err = parse_and_validate(&content, ValidationPhase::RepoSetup).unwrap_err();
        match err {
            ContextError::MissingFields(fields) => {
                assert_eq!(fields, vec!["panic_message", "tcl_test_file"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn parse_and_validate_succeeds_when_phase_requirements_met() {
        let content = doc(r#"{"panic_location": "loc", "panic_message": "msg", "tcl_test_file": "test/x.test"}"#);
        let data = parse_and_validate(&content, ValidationPhase::RepoSetup).unwrap();
        assert_eq!(data.tcl_test_file.as_deref(), Some("test/x.test"));
    }
}
