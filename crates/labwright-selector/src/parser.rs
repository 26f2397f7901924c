//! Parse LLM output into a selection decision

use labwright_domain::{Decision, SelectionContext, SelectionError};
use serde::Deserialize;

#[derive(Deserialize)]
struct RawDecision {
    selected_component_name: String,
    #[serde(default)]
    reasoning: String,
}

/// Parse an LLM response and validate it against the offered candidates
///
/// The returned name is matched trimmed and case-insensitively, and the
/// decision carries the canonical offered spelling. A name that was not
/// offered is an error; it is never replaced by some other candidate.
pub fn parse_decision(response: &str, context: &SelectionContext) -> Result<Decision, SelectionError> {
    let json_str = extract_json(response)?;

    let raw: RawDecision = serde_json::from_str(&json_str)
        .map_err(|e| SelectionError::Malformed(format!("JSON parse error: {}", e)))?;

    match context.find_candidate(&raw.selected_component_name) {
        Some(candidate) => Ok(Decision::new(candidate.name.clone(), raw.reasoning.trim())),
        None => Err(SelectionError::NotOffered {
            returned: raw.selected_component_name,
            offered: context.candidate_names(),
        }),
    }
}

/// Extract JSON from response, handling markdown code blocks and chatter
fn extract_json(response: &str) -> Result<String, SelectionError> {
    let trimmed = response.trim();

    // Inside a fence the object may share a line with the fences or sit
    // next to a language tag, and prose may follow the closing fence
    let body = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let body = rest.find("```").map_or(rest, |end| &rest[..end]);
            if body.trim().is_empty() {
                return Err(SelectionError::Malformed("Empty code block".to_string()));
            }
            body
        }
        None => trimmed,
    };

    outermost_object(body.trim())
}

/// The text between the first `{` and the last `}`
fn outermost_object(text: &str) -> Result<String, SelectionError> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(text[start..=end].to_string()),
        _ => Err(SelectionError::Malformed(format!(
            "No JSON object in response: {}",
            truncate(text, 80)
        ))),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwright_domain::{CandidateView, CatalogItem, Category};

    fn context() -> SelectionContext {
        SelectionContext {
            item: "LiquidHandler".to_string(),
            slot: "head".to_string(),
            quantity: 1,
            candidates: ["96-Channel Head", "8-Channel Head"]
                .iter()
                .map(|n| CandidateView::from_item(&CatalogItem::new(*n, Category::Module)))
                .collect(),
            intent: "I need high speed".to_string(),
            ancestors: Vec::new(),
        }
    }

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{"selected_component_name": "96-Channel Head", "reasoning": "Fastest."}"#;
        let decision = parse_decision(response, &context()).unwrap();
        assert_eq!(decision.candidate, "96-Channel Head");
        assert_eq!(decision.rationale, "Fastest.");
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"selected_component_name\": \"8-Channel Head\", \"reasoning\": \"cheap\"}\n```";
        let decision = parse_decision(response, &context()).unwrap();
        assert_eq!(decision.candidate, "8-Channel Head");
    }

    #[test]
    fn test_parse_fenced_json_followed_by_prose() {
        let response = "```json\n{\"selected_component_name\": \"8-Channel Head\", \"reasoning\": \"cheap\"}\n```\nLet me know if you need more.";
        let decision = parse_decision(response, &context()).unwrap();
        assert_eq!(decision.candidate, "8-Channel Head");
        assert_eq!(decision.rationale, "cheap");
    }

    #[test]
    fn test_parse_single_line_fence() {
        let response = "```{\"selected_component_name\": \"96-Channel Head\"}```";
        let decision = parse_decision(response, &context()).unwrap();
        assert_eq!(decision.candidate, "96-Channel Head");

        let tagged = "```json {\"selected_component_name\": \"8-channel head\"} ```";
        assert_eq!(parse_decision(tagged, &context()).unwrap().candidate, "8-Channel Head");
    }

    #[test]
    fn test_parse_json_with_surrounding_prose() {
        let response = "Sure! Here you go: {\"selected_component_name\": \"8-Channel Head\"} Hope that helps.";
        let decision = parse_decision(response, &context()).unwrap();
        assert_eq!(decision.candidate, "8-Channel Head");
        assert_eq!(decision.rationale, "");
    }

    #[test]
    fn test_match_ignores_case_and_whitespace() {
        let response = r#"{"selected_component_name": "  96-channel HEAD ", "reasoning": "x"}"#;
        let decision = parse_decision(response, &context()).unwrap();
        assert_eq!(decision.candidate, "96-Channel Head");
    }

    #[test]
    fn test_unoffered_name_is_rejected() {
        let response = r#"{"selected_component_name": "Quantum Head", "reasoning": "x"}"#;
        match parse_decision(response, &context()) {
            Err(SelectionError::NotOffered { returned, offered }) => {
                assert_eq!(returned, "Quantum Head");
                assert_eq!(offered, vec!["96-Channel Head", "8-Channel Head"]);
            }
            other => panic!("expected NotOffered, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let response = r#"{"choice": "96-Channel Head"}"#;
        assert!(matches!(
            parse_decision(response, &context()),
            Err(SelectionError::Malformed(_))
        ));
    }

    #[test]
    fn test_not_json_is_malformed() {
        assert!(matches!(
            parse_decision("I would pick the first one", &context()),
            Err(SelectionError::Malformed(_))
        ));
        assert!(matches!(
            parse_decision("```", &context()),
            Err(SelectionError::Malformed(_))
        ));
        assert!(matches!(
            parse_decision("```json\n```", &context()),
            Err(SelectionError::Malformed(_))
        ));
    }
}
