//! LLM prompt engineering for candidate selection

use labwright_domain::{AncestorDecision, SelectionContext};
use serde_json::Value;

/// JSON schema of the expected answer
pub const SELECTION_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "selected_component_name": {"type": "string"},
    "reasoning": {"type": "string"}
  },
  "required": ["selected_component_name", "reasoning"]
}"#;

/// Builds the selection prompt for one requirement slot
pub struct PromptBuilder<'a> {
    context: &'a SelectionContext,
    max_ancestors: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(context: &'a SelectionContext) -> Self {
        Self {
            context,
            max_ancestors: usize::MAX,
        }
    }

    /// Include at most `limit` of the most recent ancestor decisions
    pub fn with_max_ancestors(mut self, limit: usize) -> Self {
        self.max_ancestors = limit;
        self
    }

    /// Build the complete selection prompt
    pub fn build(&self) -> String {
        let ctx = self.context;
        let mut prompt = String::new();

        prompt.push_str(SYSTEM_INSTRUCTION);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("REQUIREMENT: {}\n", ctx.slot));
        prompt.push_str(&format!("REQUIRED BY: {}\n", ctx.item));
        prompt.push_str(&format!("QUANTITY: {}\n", ctx.quantity));
        prompt.push_str(&format!("USER DESIGN INTENT (Context): \"{}\"\n\n", ctx.intent.trim()));

        let ancestors = self.ancestors();
        if !ancestors.is_empty() {
            prompt.push_str("DECISIONS ALREADY MADE FOR THIS BUILD (outermost first):\n");
            let omitted = ctx.ancestors.len() - ancestors.len();
            if omitted > 0 {
                prompt.push_str(&format!("- ({} earlier decisions omitted)\n", omitted));
            }
            for decision in ancestors {
                prompt.push_str(&format!(
                    "- {} / {}: {} ({})\n",
                    decision.item, decision.slot, decision.chosen, decision.rationale
                ));
            }
            prompt.push('\n');
        }

        prompt.push_str("AVAILABLE CANDIDATES (Inventory):\n");
        for candidate in &ctx.candidates {
            let specs = Value::Object(candidate.attributes.to_map());
            prompt.push_str(&format!(
                "- Name: {}\n  Category: {}\n  Specs: {}\n",
                candidate.name, candidate.category, specs
            ));
        }
        prompt.push('\n');

        prompt.push_str(OUTPUT_INSTRUCTIONS);
        prompt
    }

    fn ancestors(&self) -> &'a [AncestorDecision] {
        let all = &self.context.ancestors;
        let skip = all.len().saturating_sub(self.max_ancestors);
        &all[skip..]
    }
}

const SYSTEM_INSTRUCTION: &str = "You are an expert Lab Automation Architect. \
Your sole function is to select the single best item from the provided CANDIDATES list. \
DO NOT suggest, return, or mention any component not explicitly in the list. \
Output only valid JSON.";

const OUTPUT_INSTRUCTIONS: &str = r#"INSTRUCTIONS:
1. Compare candidate specs against the User Design Intent and the decisions already made.
2. Select the single best fit from the list above.
3. Return ONLY a JSON object with this structure. The 'selected_component_name' MUST exactly match a name from the list:
{ "selected_component_name": "Exact Name From List", "reasoning": "Short explanation justifying the choice based on intent." }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use labwright_domain::{Attributes, CandidateView, Category};
    use serde_json::json;

    fn context(ancestors: usize) -> SelectionContext {
        let mut fast = Attributes::new();
        fast.insert("speed", json!("high"));
        SelectionContext {
            item: "LiquidHandler".to_string(),
            slot: "head".to_string(),
            quantity: 2,
            candidates: vec![
                CandidateView {
                    name: "96-Channel Head".to_string(),
                    category: Category::Module,
                    attributes: fast,
                },
                CandidateView {
                    name: "8-Channel Head".to_string(),
                    category: Category::Module,
                    attributes: Attributes::new(),
                },
            ],
            intent: "  I need high speed ".to_string(),
            ancestors: (0..ancestors)
                .map(|i| AncestorDecision {
                    item: format!("Parent{}", i),
                    slot: "module".to_string(),
                    chosen: format!("Choice{}", i),
                    rationale: "fits".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_prompt_contains_requirement_and_intent() {
        let ctx = context(0);
        let prompt = PromptBuilder::new(&ctx).build();

        assert!(prompt.contains("REQUIREMENT: head"));
        assert!(prompt.contains("REQUIRED BY: LiquidHandler"));
        assert!(prompt.contains("QUANTITY: 2"));
        assert!(prompt.contains("\"I need high speed\""));
        assert!(prompt.contains("selected_component_name"));
        assert!(!prompt.contains("DECISIONS ALREADY MADE"));
    }

    #[test]
    fn test_candidates_in_declared_order_with_specs() {
        let ctx = context(0);
        let prompt = PromptBuilder::new(&ctx).build();

        let first = prompt.find("- Name: 96-Channel Head").unwrap();
        let second = prompt.find("- Name: 8-Channel Head").unwrap();
        assert!(first < second);
        assert!(prompt.contains(r#"Specs: {"speed":"high"}"#));
    }

    #[test]
    fn test_ancestors_are_bounded_to_most_recent() {
        let ctx = context(4);
        let prompt = PromptBuilder::new(&ctx).with_max_ancestors(2).build();

        assert!(prompt.contains("(2 earlier decisions omitted)"));
        assert!(!prompt.contains("Choice1"));
        assert!(prompt.contains("Parent2 / module: Choice2 (fits)"));
        assert!(prompt.contains("Choice3"));
    }

    #[test]
    fn test_schema_is_valid_json() {
        let schema: Value = serde_json::from_str(SELECTION_SCHEMA).unwrap();
        assert_eq!(schema["required"][0], "selected_component_name");
    }
}
