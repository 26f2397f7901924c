//! Offline selection without any model

use async_trait::async_trait;
use labwright_domain::{Decision, SelectionContext, SelectionError, Selector};

/// Picks the first offered candidate
///
/// Used when no selection model is configured, so a catalog can still be
/// walked end to end. Decisions say so in their rationale.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidateSelector;

#[async_trait]
impl Selector for FirstCandidateSelector {
    async fn select(&self, context: &SelectionContext) -> Result<Decision, SelectionError> {
        let first = context.candidates.first().ok_or(SelectionError::NoCandidates)?;
        Ok(Decision::new(
            first.name.clone(),
            "No selection model configured; first offered candidate",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwright_domain::{CandidateView, CatalogItem, Category};

    #[tokio::test]
    async fn test_first_candidate_and_empty() {
        let mut context = SelectionContext {
            item: "Pump".to_string(),
            slot: "seal".to_string(),
            quantity: 1,
            candidates: vec![
                CandidateView::from_item(&CatalogItem::new("Rubber Seal", Category::Part)),
                CandidateView::from_item(&CatalogItem::new("PTFE Seal", Category::Part)),
            ],
            intent: String::new(),
            ancestors: Vec::new(),
        };

        let decision = FirstCandidateSelector.select(&context).await.unwrap();
        assert_eq!(decision.candidate, "Rubber Seal");

        context.candidates.clear();
        assert_eq!(
            FirstCandidateSelector.select(&context).await,
            Err(SelectionError::NoCandidates)
        );
    }
}
