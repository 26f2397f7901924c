//! Integration tests for the selection client

#[cfg(test)]
mod tests {
    use crate::{SelectionClient, SelectorConfig};
    use labwright_domain::{
        AncestorDecision, CandidateView, CatalogItem, Category, SelectionContext, SelectionError,
        Selector,
    };
    use labwright_llm::MockProvider;
    use std::time::Duration;

    const PICK_96: &str = r#"{"selected_component_name": "96-Channel Head", "reasoning": "Highest throughput."}"#;

    fn context(names: &[&str]) -> SelectionContext {
        SelectionContext {
            item: "LiquidHandler".to_string(),
            slot: "head".to_string(),
            quantity: 1,
            candidates: names
                .iter()
                .map(|n| CandidateView::from_item(&CatalogItem::new(*n, Category::Module)))
                .collect(),
            intent: "I need high speed".to_string(),
            ancestors: vec![AncestorDecision {
                item: "Lab".to_string(),
                slot: "handler".to_string(),
                chosen: "LiquidHandler".to_string(),
                rationale: "requested".to_string(),
            }],
        }
    }

    fn fast_config() -> SelectorConfig {
        SelectorConfig {
            timeout_ms: 1_000,
            max_attempts: 3,
            backoff_base_ms: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_selection_flow() {
        let llm = MockProvider::new(PICK_96);
        let client = SelectionClient::new(llm.clone(), fast_config());

        let decision = client
            .select(&context(&["96-Channel Head", "8-Channel Head"]))
            .await
            .unwrap();

        assert_eq!(decision.candidate, "96-Channel Head");
        assert_eq!(decision.rationale, "Highest throughput.");
        assert_eq!(llm.call_count(), 1);

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("I need high speed"));
        assert!(prompt.contains("Lab / handler: LiquidHandler"));
    }

    #[tokio::test]
    async fn test_single_candidate_shortcut() {
        let llm = MockProvider::new(PICK_96);
        let client = SelectionClient::new(llm.clone(), fast_config());

        let decision = client.select(&context(&["8-Channel Head"])).await.unwrap();
        assert_eq!(decision.candidate, "8-Channel Head");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_candidate_without_shortcut_still_validates() {
        let llm = MockProvider::new(PICK_96);
        let config = SelectorConfig {
            shortcut_single_candidate: false,
            max_attempts: 1,
            ..fast_config()
        };
        let client = SelectionClient::new(llm.clone(), config);

        let result = client.select(&context(&["8-Channel Head"])).await;
        assert!(matches!(result, Err(SelectionError::NotOffered { .. })));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let llm = MockProvider::new(PICK_96);
        let client = SelectionClient::new(llm.clone(), fast_config());

        assert_eq!(
            client.select(&context(&[])).await,
            Err(SelectionError::NoCandidates)
        );
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_hallucinated_name_fails_after_retries() {
        let llm = MockProvider::new(r#"{"selected_component_name": "Quantum Head", "reasoning": "?"}"#);
        let client = SelectionClient::new(llm.clone(), fast_config());

        let result = client
            .select(&context(&["96-Channel Head", "8-Channel Head"]))
            .await;

        assert!(matches!(result, Err(SelectionError::NotOffered { ref returned, .. }) if returned == "Quantum Head"));
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let llm = MockProvider::new(PICK_96);
        llm.push_error();
        llm.push_response("not json at all");
        let client = SelectionClient::new(llm.clone(), fast_config());

        let decision = client
            .select(&context(&["96-Channel Head", "8-Channel Head"]))
            .await
            .unwrap();

        assert_eq!(decision.candidate, "96-Channel Head");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_provider_error_surfaces() {
        let llm = MockProvider::new("ERROR");
        let config = SelectorConfig {
            max_attempts: 2,
            ..fast_config()
        };
        let client = SelectionClient::new(llm.clone(), config);

        let result = client
            .select(&context(&["96-Channel Head", "8-Channel Head"]))
            .await;
        assert!(matches!(result, Err(SelectionError::Provider(_))));
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_per_attempt() {
        let llm = MockProvider::new(PICK_96).with_delay(Duration::from_secs(60));
        let config = SelectorConfig {
            timeout_ms: 500,
            max_attempts: 2,
            backoff_base_ms: 100,
            ..Default::default()
        };
        let client = SelectionClient::new(llm.clone(), config);

        let result = client
            .select(&context(&["96-Channel Head", "8-Channel Head"]))
            .await;

        assert_eq!(result, Err(SelectionError::Timeout(Duration::from_millis(500))));
        assert!(result.unwrap_err().is_timeout());
        assert_eq!(llm.call_count(), 2);
    }
}
