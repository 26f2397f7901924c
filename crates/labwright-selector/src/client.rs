//! Selection client: one bounded, retried LLM exchange per slot

use crate::config::SelectorConfig;
use crate::parser::parse_decision;
use crate::prompt::{PromptBuilder, SELECTION_SCHEMA};
use async_trait::async_trait;
use labwright_domain::{Decision, LlmProvider, SelectionContext, SelectionError, Selector};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Asks an LLM to choose one candidate for a requirement slot
pub struct SelectionClient<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: SelectorConfig,
}

impl<L> SelectionClient<L>
where
    L: LlmProvider,
{
    /// Create a new SelectionClient
    pub fn new(llm_provider: L, config: SelectorConfig) -> Self {
        Self::from_shared(Arc::new(llm_provider), config)
    }

    /// Create a client over a provider shared with other clients
    pub fn from_shared(llm_provider: Arc<L>, config: SelectorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// One provider call bounded by the per-attempt timeout
    async fn attempt(
        &self,
        prompt: &str,
        context: &SelectionContext,
    ) -> Result<Decision, SelectionError> {
        let limit = self.config.timeout();
        let response = timeout(
            limit,
            self.llm_provider.generate_structured(prompt, SELECTION_SCHEMA),
        )
        .await
        .map_err(|_| SelectionError::Timeout(limit))?
        .map_err(|e| SelectionError::Provider(e.to_string()))?;

        debug!("LLM response length: {} chars", response.len());
        parse_decision(&response, context)
    }
}

#[async_trait]
impl<L> Selector for SelectionClient<L>
where
    L: LlmProvider,
{
    async fn select(&self, context: &SelectionContext) -> Result<Decision, SelectionError> {
        match context.candidates.as_slice() {
            [] => return Err(SelectionError::NoCandidates),
            [only] if self.config.shortcut_single_candidate => {
                debug!(item = %context.item, slot = %context.slot, "Single candidate, no provider call");
                return Ok(Decision::new(only.name.clone(), "Only candidate offered"));
            }
            _ => {}
        }

        let prompt = PromptBuilder::new(context)
            .with_max_ancestors(self.config.max_ancestors_in_prompt)
            .build();
        debug!(
            item = %context.item,
            slot = %context.slot,
            candidates = context.candidates.len(),
            "Prompt length: {} chars",
            prompt.len()
        );

        let mut attempt = 1;
        loop {
            match self.attempt(&prompt, context).await {
                Ok(decision) => return Ok(decision),
                Err(e) if e.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.backoff(attempt);
                    warn!(
                        item = %context.item,
                        slot = %context.slot,
                        attempt,
                        "Selection attempt failed: {}; retrying in {:?}",
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        item = %context.item,
                        slot = %context.slot,
                        attempts = attempt,
                        "Selection failed: {}",
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}
