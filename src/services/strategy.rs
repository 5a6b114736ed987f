use std::sync::Arc;

use tracing::{info, warn};

use crate::domains::chat::ChatMessage;
use crate::domains::intake::IntakeRecord;
use crate::domains::strategy::{response_schema, GrowthStrategy};
use crate::error::Result;
use crate::interfaces::providers::LlmProvider;
use crate::prompts;

/// Formats requests for the external model and interprets its replies.
///
/// Holds nothing but the provider handle; every call goes to the model.
#[derive(Clone)]
pub struct StrategyClient {
    llm_provider: Arc<dyn LlmProvider>,
}

impl StrategyClient {
    pub fn new(llm_provider: Arc<dyn LlmProvider>) -> Self {
        Self { llm_provider }
    }

    /// Fails with `GenerationFailed` on an empty, unparsable or incomplete reply.
    pub async fn generate_strategy(&self, intake: &IntakeRecord) -> Result<GrowthStrategy> {
        let prompt = prompts::generation_prompt(intake);
        let expected = prompts::expected_kind(intake);
        info!(business = %intake.business_name, expected = %expected, "requesting growth strategy");

        let body = self
            .llm_provider
            .generate_structured(&prompt, prompts::AUDITOR_SYSTEM_PROMPT, response_schema())
            .await
            .inspect_err(|err| warn!("strategy request failed: {err}"))?;

        let strategy = GrowthStrategy::parse_response(&body)
            .inspect_err(|err| warn!("strategy response rejected: {err}"))?;
        if strategy.kind != expected {
            warn!(expected = %expected, received = %strategy.kind, "model ignored strategy steering");
        }
        info!(
            kind = %strategy.kind,
            health_score = strategy.display_score(),
            roadmap_tasks = strategy.roadmap.len(),
            "growth strategy received"
        );
        Ok(strategy)
    }

    /// Never fails: a transport error or an empty reply becomes the fixed
    /// fallback reply so the conversation stays usable.
    pub async fn chat_with_consultant(
        &self,
        history: &[ChatMessage],
        message: &str,
        intake: &IntakeRecord,
        strategy: &GrowthStrategy,
    ) -> String {
        let system_prompt = prompts::consultant_system_prompt(intake, strategy);
        match self
            .llm_provider
            .chat(&system_prompt, history, message)
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!("consultant returned an empty reply");
                prompts::CHAT_FALLBACK_REPLY.to_string()
            }
            Err(err) => {
                warn!("consultant chat failed: {err}");
                prompts::CHAT_FALLBACK_REPLY.to_string()
            }
        }
    }
}
