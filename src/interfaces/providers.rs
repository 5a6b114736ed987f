use async_trait::async_trait;
use serde_json::Value;

use crate::domains::chat::ChatMessage;
use crate::error::Result;

/// The external model service: text in, text out.
///
/// Implementations must not retry or cache; every call reaches the model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Single-shot request whose reply is expected to be JSON shaped by
    /// `json_schema`. The schema is advisory; callers validate the text.
    async fn generate_structured(
        &self,
        prompt: &str,
        system_prompt: &str,
        json_schema: Value,
    ) -> Result<String>;

    /// Replays `history` under `system_prompt`, then sends `message`.
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String>;
}
