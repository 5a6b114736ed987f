use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
    ResponseFormatJsonSchema,
};

use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::domains::chat::{ChatMessage, ChatRole};
use crate::error::{GrowthFlowError, Result};
use crate::interfaces::providers::LlmProvider;

/// Chat-completions client for OpenAI and compatible servers.
#[derive(Clone)]
pub struct OpenAiProvider {
    model: String,
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            model,
            http: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(
            api_key,
            Some(config.model()),
            Some(config.base_url()),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn post_chat_completion(&self, request: &CreateChatCompletionRequest) -> Result<Value> {
        let mut builder = self.http.post(self.completions_url()).json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        debug!(model = %self.model, messages = request.messages.len(), "dispatching chat completion");
        let response = builder.send().await.map_err(|e| {
            GrowthFlowError::Http(format!("Chat completion transport failed: {e}"))
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GrowthFlowError::Http(format!("Chat completion read failed: {e}")))?;

        if status != StatusCode::OK {
            warn!(%status, "chat completion rejected");
            return Err(GrowthFlowError::Http(format!(
                "Chat completion failed ({status}): {body}"
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            GrowthFlowError::Serialization(format!("Chat completion decode failed: {e}"))
        })
    }

    fn extract_text_from_value(response: &Value) -> Option<String> {
        response
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|text| text.to_string())
    }

    fn build_system_message(system_prompt: &str) -> Result<Option<ChatCompletionRequestMessage>> {
        if system_prompt.is_empty() {
            return Ok(None);
        }
        let message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| GrowthFlowError::Runtime(e.to_string()))?;
        Ok(Some(ChatCompletionRequestMessage::System(message)))
    }

    fn build_user_text_message(prompt: &str) -> Result<ChatCompletionRequestMessage> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                prompt.to_string(),
            ))
            .build()
            .map_err(|e| GrowthFlowError::Runtime(e.to_string()))?;
        Ok(ChatCompletionRequestMessage::User(message))
    }

    fn build_assistant_text_message(text: &str) -> Result<ChatCompletionRequestMessage> {
        let message = ChatCompletionRequestAssistantMessageArgs::default()
            .content(ChatCompletionRequestAssistantMessageContent::Text(
                text.to_string(),
            ))
            .build()
            .map_err(|e| GrowthFlowError::Runtime(e.to_string()))?;
        Ok(ChatCompletionRequestMessage::Assistant(message))
    }

    fn build_history_messages(history: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
        history
            .iter()
            .map(|message| match message.role {
                ChatRole::User => Self::build_user_text_message(&message.text),
                ChatRole::Advisor => Self::build_assistant_text_message(&message.text),
            })
            .collect()
    }

    fn json_schema_format(json_schema: Value) -> ResponseFormat {
        let name = json_schema
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("structured_output")
            .to_string();
        ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                name,
                description: None,
                schema: Some(json_schema),
                strict: Some(false),
            },
        }
    }

    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        response_format: Option<ResponseFormat>,
    ) -> Result<String> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(self.model.clone());
        builder.messages(messages);
        if let Some(format) = response_format {
            builder.response_format(format);
        }
        let request = builder
            .build()
            .map_err(|e| GrowthFlowError::Runtime(e.to_string()))?;

        let raw = self.post_chat_completion(&request).await?;
        Self::extract_text_from_value(&raw)
            .ok_or_else(|| GrowthFlowError::Runtime("Empty chat response".to_string()))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate_structured(
        &self,
        prompt: &str,
        system_prompt: &str,
        json_schema: Value,
    ) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = Self::build_system_message(system_prompt)? {
            messages.push(system);
        }
        messages.push(Self::build_user_text_message(prompt)?);

        self.complete(messages, Some(Self::json_schema_format(json_schema)))
            .await
    }

    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = Self::build_system_message(system_prompt)? {
            messages.push(system);
        }
        messages.extend(Self::build_history_messages(history)?);
        messages.push(Self::build_user_text_message(message)?);

        self.complete(messages, None).await
    }
}
