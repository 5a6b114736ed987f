#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use growthflow::domains::chat::ChatMessage;
use growthflow::domains::intake::{DigitalSetup, IntakeRecord, PrimaryGoal};
use growthflow::error::{GrowthFlowError, Result};
use growthflow::interfaces::providers::LlmProvider;
use growthflow::services::strategy::StrategyClient;
use growthflow::session::SessionController;

#[derive(Debug, Clone)]
pub struct StructuredCall {
    pub prompt: String,
    pub system_prompt: String,
    pub json_schema: Value,
}

#[derive(Debug, Clone)]
pub struct ChatCall {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

/// Replays queued replies in order and records every request.
///
/// An exhausted structured queue fails; an exhausted chat queue echoes.
#[derive(Default)]
pub struct QueueLlmProvider {
    structured: Mutex<VecDeque<Result<String>>>,
    chat: Mutex<VecDeque<Result<String>>>,
    pub structured_calls: Mutex<Vec<StructuredCall>>,
    pub chat_calls: Mutex<Vec<ChatCall>>,
}

impl QueueLlmProvider {
    pub fn new(structured: Vec<Result<String>>) -> Self {
        Self {
            structured: Mutex::new(structured.into()),
            ..Self::default()
        }
    }

    pub fn with_chat(self, replies: Vec<Result<String>>) -> Self {
        *self.chat.lock().unwrap() = replies.into();
        self
    }

    pub fn structured_count(&self) -> usize {
        self.structured_calls.lock().unwrap().len()
    }

    pub fn chat_count(&self) -> usize {
        self.chat_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for QueueLlmProvider {
    async fn generate_structured(
        &self,
        prompt: &str,
        system_prompt: &str,
        json_schema: Value,
    ) -> Result<String> {
        self.structured_calls.lock().unwrap().push(StructuredCall {
            prompt: prompt.to_string(),
            system_prompt: system_prompt.to_string(),
            json_schema,
        });
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GrowthFlowError::Runtime("no scripted reply".to_string())))
    }

    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        self.chat_calls.lock().unwrap().push(ChatCall {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
            message: message.to_string(),
        });
        self.chat
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("echo: {message}")))
    }
}

/// Every request fails at the transport.
#[derive(Default)]
pub struct FailingLlmProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for FailingLlmProvider {
    async fn generate_structured(&self, _: &str, _: &str, _: Value) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GrowthFlowError::Http("connection refused".to_string()))
    }

    async fn chat(&self, _: &str, _: &[ChatMessage], _: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GrowthFlowError::Http("connection refused".to_string()))
    }
}

/// Holds each request until the test opens the gate.
pub struct GatedLlmProvider {
    structured_reply: String,
    pub entered: Notify,
    pub gate: Notify,
    pub calls: AtomicUsize,
}

impl GatedLlmProvider {
    pub fn new(structured_reply: String) -> Self {
        Self {
            structured_reply,
            entered: Notify::new(),
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for GatedLlmProvider {
    async fn generate_structured(&self, _: &str, _: &str, _: Value) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(self.structured_reply.clone())
    }

    async fn chat(&self, _: &str, _: &[ChatMessage], message: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(format!("reply to {message}"))
    }
}

pub fn controller(provider: Arc<dyn LlmProvider>) -> SessionController {
    SessionController::new(StrategyClient::new(provider), Duration::from_millis(50))
}

pub fn storefront_intake() -> IntakeRecord {
    IntakeRecord {
        business_name: "Copper Kettle Coffee".to_string(),
        product_type: "Small-batch roasted beans".to_string(),
        target_audience: "Home brewers".to_string(),
        target_country: "Canada".to_string(),
        current_problem: "Traffic but few checkouts".to_string(),
        budget: "$500/month".to_string(),
        current_setup: DigitalSetup::Storefront,
        url: Some("https://copperkettle.example".to_string()),
        main_goal: PrimaryGoal::Sales,
    }
}

/// `{businessName:"Nexus Labs", productType:"eco candles", currentProblem:"no traffic",
/// currentSetup:"No Website", mainGoal:"Sales"}`, everything else left blank.
pub fn nexus_labs_intake() -> IntakeRecord {
    serde_json::from_value(json!({
        "businessName": "Nexus Labs",
        "productType": "eco candles",
        "currentProblem": "no traffic",
        "currentSetup": "No Website",
        "mainGoal": "Sales"
    }))
    .unwrap()
}

pub fn strategy_value(kind: &str) -> Value {
    json!({
        "type": kind,
        "healthScore": 42,
        "onPageAudit": [
            {"issue": "Missing meta descriptions", "impact": "Low CTR", "solution": "Write unique descriptions", "priority": "HIGH"}
        ],
        "technicalAudit": [
            {"issue": "Slow LCP", "impact": "Rankings drop", "solution": "Compress hero image", "priority": "MEDIUM"}
        ],
        "topPriorityFixes": ["Fix checkout trust badges", "Speed up mobile"],
        "roadmap": [
            {"day": 2, "phase": 1, "title": "Compress images", "description": "", "goal": "Speed", "creativeFocus": ""},
            {"day": 1, "phase": 1, "title": "Rewrite titles", "description": "", "goal": "CTR", "creativeFocus": ""}
        ],
        "adSocialStrategy": {
            "overallTone": "Warm",
            "paidAdFocus": "Retarget cart abandoners",
            "platformSuggestions": []
        },
        "dailyMetrics": [{"metricName": "Sessions", "targetValue": "150"}]
    })
}

pub fn strategy_body(kind: &str) -> String {
    strategy_value(kind).to_string()
}
