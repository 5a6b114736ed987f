//! Growth Strategy returned by the external model.
//!
//! The response schema is only a hint to the model, so parsing is defensive:
//! required top-level fields are checked explicitly, everything nested falls
//! back to defaults, and numbers may arrive as strings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{GrowthFlowError, Result};

pub const REQUIRED_FIELDS: [&str; 8] = [
    "type",
    "healthScore",
    "onPageAudit",
    "technicalAudit",
    "topPriorityFixes",
    "roadmap",
    "adSocialStrategy",
    "dailyMetrics",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategyKind {
    Social,
    Seo,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Social => "social",
            StrategyKind::Seo => "seo",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = GrowthFlowError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "social" => Ok(StrategyKind::Social),
            "seo" => Ok(StrategyKind::Seo),
            other => Err(GrowthFlowError::GenerationFailed(format!(
                "unknown strategy type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for StrategyKind {
    type Error = GrowthFlowError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<StrategyKind> for String {
    fn from(value: StrategyKind) -> Self {
        value.as_str().to_string()
    }
}

/// Display-only severity. Unrecognized or non-text values are shown as low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl From<Value> for Priority {
    fn from(value: Value) -> Self {
        let Value::String(text) = value else {
            return Priority::Low;
        };
        match text.trim().to_ascii_uppercase().as_str() {
            "HIGH" | "CRITICAL" => Priority::High,
            "MEDIUM" | "MED" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditFinding {
    #[serde(deserialize_with = "lenient_string")]
    pub issue: String,
    #[serde(deserialize_with = "lenient_string")]
    pub impact: String,
    #[serde(deserialize_with = "lenient_string")]
    pub solution: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformIdea {
    #[serde(deserialize_with = "lenient_string")]
    pub platform: String,
    #[serde(deserialize_with = "lenient_string")]
    pub reasoning: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub content_ideas: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub engagement_tactics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoadmapTask {
    #[serde(deserialize_with = "lenient_u32")]
    pub day: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub phase: u32,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub goal: String,
    #[serde(deserialize_with = "lenient_string")]
    pub creative_focus: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_string"
    )]
    pub why_it_matters: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdSocialStrategy {
    #[serde(deserialize_with = "lenient_list")]
    pub platform_suggestions: Vec<PlatformIdea>,
    #[serde(deserialize_with = "lenient_string")]
    pub overall_tone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub paid_ad_focus: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformPriority {
    #[serde(deserialize_with = "lenient_string")]
    pub platform: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ranking_tips: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketAnalysis {
    #[serde(deserialize_with = "lenient_string")]
    pub competitor_insights: String,
    #[serde(deserialize_with = "lenient_list")]
    pub platform_priority: Vec<PlatformPriority>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyMetric {
    #[serde(deserialize_with = "lenient_string")]
    pub metric_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub target_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStrategy {
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    #[serde(deserialize_with = "lenient_f64")]
    pub health_score: f64,
    #[serde(deserialize_with = "lenient_list")]
    pub on_page_audit: Vec<AuditFinding>,
    #[serde(deserialize_with = "lenient_list")]
    pub technical_audit: Vec<AuditFinding>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub off_page_audit: Vec<AuditFinding>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub conversion_audit: Vec<AuditFinding>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub top_priority_fixes: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub roadmap: Vec<RoadmapTask>,
    #[serde(deserialize_with = "lenient_object")]
    pub ad_social_strategy: AdSocialStrategy,
    #[serde(default, deserialize_with = "lenient_object")]
    pub market_analysis: MarketAnalysis,
    #[serde(deserialize_with = "lenient_list")]
    pub daily_metrics: Vec<DailyMetric>,
}

impl GrowthStrategy {
    /// Parses the raw text returned by a generation call.
    pub fn parse_response(body: &str) -> Result<Self> {
        let payload = strip_code_fence(body);
        if payload.is_empty() {
            return Err(GrowthFlowError::GenerationFailed(
                "model returned an empty response".to_string(),
            ));
        }

        let value: Value = serde_json::from_str(payload).map_err(|e| {
            GrowthFlowError::GenerationFailed(format!("response is not valid JSON: {e}"))
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(GrowthFlowError::GenerationFailed(
                "response is not a JSON object".to_string(),
            ));
        };

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| object.get(*field).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(GrowthFlowError::GenerationFailed(format!(
                "response is missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut value = value;
        prune_nulls(&mut value);
        let mut strategy: GrowthStrategy = serde_json::from_value(value).map_err(|e| {
            GrowthFlowError::GenerationFailed(format!("response has an unexpected shape: {e}"))
        })?;
        strategy.roadmap.sort_by_key(|task| task.day);
        Ok(strategy)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GrowthFlowError::Serialization(e.to_string()))
    }

    /// Whole-number score clamped to 0..=100 for display.
    pub fn display_score(&self) -> u32 {
        if self.health_score.is_finite() {
            self.health_score.round().clamp(0.0, 100.0) as u32
        } else {
            0
        }
    }
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```$").expect("valid fence regex")
});

fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Nulls become absent fields so nested defaults apply.
fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(prune_nulls);
        }
        _ => {}
    }
}

fn text_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_from_value(Value::deserialize(deserializer)?))
}

/// A bare value stands for a one-element list; null for an empty one.
fn list_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

fn lenient_string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(list_items(Value::deserialize(deserializer)?)
        .into_iter()
        .filter_map(text_from_value)
        .filter(|text| !text.trim().is_empty())
        .collect())
}

/// Entries that do not fit `T` are dropped instead of failing the strategy.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(list_items(Value::deserialize(deserializer)?)
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .inspect_err(|err| warn!("skipping malformed strategy entry: {err}"))
                .ok()
        })
        .collect())
}

fn lenient_object<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        warn!("expected an object in strategy, using defaults");
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value)
        .inspect_err(|err| warn!("malformed strategy section, using defaults: {err}"))
        .unwrap_or_default())
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a number, found {value}")))
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(value) => number_from_value(&value)
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.round() as u32)
            .ok_or_else(|| de::Error::custom(format!("expected a whole number, found {value}"))),
    }
}

fn audit_list_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "issue": {"type": "string"},
                "impact": {"type": "string"},
                "solution": {"type": "string"},
                "priority": {"type": "string", "enum": ["HIGH", "MEDIUM", "LOW"]}
            }
        }
    })
}

/// JSON schema sent with generation requests.
pub fn response_schema() -> Value {
    let string_list = json!({"type": "array", "items": {"type": "string"}});
    json!({
        "title": "growth_strategy",
        "type": "object",
        "properties": {
            "type": {"type": "string", "enum": ["social", "seo"]},
            "healthScore": {"type": "number"},
            "onPageAudit": audit_list_schema(),
            "technicalAudit": audit_list_schema(),
            "offPageAudit": audit_list_schema(),
            "conversionAudit": audit_list_schema(),
            "topPriorityFixes": string_list.clone(),
            "roadmap": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "day": {"type": "integer"},
                        "phase": {"type": "integer"},
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "goal": {"type": "string"},
                        "creativeFocus": {"type": "string"}
                    }
                }
            },
            "adSocialStrategy": {
                "type": "object",
                "properties": {
                    "platformSuggestions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "platform": {"type": "string"},
                                "reasoning": {"type": "string"},
                                "contentIdeas": string_list.clone(),
                                "engagementTactics": string_list
                            }
                        }
                    },
                    "overallTone": {"type": "string"},
                    "paidAdFocus": {"type": "string"}
                }
            },
            "marketAnalysis": {
                "type": "object",
                "properties": {
                    "competitorInsights": {"type": "string"},
                    "platformPriority": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "platform": {"type": "string"},
                                "rankingTips": {"type": "string"}
                            }
                        }
                    }
                }
            },
            "dailyMetrics": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "metricName": {"type": "string"},
                        "targetValue": {"type": "string"}
                    }
                }
            }
        },
        "required": REQUIRED_FIELDS
    })
}
