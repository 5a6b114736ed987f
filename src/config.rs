use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{GrowthFlowError, Result};

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 2500;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub status_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    pub openai: Option<OpenAiConfig>,
    pub session: Option<SessionConfig>,
}

/// Values supplied on the command line or through `GROWTHFLOW_*` variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn convention_defaults() -> Self {
        Self {
            openai: Some(OpenAiConfig {
                api_key: None,
                model: Some(DEFAULT_MODEL.to_string()),
                base_url: Some(DEFAULT_BASE_URL.to_string()),
            }),
            session: Some(SessionConfig {
                status_interval_ms: Some(DEFAULT_STATUS_INTERVAL_MS),
            }),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            GrowthFlowError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| GrowthFlowError::Config(format!("invalid {}: {e}", path.display())))
    }

    /// Loads `path` when given (it must exist), otherwise the platform default
    /// file if present, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = crate::runtime_paths::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::convention_defaults())
                }
            }
        }
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let openai = self.openai.get_or_insert_with(OpenAiConfig::default);
        if let Some(api_key) = non_empty(overrides.api_key) {
            openai.api_key = Some(api_key);
        }
        if let Some(model) = non_empty(overrides.model) {
            openai.model = Some(model);
        }
        if let Some(base_url) = non_empty(overrides.base_url) {
            openai.base_url = Some(base_url);
        }
        self
    }

    /// Fills a missing key from `OPENAI_API_KEY`.
    pub fn resolve_env(mut self) -> Self {
        let openai = self.openai.get_or_insert_with(OpenAiConfig::default);
        if non_empty(openai.api_key.clone()).is_none() {
            openai.api_key = non_empty(std::env::var("OPENAI_API_KEY").ok());
        }
        self
    }

    pub fn model(&self) -> String {
        self.openai
            .as_ref()
            .and_then(|openai| non_empty(openai.model.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn base_url(&self) -> String {
        self.openai
            .as_ref()
            .and_then(|openai| non_empty(openai.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// A key is mandatory for the hosted API; local compatible servers may
    /// run without one.
    pub fn api_key(&self) -> Result<String> {
        let key = self
            .openai
            .as_ref()
            .and_then(|openai| non_empty(openai.api_key.clone()));
        match key {
            Some(key) => Ok(key),
            None if self.base_url() != DEFAULT_BASE_URL => Ok(String::new()),
            None => Err(GrowthFlowError::Config(
                "missing API key: set GROWTHFLOW_API_KEY, OPENAI_API_KEY or openai.api_key"
                    .to_string(),
            )),
        }
    }

    pub fn status_interval(&self) -> Duration {
        let millis = self
            .session
            .as_ref()
            .and_then(|session| session.status_interval_ms)
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_STATUS_INTERVAL_MS);
        Duration::from_millis(millis)
    }
}
