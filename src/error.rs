use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrowthFlowError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    #[error("invalid transition: {0}")]
    Transition(String),
    #[error("request already in flight: {0}")]
    Busy(String),
}

impl GrowthFlowError {
    /// Errors that send the session back to onboarding rather than aborting.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            GrowthFlowError::Http(_)
                | GrowthFlowError::Serialization(_)
                | GrowthFlowError::Runtime(_)
                | GrowthFlowError::GenerationFailed(_)
        )
    }
}

pub use crate::Result;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_category_prefix() {
        let err = GrowthFlowError::Config("x".to_string());
        assert!(format!("{err}").contains("configuration error"));
        let err = GrowthFlowError::GenerationFailed("empty body".to_string());
        assert_eq!(format!("{err}"), "generation failed: empty body");
    }

    #[test]
    fn classifies_generation_failures() {
        assert!(GrowthFlowError::Http("503".to_string()).is_generation_failure());
        assert!(GrowthFlowError::GenerationFailed("x".to_string()).is_generation_failure());
        assert!(!GrowthFlowError::Validation("x".to_string()).is_generation_failure());
        assert!(!GrowthFlowError::Busy("x".to_string()).is_generation_failure());
    }
}
