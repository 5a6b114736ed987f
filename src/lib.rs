pub mod config;
pub mod dashboard;
pub mod domains;
pub mod error;
pub mod interfaces;
pub mod logging;
pub mod prompts;
pub mod providers;
pub mod render;
pub mod runtime_paths;
pub mod services;
pub mod session;
pub mod session_fsm;
pub mod ticker;

pub type Result<T> = std::result::Result<T, error::GrowthFlowError>;
