pub mod chat;
pub mod intake;
pub mod strategy;
