//! Application-wide error types.
//!
//! Completion failures have their own typed enum in [`crate::llm::ProviderError`];
//! they never reach this level because the chat command recovers them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("comms error: {0}")]
    Comms(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
