//! chatgpt-relay — forwards `<trigger> <text>` chat lines to an
//! OpenAI-compatible chat-completion API and relays the reply.

pub mod bootstrap;
pub mod core;
pub mod llm;
pub mod subsystems;

pub use bootstrap::logger;
pub use self::core::{config, error};
