//! Bootstrap layer — modules that run before the chat pipeline starts.
//!
//! - **logger** — tracing-subscriber initialisation.

pub mod logger;
