//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities; clone them freely.
//! The request payload is built by [`request::build_request`]; the model
//! list shown to operators comes from [`catalog::fetch_available_models`].

pub mod catalog;
pub mod providers;
pub mod request;

use thiserror::Error;

pub use catalog::{ModelCatalog, fetch_available_models};
pub use request::{ChatMessage, ChatRequest, Role, build_request};

// ── Error ─────────────────────────────────────────────────────────────────────

/// Why a completion (or catalog fetch) did not produce a usable answer.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("invalid provider setup: {0}")]
    Setup(String),
    /// Transport failure: DNS, connect, TLS, reset while reading the body.
    #[error("network error: {0}")]
    Network(String),
    /// The API answered with a non-2xx status.
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    /// A 2xx body that is not the expected JSON shape.
    #[error("failed to parse response body: {0}")]
    Parse(String),
    #[error("response contained no choices")]
    EmptyChoices,
    #[error("first choice carries no message content")]
    MissingContent,
}

impl ProviderError {
    /// HTTP status when the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownProvider(_) | Self::Setup(_) => "setup",
            Self::Network(_) => "network",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::Parse(_) => "parse",
            Self::EmptyChoices | Self::MissingContent => "malformed",
        }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// One round-trip: send `request`, return `choices[0].message.content`.
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.complete(request).await,
            LlmProvider::Dummy(p) => p.complete(request).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAiCompatible(_) => "openai-compatible",
            LlmProvider::Dummy(_) => "dummy",
        }
    }
}
