//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the chat pipeline consumes.
//! Raw TOML deserialization types live in `raw.rs`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// ── Profile ──────────────────────────────────────────────────────────────────

/// Deployment profile. The two supported deployments differ only in their
/// defaults: endpoint, fallback model list, system prompt and extra headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    OpenAi,
    OpenRouter,
}

impl Profile {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(Self::OpenAi),
            "openrouter" => Some(Self::OpenRouter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
        }
    }

    pub fn default_api_address(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Models offered when the catalog endpoint cannot be reached.
    pub fn fallback_models(self) -> Vec<String> {
        let ids: &[&str] = match self {
            Self::OpenAi => &["gpt-3.5-turbo"],
            Self::OpenRouter => &["gpt-3.5-turbo", "google/gemini-pro"],
        };
        ids.iter().map(|s| s.to_string()).collect()
    }

    pub fn default_system_prompt(self) -> Option<String> {
        match self {
            Self::OpenAi => None,
            Self::OpenRouter => Some("You are a helpful poet assistant.".to_string()),
        }
    }

    pub fn default_headers(self) -> BTreeMap<String, String> {
        match self {
            Self::OpenAi => BTreeMap::new(),
            Self::OpenRouter => BTreeMap::from([
                ("HTTP-Referer".to_string(), "http://localhost".to_string()),
                ("X-Title".to_string(), "chatgpt-relay".to_string()),
            ]),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Chat command ─────────────────────────────────────────────────────────────

/// Command-level settings. Populated from `[chat]`.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Keyword that activates the command (`<trigger_word> <text>`).
    pub trigger_word: String,
    /// Sent immediately when a command is accepted.
    pub ack_message: String,
    /// Sent instead of a reply whenever the completion fails.
    pub error_message: String,
    /// Render every outbound message as an image.
    pub picture_mode: bool,
}

// ── LLM ──────────────────────────────────────────────────────────────────────

/// Sampling parameters copied verbatim into every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 100,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// Completion endpoint configuration. Populated from `[llm]`; the API key
/// comes from `LLM_API_KEY` and never from TOML.
#[derive(Clone)]
pub struct LlmConfig {
    /// `"openai-compatible"` or `"dummy"`.
    pub provider: String,
    pub profile: Profile,
    /// Base address; `/chat/completions` is appended per request.
    pub api_address: String,
    pub api_key: Option<String>,
    pub model: String,
    pub sampling: SamplingParams,
    /// `None` is sent as `"stop": null`. An empty list resolves to `None`.
    pub stop: Option<Vec<String>>,
    /// Prepended as a `system` message when present.
    pub system_prompt: Option<String>,
    /// Extra headers sent with every completion request.
    pub default_headers: BTreeMap<String, String>,
    /// No timeout when unset.
    pub timeout_seconds: Option<u64>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("profile", &self.profile)
            .field("api_address", &self.api_address)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("sampling", &self.sampling)
            .field("stop", &self.stop)
            .field("system_prompt", &self.system_prompt)
            .field("default_headers", &self.default_headers)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

/// Model catalog endpoint. Populated from `[catalog]`.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub url: String,
    /// Never empty; defaults to the profile's fallback list.
    pub fallback: Vec<String>,
}

// ── Render ───────────────────────────────────────────────────────────────────

/// Picture-mode template and rendering collaborator. Populated from `[render]`.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Screenshot service that turns HTML into a PNG.
    pub endpoint: String,
    /// Name shown in the message header.
    pub title: String,
    pub avatar_url: String,
    pub stylesheet_url: String,
    /// Directory where console sessions write rendered images.
    pub output_dir: PathBuf,
}

// ── Top-level ────────────────────────────────────────────────────────────────

/// Fully resolved configuration. Built once at startup and shared by `Arc`.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub work_dir: PathBuf,
    pub log_level: String,
    pub chat: ChatConfig,
    pub llm: LlmConfig,
    pub catalog: CatalogConfig,
    pub render: RenderConfig,
}
