//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! Fields whose default depends on the deployment profile stay `Option`
//! here; the `load` module fills them in.

use std::collections::BTreeMap;

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub supervisor: RawSupervisor,
    #[serde(default)]
    pub chat: RawChat,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub catalog: RawCatalog,
    #[serde(default)]
    pub render: RawRender,
}

#[derive(Deserialize)]
pub(super) struct RawSupervisor {
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RawSupervisor {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            work_dir: default_work_dir(),
            log_level: default_log_level(),
        }
    }
}

// ── Chat ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawChat {
    #[serde(default = "default_trigger_word")]
    pub trigger_word: String,
    #[serde(default = "default_ack_message")]
    pub ack_message: String,
    #[serde(default = "default_error_message")]
    pub error_message: String,
    #[serde(default)]
    pub picture_mode: bool,
}

impl Default for RawChat {
    fn default() -> Self {
        Self {
            trigger_word: default_trigger_word(),
            ack_message: default_ack_message(),
            error_message: default_error_message(),
            picture_mode: false,
        }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub api_address: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default)]
    pub frequency_penalty: f32,
    #[serde(default)]
    pub presence_penalty: f32,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub default_headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            profile: default_profile(),
            api_address: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
            system_prompt: None,
            default_headers: None,
            timeout_seconds: None,
        }
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawCatalog {
    #[serde(default = "default_catalog_url")]
    pub url: String,
    #[serde(default)]
    pub fallback: Option<Vec<String>>,
}

impl Default for RawCatalog {
    fn default() -> Self {
        Self { url: default_catalog_url(), fallback: None }
    }
}

// ── Render ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawRender {
    #[serde(default = "default_render_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_render_title")]
    pub title: String,
    #[serde(default = "default_avatar_url")]
    pub avatar_url: String,
    #[serde(default = "default_stylesheet_url")]
    pub stylesheet_url: String,
    #[serde(default = "default_render_output_dir")]
    pub output_dir: String,
}

impl Default for RawRender {
    fn default() -> Self {
        Self {
            endpoint: default_render_endpoint(),
            title: default_render_title(),
            avatar_url: default_avatar_url(),
            stylesheet_url: default_stylesheet_url(),
            output_dir: default_render_output_dir(),
        }
    }
}

// ── Default functions (used by serde) ────────────────────────────────────────

fn default_bot_name() -> String {
    "chatgpt-relay".to_string()
}
fn default_work_dir() -> String {
    "~/.chatgpt-relay".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

fn default_trigger_word() -> String {
    "chat".to_string()
}
fn default_ack_message() -> String {
    "Request in progress, please wait...".to_string()
}
fn default_error_message() -> String {
    "Something went wrong with the response, please contact the administrator.".to_string()
}

fn default_llm_provider() -> String {
    "openai-compatible".to_string()
}
fn default_profile() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_temperature() -> f32 {
    1.0
}
fn default_max_tokens() -> u32 {
    100
}
fn default_top_p() -> f32 {
    1.0
}

fn default_catalog_url() -> String {
    "https://openrouter.ai/api/v1/models".to_string()
}

fn default_render_endpoint() -> String {
    "http://127.0.0.1:3000/screenshot".to_string()
}
fn default_render_title() -> String {
    "ChatGPT".to_string()
}
fn default_avatar_url() -> String {
    "https://pic.sky390.cn/pics/2023/03/09/6409690ebc4df.png".to_string()
}
fn default_stylesheet_url() -> String {
    "https://cdn.jsdelivr.net/npm/@tabler/core@1.0.0-beta17/dist/css/tabler.min.css".to_string()
}
fn default_render_output_dir() -> String {
    "renders".to_string()
}
