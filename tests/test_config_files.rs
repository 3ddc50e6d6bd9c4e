//! Tests for the shipped configuration files under config/

use std::path::Path;

use chatgpt_relay::config::{EnvOverrides, Profile, load_from};

fn with_key() -> EnvOverrides {
    EnvOverrides { api_key: Some("sk-test".into()), ..EnvOverrides::default() }
}

#[test]
fn test_default_config_loads() {
    let cfg = load_from(Path::new("config/default.toml"), &with_key()).unwrap();
    assert_eq!(cfg.llm.profile, Profile::OpenAi);
    assert_eq!(cfg.chat.trigger_word, "chat");
    assert_eq!(cfg.chat.ack_message, "Request in progress, please wait...");
    assert!(cfg.llm.stop.is_none(), "empty stop list should resolve to none");
    assert!(cfg.llm.system_prompt.is_none());
    assert!(cfg.render.output_dir.ends_with("renders"));
}

#[test]
fn test_default_config_requires_key() {
    let result = load_from(Path::new("config/default.toml"), &EnvOverrides::default());
    assert!(result.is_err(), "openai-compatible provider without a key must not load");
}

#[test]
fn test_openrouter_overlay() {
    let cfg = load_from(Path::new("config/openrouter.toml"), &with_key()).unwrap();
    assert_eq!(cfg.llm.profile, Profile::OpenRouter);
    assert_eq!(cfg.llm.api_address, "https://openrouter.ai/api/v1");
    assert_eq!(cfg.llm.system_prompt.as_deref(), Some("You are a helpful poet assistant."));
    assert!(cfg.llm.default_headers.contains_key("HTTP-Referer"));
    assert!(cfg.llm.default_headers.contains_key("X-Title"));
    assert_eq!(cfg.catalog.fallback.len(), 2);
    // Inherited from the base file.
    assert_eq!(cfg.chat.trigger_word, "chat");
    assert_eq!(cfg.llm.sampling.max_tokens, 100);
}
