//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the path given with `-f`), then applies environment overrides.
//!
//! # Module layout
//!
//! - **types** — Resolved structs consumed by the pipeline
//!   (`Config`, `ChatConfig`, `LlmConfig`, …).
//! - **raw** — TOML deserialization shapes with serde defaults; private.
//! - **load** — `merge_toml`, base-chain resolution, `load`, `load_from`,
//!   `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{EnvOverrides, expand_home, load, load_from};
pub use types::*;

impl Config {
    /// Offline configuration: dummy provider, no API key, no network.
    pub fn test_default(work_dir: &std::path::Path) -> Self {
        let profile = Profile::OpenAi;
        Self {
            bot_name: "test".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            chat: ChatConfig {
                trigger_word: "chat".into(),
                ack_message: "working on it".into(),
                error_message: "something broke".into(),
                picture_mode: false,
            },
            llm: LlmConfig {
                provider: "dummy".into(),
                profile,
                api_address: "http://localhost:0/v1".into(),
                api_key: None,
                model: "gpt-3.5-turbo".into(),
                sampling: SamplingParams::default(),
                stop: None,
                system_prompt: None,
                default_headers: profile.default_headers(),
                timeout_seconds: Some(1),
            },
            catalog: CatalogConfig {
                url: "http://localhost:0/models".into(),
                fallback: profile.fallback_models(),
            },
            render: RenderConfig {
                endpoint: "http://localhost:0/screenshot".into(),
                title: "ChatGPT".into(),
                avatar_url: String::new(),
                stylesheet_url: String::new(),
                output_dir: work_dir.join("renders"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[supervisor]
bot_name = "test-bot"
work_dir = "~/.relay"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn with_key() -> EnvOverrides {
        EnvOverrides { api_key: Some("sk-test".into()), ..EnvOverrides::default() }
    }

    #[test]
    fn minimal_file_gets_documented_defaults() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &with_key()).unwrap();
        assert_eq!(cfg.bot_name, "test-bot");
        assert_eq!(cfg.chat.trigger_word, "chat");
        assert!(!cfg.chat.picture_mode);
        assert_eq!(cfg.llm.profile, Profile::OpenAi);
        assert_eq!(cfg.llm.api_address, "https://api.openai.com/v1");
        assert_eq!(cfg.llm.model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.sampling, SamplingParams::default());
        assert_eq!(cfg.llm.sampling.max_tokens, 100);
        assert!(cfg.llm.stop.is_none());
        assert!(cfg.llm.system_prompt.is_none());
        assert!(cfg.llm.default_headers.is_empty());
        assert!(cfg.llm.timeout_seconds.is_none());
        assert_eq!(cfg.catalog.url, "https://openrouter.ai/api/v1/models");
        assert_eq!(cfg.catalog.fallback, vec!["gpt-3.5-turbo".to_string()]);
        assert!(cfg.render.avatar_url.starts_with("https://"));
    }

    #[test]
    fn openrouter_profile_defaults() {
        let f = write_toml("[llm]\nprofile = \"openrouter\"\n");
        let cfg = load_from(f.path(), &with_key()).unwrap();
        assert_eq!(cfg.llm.api_address, "https://openrouter.ai/api/v1");
        assert_eq!(
            cfg.catalog.fallback,
            vec!["gpt-3.5-turbo".to_string(), "google/gemini-pro".to_string()]
        );
        assert!(cfg.llm.system_prompt.as_deref().unwrap().contains("poet"));
        assert!(cfg.llm.default_headers.contains_key("HTTP-Referer"));
        assert!(cfg.llm.default_headers.contains_key("X-Title"));
    }

    #[test]
    fn explicit_values_beat_profile_defaults() {
        let toml = r#"
[llm]
profile = "openrouter"
api_address = "http://127.0.0.1:9000/v1"
system_prompt = ""
stop = ["\n\n", "END"]

[llm.default_headers]
X-Title = "my bot"
"#;
        let f = write_toml(toml);
        let cfg = load_from(f.path(), &with_key()).unwrap();
        assert_eq!(cfg.llm.api_address, "http://127.0.0.1:9000/v1");
        assert!(cfg.llm.system_prompt.is_none());
        assert_eq!(cfg.llm.stop, Some(vec!["\n\n".to_string(), "END".to_string()]));
        assert_eq!(cfg.llm.default_headers.len(), 1);
        assert_eq!(cfg.llm.default_headers["X-Title"], "my bot");
    }

    #[test]
    fn empty_stop_list_resolves_to_none() {
        let f = write_toml("[llm]\nstop = []\n");
        let cfg = load_from(f.path(), &with_key()).unwrap();
        assert!(cfg.llm.stop.is_none());
    }

    #[test]
    fn blank_stop_entries_are_dropped() {
        let f = write_toml("[llm]\nstop = [\"\", \"  \"]\n");
        let cfg = load_from(f.path(), &with_key()).unwrap();
        assert!(cfg.llm.stop.is_none());

        let f = write_toml("[llm]\nstop = [\"\", \"END\"]\n");
        let cfg = load_from(f.path(), &with_key()).unwrap();
        assert_eq!(cfg.llm.stop, Some(vec!["END".to_string()]));
    }

    #[test]
    fn missing_api_key_errors_for_http_provider() {
        let f = write_toml(MINIMAL_TOML);
        let err = load_from(f.path(), &EnvOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("LLM_API_KEY"));

        let blank = EnvOverrides { api_key: Some("  ".into()), ..EnvOverrides::default() };
        assert!(load_from(f.path(), &blank).is_err());
    }

    #[test]
    fn dummy_provider_needs_no_key() {
        let f = write_toml("[llm]\nprovider = \"dummy\"\n");
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.llm.provider, "dummy");
        assert!(cfg.llm.api_key.is_none());
    }

    #[test]
    fn unknown_profile_errors() {
        let f = write_toml("[llm]\nprofile = \"azure\"\n");
        let err = load_from(f.path(), &with_key()).unwrap_err();
        assert!(err.to_string().contains("azure"));
    }

    #[test]
    fn multi_word_trigger_rejected() {
        let f = write_toml("[chat]\ntrigger_word = \"ask gpt\"\n");
        assert!(load_from(f.path(), &with_key()).is_err());
    }

    #[test]
    fn unknown_log_level_rejected() {
        let f = write_toml("[supervisor]\nlog_level = \"loud\"\n");
        assert!(load_from(f.path(), &with_key()).is_err());
    }

    #[test]
    fn empty_catalog_fallback_rejected() {
        let f = write_toml("[catalog]\nfallback = []\n");
        assert!(load_from(f.path(), &with_key()).is_err());
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &with_key()).unwrap();
        let dbg = format!("{:?}", cfg.llm);
        assert!(!dbg.contains("sk-test"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn env_overrides_apply() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            work_dir: Some("/tmp/relay-override".into()),
            log_level: Some("debug".into()),
            api_key: Some("sk".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.work_dir, std::path::PathBuf::from("/tmp/relay-override"));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.render.output_dir, std::path::PathBuf::from("/tmp/relay-override/renders"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.relay");
        assert!(expanded.starts_with(&home));
        assert_eq!(expand_home("/absolute/path"), std::path::PathBuf::from("/absolute/path"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(std::path::Path::new("/nonexistent/config.toml"), &with_key());
        assert!(result.unwrap_err().to_string().contains("config error"));
    }

    const BASE_TOML: &str = r#"
[supervisor]
bot_name = "base-bot"

[chat]
trigger_word = "gpt"

[llm]
model = "gpt-base"
temperature = 0.1
"#;

    fn write_named(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        std::fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn overlay_keeps_base_fields_and_wins_scalars() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[llm]
model = "gpt-overlay"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, &with_key()).unwrap();
        assert_eq!(cfg.bot_name, "base-bot");
        assert_eq!(cfg.chat.trigger_word, "gpt");
        assert_eq!(cfg.llm.model, "gpt-overlay");
        assert_eq!(cfg.llm.sampling.temperature, 0.1);
    }

    #[test]
    fn cycle_detection() {
        let dir = TempDir::new().unwrap();
        let self_path = dir.path().join("self.toml");
        let content = format!("[meta]\nbase = \"{}\"\n\n{BASE_TOML}", self_path.display());
        std::fs::write(&self_path, content).unwrap();
        let msg = load_from(&self_path, &with_key()).unwrap_err().to_string();
        assert!(msg.contains("circular"));
    }
}
