//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `RELAY_WORK_DIR`, `RELAY_LOG_LEVEL` and `LLM_API_KEY`.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::raw::RawConfig;
use super::types::*;

/// Values taken from the environment rather than the TOML file.
/// Tests build this directly instead of mutating process env.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub work_dir: Option<String>,
    pub log_level: Option<String>,
    pub api_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            work_dir: env::var("RELAY_WORK_DIR").ok(),
            log_level: env::var("RELAY_LOG_LEVEL").ok(),
            api_key: env::var("LLM_API_KEY").ok(),
        }
    }
}

/// Deep-merge two TOML values. Tables merge recursively; anything else in
/// the overlay replaces the base value.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read `path`, follow its `[meta] base` chain and return the merged value.
/// `visited` holds canonical paths already seen so cycles fail fast.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base_ref = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str());

    match base_ref {
        Some(base_str) => {
            let base_path = if Path::new(base_str).is_absolute() {
                PathBuf::from(base_str)
            } else {
                path.parent().unwrap_or(Path::new(".")).join(base_str)
            };
            let base_val = load_raw_merged(&base_path, visited)?;
            Ok(merge_toml(base_val, overlay_val))
        }
        None => Ok(overlay_val),
    }
}

/// Load config from the given path, else `config/default.toml`, else the
/// built-in defaults; then apply environment overrides.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        resolve(RawConfig::default(), &overrides)
    }
}

/// Blank stop sequences are dropped; nothing left means no `stop` at all.
fn non_blank_stop(stop: Option<Vec<String>>) -> Option<Vec<String>> {
    let kept: Vec<String> = stop?.into_iter().filter(|s| !s.trim().is_empty()).collect();
    (!kept.is_empty()).then_some(kept)
}

/// Load an explicit file (following its base chain) with the given overrides.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    resolve(parsed, overrides)
}

/// Turn the raw file shape into resolved [`Config`], filling profile
/// defaults and validating what the pipeline relies on.
fn resolve(parsed: RawConfig, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let s = parsed.supervisor;
    let work_dir = expand_home(overrides.work_dir.as_deref().unwrap_or(&s.work_dir));
    let log_level = overrides.log_level.clone().unwrap_or(s.log_level);
    crate::logger::parse_level(&log_level)
        .map_err(|e| AppError::Config(format!("supervisor.log_level: {e}")))?;

    let chat = parsed.chat;
    if chat.trigger_word.is_empty() || chat.trigger_word.chars().any(char::is_whitespace) {
        return Err(AppError::Config(format!(
            "chat.trigger_word must be a single non-empty word, got '{}'",
            chat.trigger_word
        )));
    }

    let llm = parsed.llm;
    let profile = Profile::parse(&llm.profile).ok_or_else(|| {
        AppError::Config(format!(
            "unknown llm.profile '{}' (expected 'openai' or 'openrouter')",
            llm.profile
        ))
    })?;

    let api_key = overrides.api_key.clone().filter(|k| !k.trim().is_empty());
    if llm.provider != "dummy" && api_key.is_none() {
        return Err(AppError::Config(format!(
            "LLM_API_KEY is required for provider '{}'",
            llm.provider
        )));
    }

    let system_prompt = match llm.system_prompt {
        Some(p) if p.is_empty() => None,
        Some(p) => Some(p),
        None => profile.default_system_prompt(),
    };

    let catalog_fallback = match parsed.catalog.fallback {
        Some(list) if list.is_empty() => {
            return Err(AppError::Config("catalog.fallback must not be empty".into()));
        }
        Some(list) => list,
        None => profile.fallback_models(),
    };

    let output_dir = {
        let p = PathBuf::from(&parsed.render.output_dir);
        if p.is_absolute() { p } else { work_dir.join(p) }
    };

    Ok(Config {
        bot_name: s.bot_name,
        work_dir,
        log_level,
        chat: ChatConfig {
            trigger_word: chat.trigger_word,
            ack_message: chat.ack_message,
            error_message: chat.error_message,
            picture_mode: chat.picture_mode,
        },
        llm: LlmConfig {
            provider: llm.provider,
            profile,
            api_address: llm
                .api_address
                .unwrap_or_else(|| profile.default_api_address().to_string()),
            api_key,
            model: llm.model,
            sampling: SamplingParams {
                temperature: llm.temperature,
                max_tokens: llm.max_tokens,
                top_p: llm.top_p,
                frequency_penalty: llm.frequency_penalty,
                presence_penalty: llm.presence_penalty,
            },
            stop: non_blank_stop(llm.stop),
            system_prompt,
            default_headers: llm.default_headers.unwrap_or_else(|| profile.default_headers()),
            timeout_seconds: llm.timeout_seconds,
        },
        catalog: CatalogConfig {
            url: parsed.catalog.url,
            fallback: catalog_fallback,
        },
        render: RenderConfig {
            endpoint: parsed.render.endpoint,
            title: parsed.render.title,
            avatar_url: parsed.render.avatar_url,
            stylesheet_url: parsed.render.stylesheet_url,
            output_dir,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
