//! Runtime configuration
//!
//! Read once from the environment at startup.

use std::path::PathBuf;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Settings for the chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// None when no API key is set; generation then always falls back
    pub llm: Option<LlmConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_path = get("WELLNESS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let llm = get("OPENAI_API_KEY").or_else(|| get("OPENAI_KEY")).map(|api_key| {
            let timeout_secs = match get("WELLNESS_LLM_TIMEOUT_SECS") {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    tracing::warn!(value = %raw, "ignoring unparsable WELLNESS_LLM_TIMEOUT_SECS");
                    DEFAULT_LLM_TIMEOUT_SECS
                }),
                None => DEFAULT_LLM_TIMEOUT_SECS,
            };
            LlmConfig {
                api_key,
                base_url: get("WELLNESS_LLM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                model: get("WELLNESS_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                timeout_secs,
            }
        });

        Self { database_path, llm }
    }
}

/// `<project>/data/wellness.db`, where the project root is found from the executable path
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("wellness.db");
    path
}
