use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client;

/// Application configuration loaded from environment variables.
/// Only the listen port and tuning knobs have defaults; a missing API key
/// disables external question generation instead of failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub question_seed: Option<u64>,
    pub data_dir: PathBuf,
    /// Idle time after which an in-memory session is dropped.
    pub session_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            llm_model: optional_env("LLM_MODEL")
                .unwrap_or_else(|| llm_client::DEFAULT_MODEL.to_string()),
            llm_timeout: Duration::from_secs(
                optional_env("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            question_seed: optional_env("QUESTION_SEED")
                .map(|s| s.parse::<u64>())
                .transpose()
                .context("QUESTION_SEED must be an unsigned integer")?,
            data_dir: PathBuf::from(optional_env("DATA_DIR").unwrap_or_else(|| "data".to_string())),
            session_ttl: Duration::from_secs(
                optional_env("SESSION_TTL_SECS")
                    .unwrap_or_else(|| "3600".to_string())
                    .parse::<u64>()
                    .context("SESSION_TTL_SECS must be a whole number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
