use std::time::Duration;

use anyhow::{ensure, Context, Result};

/// Bounds for the enrichment settings; larger values would keep a session in
/// `Analyzing` for minutes.
pub const MAX_ENRICHMENT_RETRIES: u32 = 5;
pub const MAX_ENRICHMENT_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
/// Every backend is optional: without Redis the store is in-memory, and without a
/// recommendation backend every assessment completes on the fallback dataset.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub redis_url: Option<String>,
    pub recommendation_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// Messages-compatible gateway in front of the Anthropic API.
    pub anthropic_base_url: Option<String>,
    pub enrichment_timeout_secs: u64,
    pub enrichment_max_retries: u32,
    pub clear_progress_on_complete: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            redis_url: optional_env("REDIS_URL"),
            recommendation_url: optional_env("RECOMMENDATION_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_base_url: optional_env("ANTHROPIC_BASE_URL"),
            enrichment_timeout_secs: parse_env("ENRICHMENT_TIMEOUT_SECS", 30)?,
            enrichment_max_retries: parse_env("ENRICHMENT_MAX_RETRIES", 2)?,
            clear_progress_on_complete: parse_env("CLEAR_PROGRESS_ON_COMPLETE", false)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.enrichment_max_retries <= MAX_ENRICHMENT_RETRIES,
            "ENRICHMENT_MAX_RETRIES must be at most {MAX_ENRICHMENT_RETRIES}, got {}",
            self.enrichment_max_retries
        );
        ensure!(
            (1..=MAX_ENRICHMENT_TIMEOUT_SECS).contains(&self.enrichment_timeout_secs),
            "ENRICHMENT_TIMEOUT_SECS must be between 1 and {MAX_ENRICHMENT_TIMEOUT_SECS}, got {}",
            self.enrichment_timeout_secs
        );
        Ok(())
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_secs)
    }
}

/// Defaults match an environment with nothing set.
impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            redis_url: None,
            recommendation_url: None,
            anthropic_api_key: None,
            anthropic_base_url: None,
            enrichment_timeout_secs: 30,
            enrichment_max_retries: 2,
            clear_progress_on_complete: false,
        }
    }
}

/// Returns the variable if set and non-blank.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
