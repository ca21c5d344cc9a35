use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_base: String,
    pub llm_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Minimum essay length in words. Submission and grading both gate on it.
    pub min_word_count: usize,
    /// Directory where per-student result files are written.
    pub results_dir: String,
    pub session_ttl_minutes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_base: std::env::var("LLM_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            llm_api_key: require_env("LLM_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            min_word_count: std::env::var("MIN_WORD_COUNT")
                .unwrap_or_else(|_| "20".to_string())
                .parse::<usize>()
                .context("MIN_WORD_COUNT must be a non-negative integer")?,
            results_dir: std::env::var("RESULTS_DIR").unwrap_or_else(|_| "results".to_string()),
            session_ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("SESSION_TTL_MINUTES must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
