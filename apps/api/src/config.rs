use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup only fails on values that do not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    /// Unset means outbound model calls never time out.
    pub ollama_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            ollama_base_url: DEFAULT_BASE_URL.to_string(),
            ollama_model: DEFAULT_MODEL.to_string(),
            ollama_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            ollama_base_url: normalize_base_url(
                &std::env::var("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            ),
            ollama_model: std::env::var("OLLAMA_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.ollama_model),
            ollama_timeout: optional_env("OLLAMA_TIMEOUT_SECS")
                .map(|raw| {
                    raw.parse::<u64>()
                        .map(Duration::from_secs)
                        .context("OLLAMA_TIMEOUT_SECS must be a whole number of seconds")
                })
                .transpose()?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Endpoint paths are appended with a leading `/`, so the base must not end in one.
fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("http://localhost:11434/"),
            "http://localhost:11434"
        );
        assert_eq!(normalize_base_url(" http://ollama:11434// "), "http://ollama:11434");
    }

    #[test]
    fn test_normalize_base_url_leaves_clean_url_alone() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:11434"),
            "http://127.0.0.1:11434"
        );
    }

    #[test]
    fn test_defaults_point_at_local_ollama() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
        assert_eq!(config.ollama_model, "llama3.2");
        assert!(config.ollama_timeout.is_none());
    }
}
