//! Environment-driven configuration for Parley.
//!
//! Every knob is read from a `PARLEY_*` environment variable and falls
//! back to a default suited to a local Redis and Ollama setup. A present
//! but malformed value logs a warning and uses the default rather than
//! refusing to start.

use std::str::FromStr;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Redis connection URL for sessions and admission counters.
    pub redis_url: String,
    pub llm: LlmConfig,
    pub rate_limit: RateLimitConfig,
}

/// Generation backend settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Full URL of the chat completion endpoint.
    pub url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Attempt budget for single-shot completions.
    pub retries: u32,
    /// Pause between failed attempts.
    pub retry_delay: Duration,
    /// Per-request timeout for single-shot completions. Streaming
    /// requests are exempt so long generations are not cut off.
    pub timeout: Duration,
}

/// Fixed-window admission settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests admitted per window.
    pub max_requests: i64,
    /// Window length; doubles as the counter key TTL.
    pub period: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379/0".to_string(),
            llm: LlmConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/chat".to_string(),
            model: "gemma3:1b".to_string(),
            retries: 3,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            period: Duration::from_secs(1),
        }
    }
}

impl AppConfig {
    /// Assemble the configuration from `PARLEY_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        let llm_defaults = LlmConfig::default();
        let rate_defaults = RateLimitConfig::default();

        Self {
            redis_url: string_var("PARLEY_REDIS_URL", defaults.redis_url),
            llm: LlmConfig {
                url: string_var("PARLEY_LLM_URL", llm_defaults.url),
                model: string_var("PARLEY_LLM_MODEL", llm_defaults.model),
                retries: parse_var("PARLEY_LLM_RETRIES", llm_defaults.retries),
                retry_delay: Duration::from_millis(parse_var(
                    "PARLEY_LLM_RETRY_DELAY_MS",
                    llm_defaults.retry_delay.as_millis() as u64,
                )),
                timeout: Duration::from_secs(parse_var(
                    "PARLEY_LLM_TIMEOUT_SECS",
                    llm_defaults.timeout.as_secs(),
                )),
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_var("PARLEY_RATE_LIMIT_REQUESTS", rate_defaults.max_requests),
                period: Duration::from_secs(parse_var(
                    "PARLEY_RATE_LIMIT_PERIOD_SECS",
                    rate_defaults.period.as_secs(),
                )),
            },
        }
    }
}

fn string_var(name: &str, default: String) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default,
    }
}

fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => parse_or_default(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or_default<T: FromStr + Copy>(name: &str, raw: &str, default: T) -> T {
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Failed to parse {name}={raw:?}, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_services() {
        let config = AppConfig::default();
        assert_eq!(config.redis_url, "redis://localhost:6379/0");
        assert_eq!(config.llm.url, "http://localhost:11434/api/chat");
        assert_eq!(config.llm.model, "gemma3:1b");
        assert_eq!(config.llm.retries, 3);
        assert_eq!(config.llm.retry_delay, Duration::from_millis(1000));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.period, Duration::from_secs(1));
    }

    #[test]
    fn parse_or_default_accepts_valid_values() {
        assert_eq!(parse_or_default("TEST", "42", 3u32), 42);
        assert_eq!(parse_or_default("TEST", "250", 1000u64), 250);
    }

    #[test]
    fn parse_or_default_falls_back_on_garbage() {
        assert_eq!(parse_or_default("TEST", "not-a-number", 3u32), 3);
        assert_eq!(parse_or_default("TEST", "", 10i64), 10);
        assert_eq!(parse_or_default("TEST", "-1", 7u32), 7);
    }
}
