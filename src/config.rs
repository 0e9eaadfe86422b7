//! Configuration for psychekit.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Main configuration for the library.
#[derive(Debug, Clone)]
pub struct Config {
    pub generation: GenerationConfig,
    pub retry: RetryPolicy,
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            generation: GenerationConfig::from_env()?,
            retry: RetryPolicy::from_env()?,
            session: SessionConfig::from_env()?,
        })
    }
}

/// Configuration for the text-generation backend.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Base URL of the generation endpoint.
    pub base_url: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// API key. `None` means the backend is unconfigured and the content
    /// client short-circuits to its auth fallback without network I/O.
    pub api_key: Option<SecretString>,
    /// Locale tag used when a request does not carry its own.
    pub default_locale: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GenerationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = optional_env("GENERATION_BASE_URL")?
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());
        if !base_url.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                key: "GENERATION_BASE_URL".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }

        let model =
            optional_env("GENERATION_MODEL")?.unwrap_or_else(|| "gemini-2.0-flash".to_string());
        let api_key = optional_env("GENERATION_API_KEY")?.map(SecretString::from);
        let default_locale = optional_env("GENERATION_LOCALE")?.unwrap_or_else(|| "en".to_string());
        let timeout = optional_env("GENERATION_TIMEOUT_SECS")?
            .map(|s| parse_number::<u64>(&s, "GENERATION_TIMEOUT_SECS"))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(120));

        Ok(Self {
            base_url,
            model,
            api_key,
            default_locale,
            timeout,
        })
    }

    /// Whether a backend credential is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }
}

/// Retry/backoff policy for backend calls. Pure configuration, fixed for
/// the lifetime of the client.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Multiplicative jitter factor: each delay is scaled by a uniform
    /// `1.0..=1.0 + jitter_factor`.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(800),
            jitter_factor: 0.25,
        }
    }
}

impl RetryPolicy {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let max_attempts = optional_env("GENERATION_MAX_ATTEMPTS")?
            .map(|s| parse_number::<u32>(&s, "GENERATION_MAX_ATTEMPTS"))
            .transpose()?
            .unwrap_or(defaults.max_attempts)
            .max(1);
        let base_delay = optional_env("GENERATION_BASE_DELAY_MS")?
            .map(|s| parse_number::<u64>(&s, "GENERATION_BASE_DELAY_MS"))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_delay);

        Ok(Self {
            max_attempts,
            base_delay,
            jitter_factor: defaults.jitter_factor,
        })
    }
}

/// Configuration for session persistence.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory the file-backed key-value store writes into.
    pub data_dir: std::path::PathBuf,
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let data_dir = optional_env("PSYCHEKIT_DATA_DIR")?
            .map(std::path::PathBuf::from)
            .unwrap_or_else(default_data_dir);
        Ok(Self { data_dir })
    }
}

fn default_data_dir() -> std::path::PathBuf {
    dirs_home()
        .map(|h| h.join(".psychekit"))
        .unwrap_or_else(|| std::path::PathBuf::from(".psychekit"))
}

fn dirs_home() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(std::path::PathBuf::from)
}

/// Read an optional environment variable, treating empty as absent.
fn optional_env(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: name.to_string(),
            message: "not valid UTF-8".to_string(),
        }),
    }
}

/// Parse into the target integer type; out-of-range values are rejected
/// rather than truncated.
fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected an integer in range, got '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.jitter_factor > 0.0);
    }

    #[test]
    fn generation_unconfigured_without_key() {
        let config = GenerationConfig {
            base_url: "https://example.com".to_string(),
            model: "m".to_string(),
            api_key: None,
            default_locale: "en".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn generation_configured_with_key() {
        let config = GenerationConfig {
            base_url: "https://example.com".to_string(),
            model: "m".to_string(),
            api_key: Some(SecretString::from("sk-test".to_string())),
            default_locale: "en".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(config.is_configured());
    }

    #[test]
    fn empty_key_counts_as_unconfigured() {
        let config = GenerationConfig {
            base_url: "https://example.com".to_string(),
            model: "m".to_string(),
            api_key: Some(SecretString::from(String::new())),
            default_locale: "en".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn parse_number_rejects_garbage() {
        let err = parse_number::<u64>("abc", "KEY").unwrap_err();
        assert!(err.to_string().contains("KEY"));
    }

    #[test]
    fn parse_number_rejects_out_of_range() {
        // 2^32 + 1 must error, not silently truncate to 1.
        let err = parse_number::<u32>("4294967297", "KEY").unwrap_err();
        assert!(err.to_string().contains("KEY"));
    }
}
