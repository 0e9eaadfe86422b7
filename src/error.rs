//! Error types for psychekit.

use std::time::Duration;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Session persistence errors.
///
/// These never escape [`crate::session::SessionStore::save`], which swallows
/// them into a boolean; they are surfaced by the lower-level key-value
/// backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Backend read failed: {0}")]
    Read(String),

    #[error("Backend write failed: {0}")]
    Write(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Generation backend errors.
///
/// Raw failures from the text-generation backend. The content module's
/// classifier reduces these to a fixed displayable taxonomy; callers outside
/// the content module should rarely see a `GenError` directly.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("Backend request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("No backend credential configured")]
    MissingCredential,

    #[error("Request rejected by content safety filter: {reason}")]
    SafetyBlocked { reason: String },

    #[error("Invalid response from backend: {reason}")]
    InvalidResponse { reason: String },

    #[error("Stream ended abnormally: {reason}")]
    StreamAborted { reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingEnvVar("GENERATION_API_KEY".to_string());
        let msg = err.to_string();
        assert!(
            msg.contains("GENERATION_API_KEY"),
            "Should mention the variable name: {msg}"
        );

        let err = ConfigError::InvalidValue {
            key: "GENERATION_BASE_URL".to_string(),
            message: "must start with http".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GENERATION_BASE_URL"), "Should mention the key: {msg}");
    }

    #[test]
    fn gen_error_display() {
        let err = GenError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"), "Should mention the status: {msg}");
        assert!(msg.contains("overloaded"), "Should mention the body: {msg}");

        let err = GenError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert!(err.to_string().contains("retry after"));
    }

    #[test]
    fn top_level_error_from_conversions() {
        let config_err = ConfigError::MissingEnvVar("TEST".to_string());
        let err: Error = config_err.into();
        assert!(matches!(err, Error::Config(_)));

        let gen_err = GenError::MissingCredential;
        let err: Error = gen_err.into();
        assert!(matches!(err, Error::Generation(_)));
    }
}
