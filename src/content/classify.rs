//! Error classification for the generation backend.
//!
//! Reduces raw [`GenError`]s to a fixed displayable taxonomy. Checks run in
//! a fixed priority order and the first match wins, so a message mentioning
//! both an invalid key and a rate limit classifies as `Auth`.

use serde::{Deserialize, Serialize};

use crate::error::GenError;

/// The fixed error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Auth,
    SafetyBlocked,
    RateLimit,
    ServerError,
    Network,
    Generic,
}

impl ErrorKind {
    /// Only rate limits and server errors are worth retrying.
    pub fn retryable(self) -> bool {
        matches!(self, ErrorKind::RateLimit | ErrorKind::ServerError)
    }

    fn title(self) -> &'static str {
        match self {
            ErrorKind::Auth => "Not connected",
            ErrorKind::SafetyBlocked => "Content unavailable",
            ErrorKind::RateLimit => "Taking a short break",
            ErrorKind::ServerError => "Service hiccup",
            ErrorKind::Network => "No connection",
            ErrorKind::Generic => "Something went wrong",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ErrorKind::Auth => {
                "The narrative service is not configured. Your results are unaffected."
            }
            ErrorKind::SafetyBlocked => {
                "The narrative could not be generated for this content. Your results are unaffected."
            }
            ErrorKind::RateLimit => {
                "The narrative service is busy right now. Please try again in a moment."
            }
            ErrorKind::ServerError => {
                "The narrative service had a temporary problem. Please try again."
            }
            ErrorKind::Network => {
                "Could not reach the narrative service. Check your connection and try again."
            }
            ErrorKind::Generic => "The narrative could not be generated. Please try again.",
        }
    }
}

/// A classified, displayable failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{title}: {description}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub title: String,
    pub description: String,
    pub retryable: bool,
}

impl ClassifiedError {
    fn of(kind: ErrorKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            retryable: kind.retryable(),
        }
    }
}

/// Classify a raw generation failure.
pub fn classify(err: &GenError) -> ClassifiedError {
    ClassifiedError::of(kind_of(err))
}

fn kind_of(err: &GenError) -> ErrorKind {
    // Structured signals first.
    match err {
        GenError::MissingCredential => return ErrorKind::Auth,
        GenError::SafetyBlocked { .. } => return ErrorKind::SafetyBlocked,
        GenError::RateLimited { .. } => return ErrorKind::RateLimit,
        GenError::Status { status, .. } if *status == 401 || *status == 403 => {
            return ErrorKind::Auth;
        }
        GenError::Status { status, .. } if *status == 429 => return ErrorKind::RateLimit,
        GenError::Status { status, .. } if *status >= 500 => return ErrorKind::ServerError,
        GenError::Http(e) if e.is_connect() || e.is_timeout() => return ErrorKind::Network,
        _ => {}
    }

    // Then text inspection, in priority order.
    let text = err.to_string().to_lowercase();
    if contains_any(&text, &["api key", "api_key", "credential", "unauthorized", "unauthenticated"]) {
        ErrorKind::Auth
    } else if contains_any(&text, &["safety", "prohibited_content", "blocked for safety"]) {
        ErrorKind::SafetyBlocked
    } else if contains_any(&text, &["429", "rate limit", "quota", "resource_exhausted"]) {
        ErrorKind::RateLimit
    } else if contains_any(&text, &["500", "502", "503", "server error", "internal error", "overloaded", "service unavailable"]) {
        ErrorKind::ServerError
    } else if contains_any(&text, &["network", "connection", "connect", "dns", "timed out", "timeout"]) {
        ErrorKind::Network
    } else {
        ErrorKind::Generic
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_credential_is_auth() {
        let c = classify(&GenError::MissingCredential);
        assert_eq!(c.kind, ErrorKind::Auth);
        assert!(!c.retryable);
    }

    #[test]
    fn status_codes_map_to_kinds() {
        let unauthorized = GenError::Status {
            status: 401,
            body: String::new(),
        };
        assert_eq!(classify(&unauthorized).kind, ErrorKind::Auth);

        let too_many = GenError::Status {
            status: 429,
            body: String::new(),
        };
        let c = classify(&too_many);
        assert_eq!(c.kind, ErrorKind::RateLimit);
        assert!(c.retryable);

        let bad_gateway = GenError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        let c = classify(&bad_gateway);
        assert_eq!(c.kind, ErrorKind::ServerError);
        assert!(c.retryable);
    }

    #[test]
    fn safety_signal_wins_over_rate_limit_wording() {
        // Priority order: safety is checked before rate-limit wording.
        let err = GenError::SafetyBlocked {
            reason: "rate limit mentioned but blocked for safety".to_string(),
        };
        assert_eq!(classify(&err).kind, ErrorKind::SafetyBlocked);
    }

    #[test]
    fn auth_wording_wins_over_everything() {
        let err = GenError::RequestFailed {
            reason: "API key invalid; also the server error rate limit".to_string(),
        };
        assert_eq!(classify(&err).kind, ErrorKind::Auth);
    }

    #[test]
    fn rate_limited_variant_is_retryable() {
        let err = GenError::RateLimited {
            retry_after: Some(Duration::from_secs(5)),
        };
        let c = classify(&err);
        assert_eq!(c.kind, ErrorKind::RateLimit);
        assert!(c.retryable);
    }

    #[test]
    fn blocked_transport_wording_is_network_not_safety() {
        // "blocked" alone is not a safety signal.
        let err = GenError::RequestFailed {
            reason: "connection blocked by proxy".to_string(),
        };
        assert_eq!(classify(&err).kind, ErrorKind::Network);
    }

    #[test]
    fn network_unavailable_is_network_not_server() {
        let err = GenError::RequestFailed {
            reason: "network unavailable".to_string(),
        };
        assert_eq!(classify(&err).kind, ErrorKind::Network);
    }

    #[test]
    fn service_unavailable_wording_is_server_error() {
        let err = GenError::RequestFailed {
            reason: "service unavailable, try again later".to_string(),
        };
        assert_eq!(classify(&err).kind, ErrorKind::ServerError);
    }

    #[test]
    fn transport_wording_is_network() {
        let err = GenError::RequestFailed {
            reason: "connection refused".to_string(),
        };
        let c = classify(&err);
        assert_eq!(c.kind, ErrorKind::Network);
        assert!(!c.retryable);
    }

    #[test]
    fn unknown_wording_is_generic() {
        let err = GenError::RequestFailed {
            reason: "something odd happened".to_string(),
        };
        let c = classify(&err);
        assert_eq!(c.kind, ErrorKind::Generic);
        assert!(!c.retryable);
        assert!(!c.title.is_empty());
        assert!(!c.description.is_empty());
    }

    #[test]
    fn only_rate_limit_and_server_error_retry() {
        for kind in [
            ErrorKind::Auth,
            ErrorKind::SafetyBlocked,
            ErrorKind::Network,
            ErrorKind::Generic,
        ] {
            assert!(!kind.retryable(), "{kind:?} must not retry");
        }
        assert!(ErrorKind::RateLimit.retryable());
        assert!(ErrorKind::ServerError.retryable());
    }

    #[test]
    fn every_kind_has_display_pair() {
        for kind in [
            ErrorKind::Auth,
            ErrorKind::SafetyBlocked,
            ErrorKind::RateLimit,
            ErrorKind::ServerError,
            ErrorKind::Network,
            ErrorKind::Generic,
        ] {
            let c = ClassifiedError::of(kind);
            assert!(!c.title.is_empty());
            assert!(!c.description.is_empty());
        }
    }
}
