//! Generation backend trait and its HTTP implementation.
//!
//! The wire contract: `POST {base}/v1/generate` with
//! `{ "model", "prompt", "locale", "responseSchema"? }` returns
//! `{ "text": ... }`, or arbitrary JSON when a response schema was declared.
//! `POST {base}/v1/generate:stream` returns an SSE sequence of
//! `{ "textDelta": ... }` frames, terminated by stream closure.

use std::pin::Pin;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::error::GenError;

/// A prompt payload bound for the generation backend.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRequest {
    pub prompt: String,
    pub locale: String,
    /// When set, the backend is asked for structured JSON matching this
    /// schema instead of free text.
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

impl ContentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            locale: "en".to_string(),
            response_schema: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// A complete (non-streaming) generation result.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    Text(String),
    Structured(serde_json::Value),
}

/// One incremental frame of a streaming response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextDelta {
    #[serde(rename = "textDelta")]
    pub text: String,
}

/// Ordered stream of partial-text frames.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<TextDelta, GenError>> + Send>>;

/// External text-generation collaborator.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Whole-response generation.
    async fn generate(&self, request: &ContentRequest) -> Result<ContentPayload, GenError>;

    /// Streaming generation. The stream ends on backend-side closure;
    /// cancellation is cooperative (drop the stream, nothing is signalled).
    async fn generate_stream(&self, request: &ContentRequest) -> Result<DeltaStream, GenError>;
}

/// HTTP generation backend.
pub struct HttpBackend {
    client: Client,
    config: GenerationConfig,
}

impl HttpBackend {
    pub fn new(config: GenerationConfig) -> Result<Self, GenError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenError::RequestFailed {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/v1/{path}")
    }

    fn post(&self, url: &str, request: &ContentRequest) -> Result<reqwest::RequestBuilder, GenError> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or(GenError::MissingCredential)?;
        let body = WireRequest {
            model: &self.config.model,
            request,
        };
        Ok(self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", key.expose_secret()))
            .json(&body))
    }
}

/// Request envelope: the model tag plus the flattened content request.
#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a ContentRequest,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "blockReason", default)]
    block_reason: Option<String>,
}

/// Light structural validation: every property the schema marks required
/// must be present on the returned object.
fn validate_against_schema(
    value: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<(), GenError> {
    let Some(required) = schema.get("required").and_then(|r| r.as_array()) else {
        return Ok(());
    };
    let object = value.as_object().ok_or_else(|| GenError::InvalidResponse {
        reason: "structured response is not a JSON object".to_string(),
    })?;
    for key in required.iter().filter_map(|k| k.as_str()) {
        if !object.contains_key(key) {
            return Err(GenError::InvalidResponse {
                reason: format!("structured response missing required field '{key}'"),
            });
        }
    }
    Ok(())
}

/// Decode a 2xx response body into a payload.
///
/// A safety-block envelope can arrive in place of the requested content in
/// either mode, so `blockReason` is checked before any schema validation.
fn parse_success_body(
    body: &str,
    schema: Option<&serde_json::Value>,
) -> Result<ContentPayload, GenError> {
    if let Some(schema) = schema {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| GenError::InvalidResponse {
                reason: format!("structured response is not valid JSON: {e}"),
            })?;
        if let Some(reason) = value.get("blockReason").and_then(|r| r.as_str()) {
            return Err(GenError::SafetyBlocked {
                reason: reason.to_string(),
            });
        }
        validate_against_schema(&value, schema)?;
        return Ok(ContentPayload::Structured(value));
    }

    let parsed: WireResponse = serde_json::from_str(body).map_err(|e| GenError::InvalidResponse {
        reason: format!("response is not valid JSON: {e}"),
    })?;
    if let Some(reason) = parsed.block_reason {
        return Err(GenError::SafetyBlocked { reason });
    }
    match parsed.text {
        Some(text) => Ok(ContentPayload::Text(text)),
        None => Err(GenError::InvalidResponse {
            reason: "response carries neither text nor a block reason".to_string(),
        }),
    }
}

fn status_error(status: reqwest::StatusCode, body: String) -> GenError {
    if status.as_u16() == 429 {
        GenError::RateLimited { retry_after: None }
    } else {
        GenError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        }
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(&self, request: &ContentRequest) -> Result<ContentPayload, GenError> {
        let url = self.url("generate");
        tracing::debug!(%url, locale = %request.locale, "Sending generation request");

        let response = self.post(&url, request)?.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, body));
        }

        parse_success_body(&body, request.response_schema.as_ref())
    }

    async fn generate_stream(&self, request: &ContentRequest) -> Result<DeltaStream, GenError> {
        let url = self.url("generate:stream");
        tracing::debug!(%url, locale = %request.locale, "Opening generation stream");

        let response = self
            .post(&url, request)?
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| async move {
                match event {
                    Ok(event) if event.data == "[DONE]" => None,
                    Ok(event) => Some(
                        serde_json::from_str::<TextDelta>(&event.data).map_err(|e| {
                            GenError::InvalidResponse {
                                reason: format!("bad stream frame: {e}"),
                            }
                        }),
                    ),
                    Err(e) => Some(Err(GenError::StreamAborted {
                        reason: e.to_string(),
                    })),
                }
            });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builder_defaults() {
        let req = ContentRequest::new("tell me about athena").with_locale("ko");
        assert_eq!(req.locale, "ko");
        assert!(req.response_schema.is_none());
    }

    #[test]
    fn wire_request_flattens_fields() {
        let req = ContentRequest::new("hello").with_schema(json!({"type": "object"}));
        let wire = WireRequest {
            model: "test-model",
            request: &req,
        };
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["model"], "test-model");
        assert_eq!(value["prompt"], "hello");
        assert_eq!(value["responseSchema"]["type"], "object");
    }

    #[test]
    fn schema_validation_accepts_complete_object() {
        let schema = json!({"type": "object", "required": ["title", "body"]});
        let value = json!({"title": "t", "body": "b", "extra": 1});
        assert!(validate_against_schema(&value, &schema).is_ok());
    }

    #[test]
    fn schema_validation_rejects_missing_required() {
        let schema = json!({"type": "object", "required": ["title", "body"]});
        let value = json!({"title": "t"});
        let err = validate_against_schema(&value, &schema).unwrap_err();
        assert!(err.to_string().contains("body"));
    }

    #[test]
    fn structured_block_envelope_is_safety_blocked() {
        use crate::content::classify::{ErrorKind, classify};

        // The backend substitutes a block envelope for the schema'd object;
        // that must surface as a safety block, not a validation failure.
        let schema = json!({"type": "object", "required": ["title", "body"]});
        let err = parse_success_body(r#"{"blockReason":"PROHIBITED_CONTENT"}"#, Some(&schema))
            .unwrap_err();
        assert!(matches!(err, GenError::SafetyBlocked { .. }));
        assert_eq!(classify(&err).kind, ErrorKind::SafetyBlocked);
    }

    #[test]
    fn structured_body_passes_schema_and_parses() {
        let schema = json!({"type": "object", "required": ["title"]});
        let payload =
            parse_success_body(r#"{"title":"t","body":"b"}"#, Some(&schema)).unwrap();
        assert!(matches!(payload, ContentPayload::Structured(_)));
    }

    #[test]
    fn text_body_block_reason_is_safety_blocked() {
        let err = parse_success_body(r#"{"blockReason":"SAFETY"}"#, None).unwrap_err();
        assert!(matches!(err, GenError::SafetyBlocked { .. }));
    }

    #[test]
    fn text_body_parses() {
        let payload = parse_success_body(r#"{"text":"a narrative"}"#, None).unwrap();
        assert_eq!(payload, ContentPayload::Text("a narrative".to_string()));
    }

    #[test]
    fn schema_validation_rejects_non_object() {
        let schema = json!({"required": ["title"]});
        let err = validate_against_schema(&json!("just a string"), &schema).unwrap_err();
        assert!(matches!(err, GenError::InvalidResponse { .. }));
    }

    #[test]
    fn status_429_becomes_rate_limited() {
        let err = status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(err, GenError::RateLimited { .. }));
    }

    #[test]
    fn status_body_is_truncated() {
        let long = "x".repeat(1000);
        let GenError::Status { body, .. } =
            status_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, long)
        else {
            panic!("expected Status");
        };
        assert_eq!(body.len(), 200);
    }

    #[test]
    fn delta_frame_parses() {
        let delta: TextDelta = serde_json::from_str(r#"{"textDelta":"Once upon"}"#).unwrap();
        assert_eq!(delta.text, "Once upon");
    }
}
