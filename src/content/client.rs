//! Resilient content client.
//!
//! Narrative enrichment is decorative: whole-response failures degrade into
//! an in-place displayable message pair instead of propagating errors
//! through the caller. Streaming failures are classified and returned so
//! the caller decides whether to keep partial text.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};

use crate::config::{GenerationConfig, RetryPolicy};
use crate::content::backend::{
    ContentPayload, ContentRequest, GenerationBackend, HttpBackend, TextDelta,
};
use crate::content::classify::{ClassifiedError, classify};
use crate::content::retry::invoke_with_retry;
use crate::error::GenError;

/// What a whole-response generation call yields. Never an error: failures
/// render as a [`Narrative::Fallback`] pair displayed like normal content.
#[derive(Debug, Clone, PartialEq)]
pub enum Narrative {
    Text(String),
    Structured(serde_json::Value),
    Fallback { title: String, description: String },
}

impl Narrative {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Narrative::Fallback { .. })
    }

    fn from_classified(err: ClassifiedError) -> Self {
        Narrative::Fallback {
            title: err.title,
            description: err.description,
        }
    }
}

/// Ordered stream of classified partial-text frames.
pub type ClassifiedStream = Pin<Box<dyn Stream<Item = Result<TextDelta, ClassifiedError>> + Send>>;

/// Client over the generation backend with retry and graceful degradation.
pub struct ContentClient {
    backend: Arc<dyn GenerationBackend>,
    policy: RetryPolicy,
    /// Static availability gate, fixed at construction: without a backend
    /// credential every call short-circuits to the auth fallback.
    configured: bool,
    default_locale: String,
}

impl ContentClient {
    /// Build a client over the HTTP backend.
    pub fn new(config: GenerationConfig, policy: RetryPolicy) -> Result<Self, GenError> {
        let configured = config.is_configured();
        let default_locale = config.default_locale.clone();
        Ok(Self {
            backend: Arc::new(HttpBackend::new(config)?),
            policy,
            configured,
            default_locale,
        })
    }

    /// Build a client over a custom backend (used by tests and embedders).
    pub fn with_backend(
        backend: Arc<dyn GenerationBackend>,
        policy: RetryPolicy,
        configured: bool,
    ) -> Self {
        Self {
            backend,
            policy,
            configured,
            default_locale: "en".to_string(),
        }
    }

    /// A request pre-filled with the configured locale.
    pub fn request(&self, prompt: impl Into<String>) -> ContentRequest {
        ContentRequest::new(prompt).with_locale(self.default_locale.clone())
    }

    /// Whole-response generation, retried on transient failures.
    ///
    /// Does not error: unrecoverable failures classify into a fallback
    /// title/description pair the caller renders in place of content.
    pub async fn generate(&self, request: ContentRequest) -> Narrative {
        if !self.configured {
            return Narrative::from_classified(classify(&GenError::MissingCredential));
        }

        let result = invoke_with_retry(&self.policy, || {
            let backend = Arc::clone(&self.backend);
            let req = request.clone();
            async move { backend.generate(&req).await }
        })
        .await;
        match result {
            Ok(ContentPayload::Text(text)) => Narrative::Text(text),
            Ok(ContentPayload::Structured(value)) => Narrative::Structured(value),
            Err(err) => {
                let classified = classify(&err);
                tracing::warn!(
                    kind = ?classified.kind,
                    error = %err,
                    "Generation failed, rendering fallback"
                );
                Narrative::from_classified(classified)
            }
        }
    }

    /// Streaming generation.
    ///
    /// Retry is not applied mid-stream: chunks already delivered are never
    /// rolled back, and a mid-stream failure surfaces as a classified error
    /// item. Cancellation is cooperative: drop the stream to stop.
    pub async fn generate_stream(
        &self,
        request: ContentRequest,
    ) -> Result<ClassifiedStream, ClassifiedError> {
        if !self.configured {
            return Err(classify(&GenError::MissingCredential));
        }

        let stream = self
            .backend
            .generate_stream(&request)
            .await
            .map_err(|e| classify(&e))?;
        Ok(Box::pin(stream.map(|item| item.map_err(|e| classify(&e)))))
    }
}
