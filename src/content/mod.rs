//! Resilient content generation.
//!
//! Wraps the external text-generation backend with retry/backoff, a fixed
//! error-classification taxonomy, and streaming delivery. Reads computed
//! scores as prompt context but never mutates them.

mod backend;
mod classify;
mod client;
mod retry;

pub use backend::{
    ContentPayload, ContentRequest, DeltaStream, GenerationBackend, HttpBackend, TextDelta,
};
pub use classify::{ClassifiedError, ErrorKind, classify};
pub use client::{ClassifiedStream, ContentClient, Narrative};
pub use retry::invoke_with_retry;
