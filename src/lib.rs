//! psychekit: psychometric scoring, archetype matching, and a resilient
//! narrative-generation client.
//!
//! The crate is a UI-agnostic core consumed by a presentation layer:
//!
//! - [`catalog`] holds the static instrument and archetype definitions.
//! - [`scoring`] reduces raw answers to normalized scores and matches them
//!   against the archetype catalog. Pure, deterministic, never fails.
//! - [`session`] is the root state aggregate plus its single durability
//!   boundary (one serialized blob in a key-value collaborator).
//! - [`content`] wraps the external text-generation backend with retry,
//!   error classification, and streaming delivery; failures degrade into
//!   displayable fallback messages rather than propagating errors.
//!
//! Single-user, single-session, foreground-only by design. All I/O is
//! async; scoring and matching are synchronous pure functions.

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod scoring;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
