//! Session state: the root aggregate the scoring flow reads and writes.
//!
//! All mutation goes through named transitions rather than ad hoc field
//! assignment, so every state change has one obvious call site to audit.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, SESSION_KEY, SessionStore};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Gender, InstrumentId};
use crate::scoring::{AnswerMap, MatchOutcome, ResponseValue, ScoreResult};

/// Which screen the session is on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "kebab-case")]
pub enum Screen {
    #[default]
    Welcome,
    Instrument {
        id: InstrumentId,
    },
    Results,
}

/// Progress through one instrument: the answer map plus the cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProgress {
    #[serde(default)]
    pub answers: AnswerMap,
    /// Index of the next unanswered item position.
    #[serde(default)]
    pub cursor: usize,
}

/// The root session aggregate.
///
/// Created empty at process start; mutated only through the transition
/// methods below or by [`SessionStore::load`]. Every field carries
/// `#[serde(default)]` so a blob written by an older schema hydrates
/// field-by-field against this default instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub screen: Screen,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub progress: BTreeMap<InstrumentId, InstrumentProgress>,
    #[serde(default)]
    pub results: BTreeMap<InstrumentId, ScoreResult>,
    #[serde(default)]
    pub archetype_match: Option<MatchOutcome>,
    /// Free-form context for deep-linking into a sub-view.
    #[serde(default)]
    pub view_context: Option<String>,
    #[serde(default)]
    pub saved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer and advance the cursor within the active instrument.
    pub fn record_answer(&mut self, instrument: InstrumentId, item_id: u16, value: ResponseValue) {
        let progress = self.progress.entry(instrument).or_default();
        progress.answers.record(item_id, value);
        progress.cursor = progress.answers.len();
    }

    /// Move to the given instrument's screen.
    pub fn advance(&mut self, instrument: InstrumentId) {
        self.screen = Screen::Instrument { id: instrument };
    }

    /// Store a computed score for an instrument.
    pub fn complete_instrument(&mut self, instrument: InstrumentId, result: ScoreResult) {
        self.results.insert(instrument, result);
    }

    /// Store the archetype match and move to the results screen.
    pub fn set_match(&mut self, outcome: MatchOutcome) {
        self.archetype_match = Some(outcome);
        self.screen = Screen::Results;
    }

    /// Deep-link into a result sub-view.
    pub fn open_view(&mut self, context: impl Into<String>) {
        self.view_context = Some(context.into());
    }

    /// Reset to a fresh, empty session.
    pub fn restart(&mut self) {
        *self = Self::default();
    }

    /// Whether every instrument has a computed result.
    pub fn all_scored(&self) -> bool {
        InstrumentId::ALL.iter().all(|id| self.results.contains_key(id))
    }
}
