//! Scoring engine: reduces raw answers into normalized score objects.
//!
//! [`score`] is a pure, total function. Unanswered items contribute nothing
//! to any sum or tally; recomputing from the same answer set always yields
//! an identical result (ordered maps throughout, no hash iteration order).

mod matcher;

pub use matcher::{
    AffinityEntry, MatchOutcome, TOP_N, match_archetypes, pole_strengths,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{
    Instrument, Keying, LikertScale, Pole, ScoringStrategy, SeverityLevel, band_for,
};

/// A raw response to one item. Shape depends on the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseValue {
    /// Forced-choice pole pick.
    Pole(Pole),
    /// Bounded Likert value.
    Scale(u8),
    /// Boolean response, treated as the scale maximum (yes) or minimum (no).
    YesNo(bool),
}

/// Accumulated answers for one instrument, keyed by item id.
///
/// Insertion order is irrelevant; partial completion is normal. Missing
/// items are "unanswered", never silently defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerMap(BTreeMap<u16, ResponseValue>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the response to an item.
    pub fn record(&mut self, item_id: u16, value: ResponseValue) {
        self.0.insert(item_id, value);
    }

    pub fn get(&self, item_id: u16) -> Option<ResponseValue> {
        self.0.get(&item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-instrument score, one shape per scoring strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScoreResult {
    /// Raw per-pole counters from a forced-choice instrument.
    TraitTally { tallies: BTreeMap<Pole, u32> },
    /// Keyed sums per scale code, with severity levels where the instrument
    /// defines bands.
    ScaleSummary {
        totals: BTreeMap<String, u32>,
        levels: BTreeMap<String, SeverityLevel>,
    },
    /// Weighted dimension attainment as a 0-100 percentage of the maximum
    /// attainable over the answered items.
    DimensionProfile { percentages: BTreeMap<String, f64> },
}

/// Score an instrument against a (possibly partial) answer set.
///
/// Never fails: malformed catalog data is a programming error, not a
/// runtime case, and unanswered items simply do not contribute.
pub fn score(instrument: &Instrument, answers: &AnswerMap) -> ScoreResult {
    match instrument.strategy {
        ScoringStrategy::ForcedChoicePole => score_forced_choice(instrument, answers),
        ScoringStrategy::LikertSumKeyed => score_likert_sum(instrument, answers),
        ScoringStrategy::LikertDimensionWeighted => score_dimension_weighted(instrument, answers),
    }
}

fn score_forced_choice(instrument: &Instrument, answers: &AnswerMap) -> ScoreResult {
    let mut tallies: BTreeMap<Pole, u32> = BTreeMap::new();
    for item in &instrument.items {
        let Some(ResponseValue::Pole(pole)) = answers.get(item.id) else {
            continue;
        };
        // A pick outside the item's axis cannot come from a well-formed UI;
        // it is dropped rather than counted against another axis.
        if item.axis.is_some_and(|a| a.contains(pole)) {
            *tallies.entry(pole).or_insert(0) += 1;
        }
    }
    ScoreResult::TraitTally { tallies }
}

/// Map a response onto the instrument scale, applying the keyed transform.
fn keyed_value(scale: LikertScale, keyed: Keying, value: ResponseValue) -> Option<u32> {
    let raw = match value {
        ResponseValue::Scale(v) => scale.clamp(v),
        ResponseValue::YesNo(true) => scale.max,
        ResponseValue::YesNo(false) => scale.min,
        ResponseValue::Pole(_) => return None,
    };
    let transformed = match keyed {
        Keying::Direct => raw,
        Keying::Reverse => scale.reverse(raw),
    };
    Some(u32::from(transformed))
}

fn score_likert_sum(instrument: &Instrument, answers: &AnswerMap) -> ScoreResult {
    let scale = instrument
        .scale
        .expect("Likert instrument defines a scale");
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for item in &instrument.items {
        let Some(value) = answers.get(item.id) else {
            continue;
        };
        let Some(v) = keyed_value(scale, item.keyed, value) else {
            continue;
        };
        for load in &item.loads {
            *totals.entry(load.dimension.to_string()).or_insert(0) += v;
        }
    }

    let levels = totals
        .iter()
        .filter_map(|(dim, total)| {
            band_for(&instrument.bands, *total).map(|level| (dim.clone(), level))
        })
        .collect();

    ScoreResult::ScaleSummary { totals, levels }
}

fn score_dimension_weighted(instrument: &Instrument, answers: &AnswerMap) -> ScoreResult {
    let scale = instrument
        .scale
        .expect("Likert instrument defines a scale");
    // Attained and attainable are accumulated over answered items only, so
    // a partially answered survey still reports meaningful percentages.
    let mut attained: BTreeMap<&str, f64> = BTreeMap::new();
    let mut attainable: BTreeMap<&str, f64> = BTreeMap::new();
    for item in &instrument.items {
        let Some(value) = answers.get(item.id) else {
            continue;
        };
        let Some(v) = keyed_value(scale, item.keyed, value) else {
            continue;
        };
        for load in &item.loads {
            *attained.entry(load.dimension).or_insert(0.0) += f64::from(v) * load.weight;
            *attainable.entry(load.dimension).or_insert(0.0) +=
                f64::from(scale.max) * load.weight;
        }
    }

    let percentages = attained
        .iter()
        .map(|(dim, got)| {
            let max = attainable[dim];
            let pct = if max > 0.0 { 100.0 * got / max } else { 0.0 };
            (dim.to_string(), pct)
        })
        .collect();

    ScoreResult::DimensionProfile { percentages }
}
