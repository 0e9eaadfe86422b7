//! Questionnaire instrument definitions.
//!
//! Instruments are pure data: ordered item lists plus a scoring strategy
//! tag. All logic lives in [`crate::scoring`]. The catalog is built once at
//! process start and never mutated.

use serde::{Deserialize, Serialize};

/// One side of a binary trait axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pole {
    /// Extraversion
    E,
    /// Introversion
    I,
    /// Sensing
    S,
    /// Intuition
    N,
    /// Thinking
    T,
    /// Feeling
    F,
    /// Judging
    J,
    /// Perceiving
    P,
}

impl Pole {
    /// Single-letter code used in archetype signatures.
    pub fn letter(self) -> char {
        match self {
            Pole::E => 'E',
            Pole::I => 'I',
            Pole::S => 'S',
            Pole::N => 'N',
            Pole::T => 'T',
            Pole::F => 'F',
            Pole::J => 'J',
            Pole::P => 'P',
        }
    }

    /// Parse a signature character.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'E' => Some(Pole::E),
            'I' => Some(Pole::I),
            'S' => Some(Pole::S),
            'N' => Some(Pole::N),
            'T' => Some(Pole::T),
            'F' => Some(Pole::F),
            'J' => Some(Pole::J),
            'P' => Some(Pole::P),
            _ => None,
        }
    }
}

/// A binary trait axis: two opposing poles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    pub first: Pole,
    pub second: Pole,
}

impl Axis {
    pub const fn new(first: Pole, second: Pole) -> Self {
        Self { first, second }
    }

    /// Whether this axis contains the given pole.
    pub fn contains(&self, pole: Pole) -> bool {
        self.first == pole || self.second == pole
    }
}

/// The four built-in trait axes.
pub const AXES: [Axis; 4] = [
    Axis::new(Pole::E, Pole::I),
    Axis::new(Pole::S, Pole::N),
    Axis::new(Pole::T, Pole::F),
    Axis::new(Pole::J, Pole::P),
];

/// Scoring direction of a Likert item.
///
/// Reverse-keyed items are phrased against their scale's semantic direction
/// and must be inverted (`max + min - value`) before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keying {
    Direct,
    Reverse,
}

/// Bounds of a Likert response scale, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikertScale {
    pub min: u8,
    pub max: u8,
}

impl LikertScale {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Clamp a raw response into the scale bounds.
    pub fn clamp(&self, value: u8) -> u8 {
        value.clamp(self.min, self.max)
    }

    /// Reverse-score transform: `max + min - value`.
    pub fn reverse(&self, value: u8) -> u8 {
        self.max + self.min - self.clamp(value)
    }
}

/// Ordered qualitative severity levels for banded instruments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SeverityLevel {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

/// A closed score range `[lo, hi]` mapping onto one severity level.
///
/// Bands are non-overlapping and ascending; a boundary value belongs to the
/// band whose `hi` it equals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub level: SeverityLevel,
    pub lo: u32,
    pub hi: u32,
}

impl Band {
    pub const fn new(level: SeverityLevel, lo: u32, hi: u32) -> Self {
        Self { level, lo, hi }
    }
}

/// Find the band containing `value`, if any.
pub fn band_for(bands: &[Band], value: u32) -> Option<SeverityLevel> {
    bands
        .iter()
        .find(|b| b.lo <= value && value <= b.hi)
        .map(|b| b.level)
}

/// Weighted membership of an item in a dimension bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionLoad {
    pub dimension: &'static str,
    pub weight: f64,
}

impl DimensionLoad {
    pub const fn new(dimension: &'static str, weight: f64) -> Self {
        Self { dimension, weight }
    }
}

/// A single questionnaire item.
///
/// Forced-choice items carry their trait axis; Likert items carry a keyed
/// direction and one or more dimension loads.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u16,
    pub axis: Option<Axis>,
    pub keyed: Keying,
    pub loads: Vec<DimensionLoad>,
}

impl Item {
    /// A forced-choice item on the given axis.
    pub fn forced_choice(id: u16, axis: Axis) -> Self {
        Self {
            id,
            axis: Some(axis),
            keyed: Keying::Direct,
            loads: Vec::new(),
        }
    }

    /// A Likert item loading on the given dimensions.
    pub fn likert(id: u16, keyed: Keying, loads: Vec<DimensionLoad>) -> Self {
        Self {
            id,
            axis: None,
            keyed,
            loads,
        }
    }
}

/// How an instrument's answers reduce to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringStrategy {
    /// Per-pole counters; normalization deferred to the matcher.
    ForcedChoicePole,
    /// Keyed reverse transform, summed per dimension, optional banding.
    LikertSumKeyed,
    /// Keyed reverse transform, weight-scaled per dimension, reported as a
    /// 0-100 percentage of each dimension's attainable maximum.
    LikertDimensionWeighted,
}

/// Identifies one of the shipped instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstrumentId {
    TraitAxes,
    MoodInventory,
    ValuesSurvey,
}

impl InstrumentId {
    /// All instruments in presentation order.
    pub const ALL: [InstrumentId; 3] = [
        InstrumentId::TraitAxes,
        InstrumentId::MoodInventory,
        InstrumentId::ValuesSurvey,
    ];
}

/// A complete questionnaire definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub strategy: ScoringStrategy,
    pub items: Vec<Item>,
    pub scale: Option<LikertScale>,
    pub bands: Vec<Band>,
}

impl Instrument {
    /// Number of items whose axis contains the given pole.
    ///
    /// This is the denominator for the matcher's pole-strength percentage.
    pub fn items_in_axis(&self, pole: Pole) -> usize {
        self.items
            .iter()
            .filter(|item| item.axis.is_some_and(|a| a.contains(pole)))
            .count()
    }

    /// Look up an item by id.
    pub fn item(&self, id: u16) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }
}
