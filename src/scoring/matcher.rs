//! Archetype matching: pole strengths to a ranked affinity distribution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{ArchetypeProfile, Gender, Instrument, Pole, default_archetype};
use crate::scoring::ScoreResult;

/// Number of archetypes that participate in renormalization. Entries beyond
/// this cutoff stay in the distribution pinned at 0%.
pub const TOP_N: usize = 10;

/// One entry of the affinity distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityEntry {
    pub id: String,
    pub name: String,
    pub percentage: f64,
}

impl AffinityEntry {
    fn new(profile: &ArchetypeProfile, percentage: f64) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name.to_string(),
            percentage,
        }
    }
}

/// Result of matching: the dominant archetype plus the full distribution.
///
/// `dominant` is always defined; the matcher falls back to the designated
/// default archetype rather than returning nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub dominant: AffinityEntry,
    pub distribution: Vec<AffinityEntry>,
}

/// Compute per-pole strength percentages from a forced-choice tally.
///
/// `strength(pole) = 100 * tally / items_in_axis(pole)`. Strengths are
/// independent across axes; the two poles of one axis only sum to 100 when
/// every item of that axis was answered.
pub fn pole_strengths(instrument: &Instrument, result: &ScoreResult) -> BTreeMap<Pole, f64> {
    let ScoreResult::TraitTally { tallies } = result else {
        return BTreeMap::new();
    };
    tallies
        .iter()
        .filter_map(|(&pole, &tally)| {
            let denom = instrument.items_in_axis(pole);
            (denom > 0).then(|| (pole, 100.0 * f64::from(tally) / denom as f64))
        })
        .collect()
}

/// Raw affinity of one archetype: best signature match.
///
/// Each signature scores the sum of pole strengths over its letters; the
/// archetype takes the maximum across its signatures, so any one strong
/// resonance outranks weak partial resonance spread over many signatures.
fn raw_affinity(profile: &ArchetypeProfile, strengths: &BTreeMap<Pole, f64>) -> f64 {
    profile
        .signatures
        .iter()
        .map(|sig| {
            sig.chars()
                .filter_map(Pole::from_letter)
                .map(|pole| strengths.get(&pole).copied().unwrap_or(0.0))
                .sum::<f64>()
        })
        .fold(0.0, f64::max)
}

/// Match pole strengths against the gender-filtered catalog.
///
/// The top [`TOP_N`] candidates are renormalized so their percentages sum
/// to 100; the remainder keep a 0% entry for stable list ordering. Ties
/// resolve by catalog declaration order (stable sort). An empty filtered
/// catalog or uniformly zero affinity falls back to the default archetype
/// at 100%.
pub fn match_archetypes(
    strengths: &BTreeMap<Pole, f64>,
    gender: Gender,
    catalog: &[ArchetypeProfile],
) -> MatchOutcome {
    let mut scored: Vec<(&ArchetypeProfile, f64)> = catalog
        .iter()
        .filter(|a| a.gender == gender)
        .map(|a| (a, raw_affinity(a, strengths)))
        .collect();

    // Stable: equal affinities keep catalog declaration order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let subset_total: f64 = scored.iter().take(TOP_N).map(|(_, raw)| raw).sum();

    if scored.is_empty() || subset_total <= 0.0 {
        // Zero-total policy: collapse to the designated default rather than
        // distributing evenly across candidates with no resonance.
        let fallback = default_archetype(gender);
        let mut distribution = vec![AffinityEntry::new(fallback, 100.0)];
        distribution.extend(
            scored
                .iter()
                .filter(|(a, _)| a.id != fallback.id)
                .map(|(a, _)| AffinityEntry::new(a, 0.0)),
        );
        return MatchOutcome {
            dominant: distribution[0].clone(),
            distribution,
        };
    }

    let distribution: Vec<AffinityEntry> = scored
        .iter()
        .enumerate()
        .map(|(rank, (profile, raw))| {
            let percentage = if rank < TOP_N {
                100.0 * raw / subset_total
            } else {
                0.0
            };
            AffinityEntry::new(profile, percentage)
        })
        .collect();

    MatchOutcome {
        dominant: distribution[0].clone(),
        distribution,
    }
}
