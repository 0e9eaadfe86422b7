//! Static catalogs: questionnaire instruments and persona archetypes.
//!
//! Everything here is immutable data defined at process start. Scoring and
//! matching logic lives in [`crate::scoring`].

mod archetype;
mod instrument;

pub use archetype::{
    ArchetypeProfile, BUILTIN_ARCHETYPES, DEFAULT_FEMALE_ID, DEFAULT_MALE_ID, Gender,
    default_archetype,
};
pub use instrument::{
    AXES, Axis, Band, DimensionLoad, Instrument, InstrumentId, Item, Keying, LikertScale, Pole,
    ScoringStrategy, SeverityLevel, band_for,
};

/// The single scale code of the mood inventory.
pub const MOOD_SCALE: &str = "mood";

/// Catalog of all shipped instruments.
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl InstrumentCatalog {
    /// Build the catalog of shipped instruments.
    pub fn builtin() -> Self {
        Self {
            instruments: vec![trait_axes(), mood_inventory(), values_survey()],
        }
    }

    /// Look up an instrument by id.
    pub fn get(&self, id: InstrumentId) -> &Instrument {
        self.instruments
            .iter()
            .find(|i| i.id == id)
            .expect("builtin catalog contains every InstrumentId")
    }

    /// All instruments in presentation order.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Forced-choice trait instrument: 28 items, 7 per axis, interleaved so no
/// axis dominates a stretch of the questionnaire.
fn trait_axes() -> Instrument {
    let mut items = Vec::with_capacity(28);
    let mut id = 1u16;
    for _round in 0..7 {
        for axis in AXES {
            items.push(Item::forced_choice(id, axis));
            id += 1;
        }
    }
    Instrument {
        id: InstrumentId::TraitAxes,
        strategy: ScoringStrategy::ForcedChoicePole,
        items,
        scale: None,
        bands: Vec::new(),
    }
}

/// Mood inventory: 9 Likert items on a 0-3 scale, items 5 and 8 reverse
/// keyed, banded into four severity levels.
fn mood_inventory() -> Instrument {
    let items = (1u16..=9)
        .map(|id| {
            let keyed = if id == 5 || id == 8 {
                Keying::Reverse
            } else {
                Keying::Direct
            };
            Item::likert(id, keyed, vec![DimensionLoad::new(MOOD_SCALE, 1.0)])
        })
        .collect();
    Instrument {
        id: InstrumentId::MoodInventory,
        strategy: ScoringStrategy::LikertSumKeyed,
        items,
        scale: Some(LikertScale::new(0, 3)),
        bands: vec![
            Band::new(SeverityLevel::Minimal, 0, 4),
            Band::new(SeverityLevel::Mild, 5, 9),
            Band::new(SeverityLevel::Moderate, 10, 14),
            Band::new(SeverityLevel::Severe, 15, 27),
        ],
    }
}

/// Values survey: 1-5 Likert items with weighted multi-dimension loads.
fn values_survey() -> Instrument {
    let loads: [(Keying, Vec<DimensionLoad>); 8] = [
        (Keying::Direct, vec![DimensionLoad::new("autonomy", 1.0)]),
        (Keying::Direct, vec![DimensionLoad::new("connection", 1.0)]),
        (
            Keying::Direct,
            vec![
                DimensionLoad::new("mastery", 1.0),
                DimensionLoad::new("autonomy", 0.5),
            ],
        ),
        (Keying::Reverse, vec![DimensionLoad::new("security", 1.0)]),
        (Keying::Direct, vec![DimensionLoad::new("mastery", 1.0)]),
        (
            Keying::Direct,
            vec![
                DimensionLoad::new("connection", 1.0),
                DimensionLoad::new("security", 0.5),
            ],
        ),
        (Keying::Reverse, vec![DimensionLoad::new("autonomy", 1.0)]),
        (Keying::Direct, vec![DimensionLoad::new("security", 1.0)]),
    ];
    let items = loads
        .into_iter()
        .enumerate()
        .map(|(i, (keyed, loads))| Item::likert(i as u16 + 1, keyed, loads))
        .collect();
    Instrument {
        id: InstrumentId::ValuesSurvey,
        strategy: ScoringStrategy::LikertDimensionWeighted,
        items,
        scale: Some(LikertScale::new(1, 5)),
        bands: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_every_instrument() {
        let catalog = InstrumentCatalog::builtin();
        for id in InstrumentId::ALL {
            assert_eq!(catalog.get(id).id, id);
        }
    }

    #[test]
    fn trait_axes_has_seven_items_per_pole() {
        let catalog = InstrumentCatalog::builtin();
        let instrument = catalog.get(InstrumentId::TraitAxes);
        assert_eq!(instrument.items.len(), 28);
        for axis in AXES {
            assert_eq!(instrument.items_in_axis(axis.first), 7);
            assert_eq!(instrument.items_in_axis(axis.second), 7);
        }
    }

    #[test]
    fn mood_inventory_reverse_keyed_items() {
        let catalog = InstrumentCatalog::builtin();
        let instrument = catalog.get(InstrumentId::MoodInventory);
        let reversed: Vec<u16> = instrument
            .items
            .iter()
            .filter(|i| i.keyed == Keying::Reverse)
            .map(|i| i.id)
            .collect();
        assert_eq!(reversed, vec![5, 8]);
    }

    #[test]
    fn values_survey_has_multi_membership_items() {
        let catalog = InstrumentCatalog::builtin();
        let instrument = catalog.get(InstrumentId::ValuesSurvey);
        assert!(instrument.items.iter().any(|i| i.loads.len() > 1));
    }

    #[test]
    fn item_ids_are_unique_within_instruments() {
        let catalog = InstrumentCatalog::builtin();
        for instrument in catalog.instruments() {
            let mut ids: Vec<u16> = instrument.items.iter().map(|i| i.id).collect();
            let before = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), before, "duplicate item id in {:?}", instrument.id);
        }
    }
}
