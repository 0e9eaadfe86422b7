//! Persona archetype catalog.
//!
//! Each archetype declares a hard gender filter and one or more pole
//! signatures. A signature is a string over the eight pole letters; an
//! archetype's affinity is the best (maximum) signature match, not an
//! average, so one strong resonance beats several weak partial ones.

use serde::{Deserialize, Serialize};

/// Hard filter applied before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

/// A persona archetype definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    pub signatures: &'static [&'static str],
}

/// Fallback archetype when the filtered catalog is empty or every affinity
/// is zero. One per gender, guaranteed present in [`BUILTIN_ARCHETYPES`].
pub const DEFAULT_FEMALE_ID: &str = "hestia";
pub const DEFAULT_MALE_ID: &str = "hermes";

/// The shipped archetype catalog, in declaration order.
///
/// Declaration order is the tie-break for exact affinity ties, so entries
/// must not be reordered casually.
pub const BUILTIN_ARCHETYPES: &[ArchetypeProfile] = &[
    ArchetypeProfile {
        id: "athena",
        name: "Athena, the Strategist",
        gender: Gender::Female,
        signatures: &["INTJ", "ENTJ", "ISTJ"],
    },
    ArchetypeProfile {
        id: "artemis",
        name: "Artemis, the Huntress",
        gender: Gender::Female,
        signatures: &["ISTP", "INFP"],
    },
    ArchetypeProfile {
        id: "hera",
        name: "Hera, the Matriarch",
        gender: Gender::Female,
        signatures: &["ESTJ", "ESFJ"],
    },
    ArchetypeProfile {
        id: "demeter",
        name: "Demeter, the Nurturer",
        gender: Gender::Female,
        signatures: &["ISFJ", "ESFJ"],
    },
    ArchetypeProfile {
        id: "persephone",
        name: "Persephone, the Mystic",
        gender: Gender::Female,
        signatures: &["INFP", "INFJ"],
    },
    ArchetypeProfile {
        id: "aphrodite",
        name: "Aphrodite, the Lover",
        gender: Gender::Female,
        signatures: &["ESFP", "ENFP"],
    },
    ArchetypeProfile {
        id: "hestia",
        name: "Hestia, the Keeper",
        gender: Gender::Female,
        signatures: &["ISFP", "ISFJ"],
    },
    ArchetypeProfile {
        id: "cassandra",
        name: "Cassandra, the Seer",
        gender: Gender::Female,
        signatures: &["INFJ", "INTP"],
    },
    ArchetypeProfile {
        id: "atalanta",
        name: "Atalanta, the Challenger",
        gender: Gender::Female,
        signatures: &["ESTP", "ENTP"],
    },
    ArchetypeProfile {
        id: "circe",
        name: "Circe, the Transformer",
        gender: Gender::Female,
        signatures: &["ENTP", "INTJ"],
    },
    ArchetypeProfile {
        id: "iris",
        name: "Iris, the Messenger",
        gender: Gender::Female,
        signatures: &["ENFJ", "ENFP"],
    },
    ArchetypeProfile {
        id: "zeus",
        name: "Zeus, the Sovereign",
        gender: Gender::Male,
        signatures: &["ENTJ", "ESTJ"],
    },
    ArchetypeProfile {
        id: "apollo",
        name: "Apollo, the Visionary",
        gender: Gender::Male,
        signatures: &["INTJ", "ENTP"],
    },
    ArchetypeProfile {
        id: "ares",
        name: "Ares, the Warrior",
        gender: Gender::Male,
        signatures: &["ESTP", "ISTP"],
    },
    ArchetypeProfile {
        id: "hermes",
        name: "Hermes, the Wayfinder",
        gender: Gender::Male,
        signatures: &["ENTP", "ESTP", "ENFP"],
    },
    ArchetypeProfile {
        id: "hephaestus",
        name: "Hephaestus, the Maker",
        gender: Gender::Male,
        signatures: &["ISTP", "ISTJ"],
    },
    ArchetypeProfile {
        id: "poseidon",
        name: "Poseidon, the Tempest",
        gender: Gender::Male,
        signatures: &["ESFP", "ENFJ"],
    },
    ArchetypeProfile {
        id: "hades",
        name: "Hades, the Recluse",
        gender: Gender::Male,
        signatures: &["INTP", "INFJ"],
    },
    ArchetypeProfile {
        id: "dionysus",
        name: "Dionysus, the Reveler",
        gender: Gender::Male,
        signatures: &["ESFP", "ENFP"],
    },
    ArchetypeProfile {
        id: "orpheus",
        name: "Orpheus, the Poet",
        gender: Gender::Male,
        signatures: &["INFP", "ISFP"],
    },
    ArchetypeProfile {
        id: "asclepius",
        name: "Asclepius, the Healer",
        gender: Gender::Male,
        signatures: &["ISFJ", "INFJ"],
    },
    ArchetypeProfile {
        id: "atlas",
        name: "Atlas, the Steadfast",
        gender: Gender::Male,
        signatures: &["ISTJ", "ESTJ"],
    },
];

/// The designated fallback archetype for a gender.
pub fn default_archetype(gender: Gender) -> &'static ArchetypeProfile {
    let id = match gender {
        Gender::Female => DEFAULT_FEMALE_ID,
        Gender::Male => DEFAULT_MALE_ID,
    };
    BUILTIN_ARCHETYPES
        .iter()
        .find(|a| a.id == id && a.gender == gender)
        .unwrap_or(&BUILTIN_ARCHETYPES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::instrument::Pole;

    #[test]
    fn defaults_exist_per_gender() {
        let f = default_archetype(Gender::Female);
        assert_eq!(f.id, DEFAULT_FEMALE_ID);
        assert_eq!(f.gender, Gender::Female);

        let m = default_archetype(Gender::Male);
        assert_eq!(m.id, DEFAULT_MALE_ID);
        assert_eq!(m.gender, Gender::Male);
    }

    #[test]
    fn every_signature_char_is_a_pole_letter() {
        for archetype in BUILTIN_ARCHETYPES {
            assert!(
                !archetype.signatures.is_empty(),
                "{} has no signatures",
                archetype.id
            );
            for sig in archetype.signatures {
                for c in sig.chars() {
                    assert!(
                        Pole::from_letter(c).is_some(),
                        "signature '{sig}' of {} has invalid letter '{c}'",
                        archetype.id
                    );
                }
            }
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = BUILTIN_ARCHETYPES.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }
}
