//! End-to-end flow: answer every instrument, score, match, persist, reload.

use psychekit::catalog::{
    BUILTIN_ARCHETYPES, Gender, InstrumentCatalog, InstrumentId, Keying,
};
use psychekit::scoring::{
    ResponseValue, ScoreResult, match_archetypes, pole_strengths, score, TOP_N,
};
use psychekit::session::{MemoryStore, Screen, SessionState, SessionStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn complete_session() -> SessionState {
    let catalog = InstrumentCatalog::builtin();
    let mut state = SessionState::new();
    state.gender = Some(Gender::Female);

    for instrument in catalog.instruments() {
        state.advance(instrument.id);
        for item in &instrument.items {
            let value = match item.axis {
                Some(axis) => ResponseValue::Pole(if item.id % 3 == 0 {
                    axis.second
                } else {
                    axis.first
                }),
                None => {
                    let scale = instrument.scale.unwrap();
                    let v = if item.keyed == Keying::Reverse {
                        scale.min
                    } else {
                        scale.max
                    };
                    ResponseValue::Scale(v)
                }
            };
            state.record_answer(instrument.id, item.id, value);
        }
        let result = score(instrument, &state.progress[&instrument.id].answers);
        state.complete_instrument(instrument.id, result);
    }

    let traits = catalog.get(InstrumentId::TraitAxes);
    let strengths = pole_strengths(traits, &state.results[&InstrumentId::TraitAxes]);
    let outcome = match_archetypes(&strengths, Gender::Female, BUILTIN_ARCHETYPES);
    state.set_match(outcome);
    state
}

#[test]
fn full_flow_scores_every_instrument_and_matches() {
    let state = complete_session();
    assert!(state.all_scored());
    assert_eq!(state.screen, Screen::Results);

    let outcome = state.archetype_match.as_ref().unwrap();
    assert!(outcome.dominant.percentage > 0.0);

    let top_sum: f64 = outcome
        .distribution
        .iter()
        .take(TOP_N)
        .map(|e| e.percentage)
        .sum();
    assert!((top_sum - 100.0).abs() < 1e-6, "top-N sum = {top_sum}");
}

#[test]
fn full_flow_is_reproducible() {
    // Same answers, same scores and same match, bit for bit.
    let a = complete_session();
    let b = complete_session();
    assert_eq!(a.results, b.results);
    assert_eq!(a.archetype_match, b.archetype_match);
}

#[test]
fn mood_result_carries_a_level() {
    let state = complete_session();
    let ScoreResult::ScaleSummary { levels, .. } = &state.results[&InstrumentId::MoodInventory]
    else {
        panic!("expected ScaleSummary for the mood inventory");
    };
    assert!(!levels.is_empty());
}

#[tokio::test]
async fn completed_session_survives_persistence() {
    init_tracing();
    let state = complete_session();
    let store = SessionStore::new(MemoryStore::new());

    assert!(store.save(&state).await);
    let mut loaded = store.load().await.expect("session saved");
    loaded.saved_at = None;
    assert_eq!(loaded, state);

    // Restart-and-clear leaves no trace.
    assert!(store.clear().await);
    assert!(!store.has_saved().await);
}
