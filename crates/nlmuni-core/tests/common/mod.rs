//! Shared fixture for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use nlmuni_core::{
    AreaCodeEntry, FormerMunicipality, Guesser, MatchOptions, Municipality, Neighbourhood,
    PlaceName, ReferenceStore,
};
use serde::Deserialize;

static TRACING: Once = Once::new();

/// Parsed tables as an acquisition layer would hand them over
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub match_year: i32,
    pub municipalities: Vec<Municipality>,
    pub former_municipalities: Vec<FormerMunicipality>,
    pub place_names: Vec<PlaceName>,
    pub neighbourhoods: Vec<Neighbourhood>,
    pub area_codes: Vec<AreaCodeEntry>,
}

/// Route `tracing` output through the test harness; `RUST_LOG` applies
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn fixture() -> Fixture {
    serde_json::from_str(include_str!("../fixtures/reference.json")).unwrap()
}

pub fn store() -> Arc<ReferenceStore> {
    init_tracing();
    let f = fixture();
    let store = ReferenceStore::builder(f.match_year)
        .municipalities(f.municipalities)
        .former_municipalities(f.former_municipalities)
        .place_names(f.place_names)
        .neighbourhoods(f.neighbourhoods)
        .area_codes(f.area_codes)
        .build()
        .unwrap();
    Arc::new(store)
}

pub fn guesser() -> Guesser {
    Guesser::new(store())
}

pub fn guesser_with(options: MatchOptions) -> Guesser {
    Guesser::builder(store()).options(options).build().unwrap()
}
