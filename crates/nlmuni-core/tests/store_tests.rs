//! Reference store construction and configuration tests

mod common;

use common::{fixture, store};
use nlmuni_core::{Error, Guesser, MatchOptions, ReferenceStore};
use pretty_assertions::assert_eq;

#[test]
fn test_fixture_snapshot() {
    let store = store();
    let stats = store.stats();

    assert_eq!(store.match_year(), 2024);
    // Haarlemmerliede en Spaarnwoude no longer exists in 2024
    assert_eq!(stats.municipalities, 18);
    assert!(store.municipality("haarlemmerliede en spaarnwoude").is_none());
    assert_eq!(stats.former_municipalities, 7);
    assert_eq!(stats.area_codes, 3);

    // Halfweg points at the dissolved municipality and is dropped
    assert!(store.places().get("halfweg").is_none());
    assert_eq!(
        store.places().get("sloten").unwrap().municipalities,
        vec!["Amsterdam", "Súdwest-Fryslân"]
    );
}

#[test]
fn test_earlier_match_year() {
    let f = fixture();
    let store = ReferenceStore::builder(2015)
        .municipalities(f.municipalities)
        .former_municipalities(f.former_municipalities)
        .place_names(f.place_names)
        .neighbourhoods(f.neighbourhoods)
        .build()
        .unwrap();

    assert!(store.municipality("haarlemmerliede en spaarnwoude").is_some());
    assert!(store.municipality("westerkwartier").is_none());
    // Leek still existed, so it is not a former municipality yet
    assert_eq!(store.former_by_name("leek").count(), 0);

    let guesser = Guesser::new(std::sync::Arc::new(store));
    assert_eq!(
        guesser.guess_name("Spaarnwoude").as_deref(),
        Some("Haarlemmerliede en Spaarnwoude")
    );
    assert_eq!(guesser.match_year(), 2015);
}

#[test]
fn test_missing_tables() {
    let f = fixture();
    let err = ReferenceStore::builder(2024)
        .municipalities(f.municipalities)
        .place_names(f.place_names)
        .neighbourhoods(f.neighbourhoods)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        Error::MissingTable {
            table: "former_municipalities",
            match_year: 2024
        }
    );
    assert_eq!(
        err.to_string(),
        "reference table 'former_municipalities' missing for match year 2024"
    );
}

#[test]
fn test_empty_snapshot() {
    let f = fixture();
    let err = ReferenceStore::builder(1800)
        .municipalities(f.municipalities)
        .former_municipalities(vec![])
        .place_names(vec![])
        .neighbourhoods(vec![])
        .build()
        .unwrap_err();
    assert_eq!(err, Error::EmptySnapshot { match_year: 1800 });
}

#[test]
fn test_invalid_configuration() {
    let err = Guesser::builder(store())
        .options(MatchOptions::default().with_threshold_fuzzy(101))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        Error::InvalidThreshold {
            name: "threshold_fuzzy",
            value: 101
        }
    );

    let err = MatchOptions::default().with_date_str("01/01/2019").unwrap_err();
    assert!(matches!(err, Error::InvalidDate { .. }));

    let guesser = common::guesser();
    let bad = MatchOptions::default().with_delimiters([""]);
    assert_eq!(guesser.guess_with("Amsterdam", &bad), Err(Error::InvalidDelimiter));
}

#[test]
fn test_options_from_json() {
    let options: MatchOptions = serde_json::from_str(
        r#"{ "province": "Fryslân", "threshold_fuzzy": 90, "check_fuzzy": false }"#,
    )
    .unwrap();

    assert_eq!(options.province.as_deref(), Some("Fryslân"));
    assert_eq!(options.threshold_fuzzy, 90);
    assert!(!options.check_fuzzy);
    // Unspecified fields keep their defaults
    assert_eq!(options.threshold_ratio, 80);
    assert_eq!(options.recode_map.get("den haag"), Some("'s-Gravenhage"));

    let guesser = Guesser::builder(store()).options(options).build().unwrap();
    assert_eq!(guesser.guess_name("Sloten").as_deref(), Some("Súdwest-Fryslân"));
}
