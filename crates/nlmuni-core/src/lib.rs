//! Dutch municipality resolver
//!
//! Resolves free-text place strings ("Delfshaven, Rotterdam", "020",
//! "Den Haag", "Amsterdan") to the canonical municipality as it existed in a
//! chosen reference year, together with how the match was made.
//!
//! Reference tables are handed over already parsed; this crate does no
//! downloading or file I/O.
//!
//! # Features
//!
//! - `parallel` - Parallel fuzzy scans and batch resolution via rayon
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use nlmuni_core::reference::{AreaCodeEntry, Municipality, PlaceName, ReferenceStore};
//! use nlmuni_core::{Guesser, MatchedHow};
//!
//! let since = NaiveDate::from_ymd_opt(1812, 1, 1).unwrap();
//! let store = ReferenceStore::builder(2024)
//!     .municipalities(vec![
//!         Municipality::new("Amsterdam", since),
//!         Municipality::new("Rotterdam", since),
//!     ])
//!     .former_municipalities(vec![])
//!     .place_names(vec![PlaceName::new("Delfshaven", "Rotterdam")])
//!     .neighbourhoods(vec![])
//!     .area_codes(vec![AreaCodeEntry::new("020", "Amsterdam")])
//!     .build()
//!     .unwrap();
//!
//! let guesser = Guesser::new(Arc::new(store));
//!
//! let result = guesser.guess("Delfshaven, Rotterdam");
//! assert_eq!(result.matched_value.as_deref(), Some("Rotterdam"));
//! assert_eq!(result.matched_how, MatchedHow::ExactPlace);
//!
//! assert_eq!(guesser.guess_name("020").as_deref(), Some("Amsterdam"));
//! assert_eq!(guesser.guess_name("Amsterdan").as_deref(), Some("Amsterdam"));
//! ```

pub mod cache;
pub mod cascade;
pub mod error;
pub mod normalize;
pub mod options;
pub mod reference;
pub mod resolve;
pub mod result;
pub mod similarity;

// Re-export main types at crate root
pub use cache::{CacheStats, ResultCache};
pub use cascade::{Guesser, GuesserBuilder};
pub use error::{Error, Result};
pub use normalize::{fold, Candidate, Normalizer};
pub use options::{
    MatchOptions, RecodeMap, SpecialCase, DEFAULT_DELIMITERS, DEFAULT_REMOVE_TOKENS,
    DEFAULT_THRESHOLD_FUZZY, DEFAULT_THRESHOLD_RATIO,
};
pub use reference::{
    AreaCodeEntry, FormerMunicipality, Municipality, Neighbourhood, PlaceName, ReferenceStore,
    ReferenceStoreBuilder, Successor,
};
pub use resolve::{dominant_successor, ExactResolver, FuzzyResolver, ResolveContext};
pub use result::{MatchResult, MatchedHow, Resolution, StageMatch};
pub use similarity::{JaroWinkler, Similarity, TokenSortRatio};
