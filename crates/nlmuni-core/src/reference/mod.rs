//! Reference data
//!
//! The four tables the resolvers consult, in priority order:
//!
//! 1. Municipalities active at the match year
//! 2. Former municipalities, with population shares per successor
//! 3. Place names (woonplaatsen)
//! 4. Neighbourhoods (wijken en buurten)
//!
//! plus an area-code table used only by the normalizer.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use nlmuni_core::reference::{Municipality, PlaceName, ReferenceStore};
//!
//! let since = NaiveDate::from_ymd_opt(1812, 1, 1).unwrap();
//! let store = ReferenceStore::builder(2024)
//!     .municipalities(vec![Municipality::new("Rotterdam", since)])
//!     .former_municipalities(vec![])
//!     .place_names(vec![PlaceName::new("Delfshaven", "Rotterdam")])
//!     .neighbourhoods(vec![])
//!     .build()
//!     .unwrap();
//!
//! assert!(store.municipality("rotterdam").is_some());
//! ```

mod store;
mod types;

pub use store::{
    ActiveMunicipality, FormerEntry, Locality, LocalityIndex, ReferenceStore,
    ReferenceStoreBuilder, StoreStats,
};
pub use types::{
    reference_date, AreaCodeEntry, FormerMunicipality, Municipality, Neighbourhood, PlaceName,
    Successor,
};
