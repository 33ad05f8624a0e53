//! Candidate resolvers
//!
//! Both resolvers try the same four stages, in order, and stop at the first
//! stage that yields a unique municipality:
//!
//! 1. Municipality (active at the match year)
//! 2. History (former municipalities, via the population-ratio rule)
//! 3. Place name
//! 4. Neighbourhood
//!
//! A province filter narrows every stage before uniqueness is checked.

mod exact;
mod fuzzy;
mod succession;

pub use exact::ExactResolver;
pub use fuzzy::{FuzzyResolver, DEFAULT_PARALLEL_THRESHOLD};
pub use succession::dominant_successor;

use std::collections::BTreeSet;

use crate::normalize::fold;
use crate::options::MatchOptions;
use crate::reference::ReferenceStore;

/// Snapshot and options shared by the resolvers for one lookup
pub struct ResolveContext<'a> {
    pub store: &'a ReferenceStore,
    pub options: &'a MatchOptions,
    province: Option<String>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(store: &'a ReferenceStore, options: &'a MatchOptions) -> Self {
        Self {
            store,
            options,
            province: options.province.as_deref().map(fold),
        }
    }

    /// Whether a canonical municipality passes the province filter
    pub fn in_province(&self, municipality: &str) -> bool {
        match &self.province {
            Some(province) => self.store.in_province(municipality, province),
            None => true,
        }
    }

    /// Whether a folded province passes the province filter
    fn province_matches(&self, province: Option<&str>) -> bool {
        match &self.province {
            Some(wanted) => province == Some(wanted.as_str()),
            None => true,
        }
    }

    /// The single municipality left after province narrowing, if exactly one
    fn unique_municipality<'m>(
        &self,
        municipalities: impl IntoIterator<Item = &'m String>,
    ) -> Option<&'m str> {
        let distinct: BTreeSet<&str> = municipalities
            .into_iter()
            .map(String::as_str)
            .filter(|m| self.in_province(m))
            .collect();

        if distinct.len() == 1 {
            distinct.into_iter().next()
        } else {
            None
        }
    }
}
