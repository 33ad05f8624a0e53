//! Year-scoped, read-only reference snapshot
//!
//! Built once per match year from the four parsed tables, then shared by
//! every resolver. All keys are folded with [`fold`] at build time so the
//! resolvers only ever compare folded strings.

use std::collections::BTreeSet;

use ahash::AHashMap;
use chrono::NaiveDate;
use tracing::{info, warn};

use super::types::{
    reference_date, AreaCodeEntry, FormerMunicipality, Municipality, Neighbourhood, PlaceName,
};
use crate::error::{Error, Result};
use crate::normalize::{fold, statistical_code};

/// Tolerance on the sum of successor fractions before a warning is logged
const FRACTION_TOLERANCE: f64 = 0.02;

/// A municipality that exists in the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMunicipality {
    /// Official name as supplied
    pub name: String,
    /// Folded name
    pub key: String,
    /// Folded province, if known
    pub province: Option<String>,
}

/// A place or neighbourhood name and the distinct municipalities it occurs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    pub key: String,
    /// Canonical municipality names, sorted
    pub municipalities: Vec<String>,
}

/// A former municipality and its folded name
#[derive(Debug, Clone, PartialEq)]
pub struct FormerEntry {
    pub key: String,
    pub record: FormerMunicipality,
}

/// Folded locality names grouped by key
#[derive(Debug, Default)]
pub struct LocalityIndex {
    entries: Vec<Locality>,
    by_key: AHashMap<String, usize>,
}

impl LocalityIndex {
    fn build<'a>(
        rows: impl Iterator<Item = (&'a str, &'a str)>,
        municipality_index: &AHashMap<String, usize>,
        municipalities: &[ActiveMunicipality],
    ) -> (Self, usize) {
        let mut grouped: AHashMap<String, BTreeSet<String>> = AHashMap::new();
        let mut dropped = 0;

        for (name, municipality) in rows {
            let key = fold(name);
            if key.is_empty() {
                continue;
            }
            match municipality_index.get(&fold(municipality)) {
                Some(&idx) => {
                    grouped
                        .entry(key)
                        .or_default()
                        .insert(municipalities[idx].name.clone());
                }
                None => dropped += 1,
            }
        }

        let mut entries: Vec<Locality> = grouped
            .into_iter()
            .map(|(key, set)| Locality {
                key,
                municipalities: set.into_iter().collect(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        let by_key = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.key.clone(), idx))
            .collect();

        (Self { entries, by_key }, dropped)
    }

    /// Exact lookup of a folded name
    pub fn get(&self, key: &str) -> Option<&Locality> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[Locality] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table sizes of a built snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub municipalities: usize,
    pub former_municipalities: usize,
    pub place_names: usize,
    pub neighbourhoods: usize,
    pub area_codes: usize,
}

/// Immutable lookup tables for one match year.
///
/// `ReferenceStore` holds no interior mutability; wrap it in an `Arc` to
/// share it between threads.
#[derive(Debug)]
pub struct ReferenceStore {
    match_year: i32,
    reference_date: NaiveDate,
    municipalities: Vec<ActiveMunicipality>,
    municipality_index: AHashMap<String, usize>,
    former: Vec<FormerEntry>,
    former_by_name: AHashMap<String, Vec<usize>>,
    former_by_code: AHashMap<String, Vec<usize>>,
    places: LocalityIndex,
    neighbourhoods: LocalityIndex,
    area_codes: AHashMap<String, String>,
}

impl ReferenceStore {
    pub fn builder(match_year: i32) -> ReferenceStoreBuilder {
        ReferenceStoreBuilder::new(match_year)
    }

    pub fn match_year(&self) -> i32 {
        self.match_year
    }

    /// 1 January of the match year
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Active municipality by folded name
    pub fn municipality(&self, key: &str) -> Option<&ActiveMunicipality> {
        self.municipality_index
            .get(key)
            .map(|&idx| &self.municipalities[idx])
    }

    /// All active municipalities, sorted by folded name
    pub fn municipalities(&self) -> &[ActiveMunicipality] {
        &self.municipalities
    }

    /// Whether the canonical municipality `name` lies in the folded `province`
    pub fn in_province(&self, name: &str, province: &str) -> bool {
        self.municipality(&fold(name))
            .and_then(|m| m.province.as_deref())
            .map_or(false, |p| p == province)
    }

    /// Former municipalities with this folded name
    pub fn former_by_name<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a FormerMunicipality> + 'a {
        self.former_lookup(self.former_by_name.get(key))
    }

    /// Former municipalities with this statistical code (digits, no leading zeros)
    pub fn former_by_code<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a FormerMunicipality> + 'a {
        self.former_lookup(self.former_by_code.get(code))
    }

    fn former_lookup<'a>(
        &'a self,
        indices: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a FormerMunicipality> + 'a {
        indices
            .into_iter()
            .flatten()
            .map(move |&idx| &self.former[idx].record)
    }

    /// Former municipalities dissolved by the reference date, sorted by name
    pub fn former_entries(&self) -> &[FormerEntry] {
        &self.former
    }

    pub fn places(&self) -> &LocalityIndex {
        &self.places
    }

    pub fn neighbourhoods(&self) -> &LocalityIndex {
        &self.neighbourhoods
    }

    /// Folded main place for an area code
    pub fn area_code(&self, code: &str) -> Option<&str> {
        self.area_codes.get(code).map(String::as_str)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            municipalities: self.municipalities.len(),
            former_municipalities: self.former.len(),
            place_names: self.places.len(),
            neighbourhoods: self.neighbourhoods.len(),
            area_codes: self.area_codes.len(),
        }
    }
}

/// Collects the parsed tables for one match year
#[derive(Debug)]
pub struct ReferenceStoreBuilder {
    match_year: i32,
    municipalities: Option<Vec<Municipality>>,
    former: Option<Vec<FormerMunicipality>>,
    places: Option<Vec<PlaceName>>,
    neighbourhoods: Option<Vec<Neighbourhood>>,
    area_codes: Vec<AreaCodeEntry>,
}

impl ReferenceStoreBuilder {
    pub fn new(match_year: i32) -> Self {
        Self {
            match_year,
            municipalities: None,
            former: None,
            places: None,
            neighbourhoods: None,
            area_codes: Vec::new(),
        }
    }

    pub fn municipalities(mut self, rows: Vec<Municipality>) -> Self {
        self.municipalities = Some(rows);
        self
    }

    pub fn former_municipalities(mut self, rows: Vec<FormerMunicipality>) -> Self {
        self.former = Some(rows);
        self
    }

    pub fn place_names(mut self, rows: Vec<PlaceName>) -> Self {
        self.places = Some(rows);
        self
    }

    pub fn neighbourhoods(mut self, rows: Vec<Neighbourhood>) -> Self {
        self.neighbourhoods = Some(rows);
        self
    }

    /// Optional: without area codes no substitution happens
    pub fn area_codes(mut self, rows: Vec<AreaCodeEntry>) -> Self {
        self.area_codes = rows;
        self
    }

    /// Validate the tables and build the indexes
    pub fn build(self) -> Result<ReferenceStore> {
        let match_year = self.match_year;
        let missing = |table: &'static str| Error::MissingTable { table, match_year };

        let municipalities = self.municipalities.ok_or_else(|| missing("municipalities"))?;
        let former = self.former.ok_or_else(|| missing("former_municipalities"))?;
        let places = self.places.ok_or_else(|| missing("place_names"))?;
        let neighbourhoods = self.neighbourhoods.ok_or_else(|| missing("neighbourhoods"))?;

        let reference_date =
            reference_date(match_year).ok_or(Error::EmptySnapshot { match_year })?;

        // Active snapshot
        let mut active: Vec<ActiveMunicipality> = municipalities
            .into_iter()
            .filter(|m| m.is_active_in(match_year))
            .map(|m| ActiveMunicipality {
                key: fold(&m.canonical_name),
                province: m.province.as_deref().map(fold),
                name: m.canonical_name,
            })
            .collect();
        if active.is_empty() {
            return Err(Error::EmptySnapshot { match_year });
        }
        active.sort_by(|a, b| a.key.cmp(&b.key));

        let mut municipality_index = AHashMap::with_capacity(active.len());
        for (idx, m) in active.iter().enumerate() {
            if municipality_index.insert(m.key.clone(), idx).is_some() {
                return Err(Error::DuplicateMunicipality {
                    name: m.name.clone(),
                    match_year,
                });
            }
        }

        // Former municipalities dissolved by the reference date
        let mut former: Vec<FormerMunicipality> = former
            .into_iter()
            .filter(|f| f.dissolved_on <= reference_date)
            .filter(|f| {
                if f.successors.is_empty() {
                    warn!(former = %f.former_name, "former municipality without successors skipped");
                    return false;
                }
                true
            })
            .collect();
        former.sort_by(|a, b| {
            a.former_name
                .cmp(&b.former_name)
                .then_with(|| a.dissolved_on.cmp(&b.dissolved_on))
        });
        for f in &former {
            let total = f.fraction_total();
            if (total - 1.0).abs() > FRACTION_TOLERANCE {
                warn!(former = %f.former_name, total, "successor fractions do not sum to 1.0");
            }
        }

        let former: Vec<FormerEntry> = former
            .into_iter()
            .map(|record| FormerEntry {
                key: fold(&record.former_name),
                record,
            })
            .collect();
        let mut former_by_name: AHashMap<String, Vec<usize>> = AHashMap::new();
        let mut former_by_code: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (idx, entry) in former.iter().enumerate() {
            former_by_name.entry(entry.key.clone()).or_default().push(idx);
            let code = entry
                .record
                .code
                .as_deref()
                .and_then(|c| statistical_code(&fold(c)));
            if let Some(code) = code {
                former_by_code.entry(code).or_default().push(idx);
            }
        }

        let (places, dropped_places) = LocalityIndex::build(
            places.iter().map(|p| (p.place.as_str(), p.municipality.as_str())),
            &municipality_index,
            &active,
        );
        let (neighbourhoods, dropped_neighbourhoods) = LocalityIndex::build(
            neighbourhoods
                .iter()
                .map(|n| (n.neighbourhood.as_str(), n.municipality.as_str())),
            &municipality_index,
            &active,
        );
        if dropped_places > 0 || dropped_neighbourhoods > 0 {
            warn!(
                match_year,
                dropped_places,
                dropped_neighbourhoods,
                "rows referencing municipalities outside the snapshot dropped"
            );
        }

        let area_codes = self
            .area_codes
            .into_iter()
            .map(|a| (a.code.trim().to_string(), fold(&a.main_place)))
            .collect();

        let store = ReferenceStore {
            match_year,
            reference_date,
            municipalities: active,
            municipality_index,
            former,
            former_by_name,
            former_by_code,
            places,
            neighbourhoods,
            area_codes,
        };

        let stats = store.stats();
        info!(
            match_year,
            municipalities = stats.municipalities,
            former = stats.former_municipalities,
            places = stats.place_names,
            neighbourhoods = stats.neighbourhoods,
            area_codes = stats.area_codes,
            "reference store built"
        );

        Ok(store)
    }
}
