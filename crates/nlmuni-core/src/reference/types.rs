//! Reference table rows
//!
//! These are the already-parsed rows handed over by whatever loads the
//! statistical and encyclopedic sources. Nothing here fetches or parses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A municipality with its period of existence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    /// Official name, e.g. "'s-Gravenhage"
    pub canonical_name: String,

    /// Province the municipality belongs to, used for narrowing
    #[serde(default)]
    pub province: Option<String>,

    /// First day the municipality existed
    pub active_from: NaiveDate,

    /// Last day the municipality existed (inclusive), `None` while it still exists
    #[serde(default)]
    pub active_to: Option<NaiveDate>,
}

impl Municipality {
    pub fn new(canonical_name: impl Into<String>, active_from: NaiveDate) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            province: None,
            active_from,
            active_to: None,
        }
    }

    pub fn province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn until(mut self, active_to: NaiveDate) -> Self {
        self.active_to = Some(active_to);
        self
    }

    /// Whether the municipality existed on 1 January of `year`
    pub fn is_active_in(&self, year: i32) -> bool {
        match reference_date(year) {
            Some(day) => {
                self.active_from <= day && self.active_to.map_or(true, |end| day <= end)
            }
            None => false,
        }
    }
}

/// One successor of a dissolved municipality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Successor {
    pub municipality: String,
    /// Share of the former population that moved to this successor (0.0 - 1.0)
    pub population_fraction: f64,
}

impl Successor {
    pub fn new(municipality: impl Into<String>, population_fraction: f64) -> Self {
        Self {
            municipality: municipality.into(),
            population_fraction,
        }
    }
}

/// A dissolved municipality and where its population went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormerMunicipality {
    pub former_name: String,

    /// Statistical code, e.g. "GM0363"
    #[serde(default)]
    pub code: Option<String>,

    pub dissolved_on: NaiveDate,

    /// Ordered successors; fractions sum to about 1.0
    pub successors: Vec<Successor>,
}

impl FormerMunicipality {
    pub fn new(former_name: impl Into<String>, dissolved_on: NaiveDate) -> Self {
        Self {
            former_name: former_name.into(),
            code: None,
            dissolved_on,
            successors: Vec::new(),
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn successor(mut self, municipality: impl Into<String>, fraction: f64) -> Self {
        self.successors.push(Successor::new(municipality, fraction));
        self
    }

    /// Sum of all successor fractions
    pub fn fraction_total(&self) -> f64 {
        self.successors.iter().map(|s| s.population_fraction).sum()
    }
}

/// A settlement and the municipality it lies in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceName {
    pub place: String,
    pub municipality: String,
}

impl PlaceName {
    pub fn new(place: impl Into<String>, municipality: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            municipality: municipality.into(),
        }
    }
}

/// A neighbourhood and the municipality it lies in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbourhood {
    pub neighbourhood: String,
    pub municipality: String,
}

impl Neighbourhood {
    pub fn new(neighbourhood: impl Into<String>, municipality: impl Into<String>) -> Self {
        Self {
            neighbourhood: neighbourhood.into(),
            municipality: municipality.into(),
        }
    }
}

/// Telephone area code and the main place it serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaCodeEntry {
    pub code: String,
    pub main_place: String,
}

impl AreaCodeEntry {
    pub fn new(code: impl Into<String>, main_place: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            main_place: main_place.into(),
        }
    }
}

/// 1 January of `year`, the day a snapshot describes
pub fn reference_date(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}
