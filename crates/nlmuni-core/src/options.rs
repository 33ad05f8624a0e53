//! Matching options
//!
//! `MatchOptions` is a value type: it derives `Eq` and `Hash` so a set of
//! options can key the result cache directly.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::fold;

/// Default minimum score for fuzzy matches
pub const DEFAULT_THRESHOLD_FUZZY: u8 = 85;

/// Default minimum population share for a successor to inherit a former name
pub const DEFAULT_THRESHOLD_RATIO: u8 = 80;

/// Default delimiters for splitting compound locations
pub const DEFAULT_DELIMITERS: &[&str] = &[",", "/", ";", "(", ")", "|", "&"];

/// Country-level tokens removed before matching. Province names are left
/// in: several collide with municipality names (Utrecht, Groningen).
pub const DEFAULT_REMOVE_TOKENS: &[&str] = &[
    "the netherlands",
    "nederland",
    "netherlands",
    "holland",
    "gemeente",
    "nl",
    "europe",
    "europa",
];

/// Aliases shipped with the crate
const DEFAULT_RECODES: &[(&str, &str)] = &[
    ("den bosch", "'s-Hertogenbosch"),
    ("den haag", "'s-Gravenhage"),
    ("the hague", "'s-Gravenhage"),
    ("la haye", "'s-Gravenhage"),
];

/// Mapping from a free-text alias to a canonical municipality name.
///
/// Keys are stored folded, so lookups are case and diacritic insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecodeMap(BTreeMap<String, String>);

impl Default for RecodeMap {
    fn default() -> Self {
        Self::empty().merge(DEFAULT_RECODES.iter().copied())
    }
}

impl RecodeMap {
    /// A map with no aliases at all
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Add aliases, overriding existing ones with the same folded key
    pub fn merge<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (alias, canonical) in entries {
            self.0.insert(fold(alias.as_ref()), canonical.into());
        }
        self
    }

    /// Look up an already-folded alias
    pub fn get(&self, folded: &str) -> Option<&str> {
        self.0.get(folded).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A hard-wired disambiguation for names shared by several municipalities.
///
/// Applies when the folded input starts with `prefix` and contains any of
/// `markers`; the input then resolves straight to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialCase {
    pub prefix: String,
    pub markers: Vec<String>,
    pub target: String,
}

impl SpecialCase {
    pub fn new(
        prefix: impl Into<String>,
        markers: impl IntoIterator<Item = impl Into<String>>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            markers: markers.into_iter().map(Into::into).collect(),
            target: target.into(),
        }
    }

    /// Whether this rule fires for a folded input
    pub fn applies(&self, folded: &str) -> bool {
        folded.starts_with(&self.prefix) && self.markers.iter().any(|m| folded.contains(m.as_str()))
    }

    /// The two Bergens
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "bergen ",
                ["n.h.", "(nh", " nh", "noord-holland"],
                "Bergen (NH.)",
            ),
            Self::new("bergen ", ["(l)", "(l.)", " l ", "limburg"], "Bergen (L.)"),
        ]
    }
}

/// Options controlling a single resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Restrict candidate municipalities to this province
    pub province: Option<String>,
    /// Former municipalities dissolved before this date are ignored
    pub date: Option<NaiveDate>,
    /// Separators for compound locations
    pub delimiters: Vec<String>,
    /// Lowercase, strip punctuation, substitute area codes
    pub clean: bool,
    pub check_history: bool,
    pub check_places: bool,
    /// Fuzzy place matching; only consulted when `check_places` is on
    pub check_places_fuzzy: bool,
    pub check_neighbourhoods: bool,
    pub check_fuzzy: bool,
    /// Minimum fuzzy score (0-100); 100 degenerates to exact matching
    pub threshold_fuzzy: u8,
    /// Minimum successor population share in percent (0-100)
    pub threshold_ratio: u8,
    pub recode_map: RecodeMap,
    /// Whole-word tokens removed from every input
    pub remove_tokens: Vec<String>,
    /// Inputs that resolve to nothing without being looked up
    pub ignore: BTreeSet<String>,
    pub special_cases: Vec<SpecialCase>,
    /// Surface the full `MatchResult` instead of only the name
    pub return_how: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            province: None,
            date: None,
            delimiters: DEFAULT_DELIMITERS.iter().map(|d| d.to_string()).collect(),
            clean: true,
            check_history: true,
            check_places: true,
            check_places_fuzzy: true,
            check_neighbourhoods: true,
            check_fuzzy: true,
            threshold_fuzzy: DEFAULT_THRESHOLD_FUZZY,
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            recode_map: RecodeMap::default(),
            remove_tokens: DEFAULT_REMOVE_TOKENS.iter().map(|t| t.to_string()).collect(),
            ignore: BTreeSet::new(),
            special_cases: SpecialCase::defaults(),
            return_how: false,
        }
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject out-of-range thresholds and empty delimiters
    pub fn validate(&self) -> Result<()> {
        if self.threshold_fuzzy > 100 {
            return Err(Error::InvalidThreshold {
                name: "threshold_fuzzy",
                value: self.threshold_fuzzy,
            });
        }
        if self.threshold_ratio > 100 {
            return Err(Error::InvalidThreshold {
                name: "threshold_ratio",
                value: self.threshold_ratio,
            });
        }
        if self.delimiters.iter().any(|d| d.is_empty()) {
            return Err(Error::InvalidDelimiter);
        }
        Ok(())
    }

    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the date filter from `YYYY-MM-DD` or a bare `YYYY`
    pub fn with_date_str(mut self, date: &str) -> Result<Self> {
        self.date = Some(parse_date(date)?);
        Ok(self)
    }

    pub fn with_delimiters(mut self, delimiters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.delimiters = delimiters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_history(mut self, check_history: bool) -> Self {
        self.check_history = check_history;
        self
    }

    pub fn with_places(mut self, check_places: bool) -> Self {
        self.check_places = check_places;
        self
    }

    pub fn with_places_fuzzy(mut self, check_places_fuzzy: bool) -> Self {
        self.check_places_fuzzy = check_places_fuzzy;
        self
    }

    pub fn with_neighbourhoods(mut self, check_neighbourhoods: bool) -> Self {
        self.check_neighbourhoods = check_neighbourhoods;
        self
    }

    pub fn with_fuzzy(mut self, check_fuzzy: bool) -> Self {
        self.check_fuzzy = check_fuzzy;
        self
    }

    pub fn with_threshold_fuzzy(mut self, threshold: u8) -> Self {
        self.threshold_fuzzy = threshold;
        self
    }

    pub fn with_threshold_ratio(mut self, threshold: u8) -> Self {
        self.threshold_ratio = threshold;
        self
    }

    /// Merge caller aliases over the current recode map
    pub fn with_recodes<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.recode_map = self.recode_map.merge(entries);
        self
    }

    /// Replace the recode map entirely
    pub fn with_recode_map(mut self, recode_map: RecodeMap) -> Self {
        self.recode_map = recode_map;
        self
    }

    pub fn with_remove_tokens(mut self, tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.remove_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignore(mut self, values: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.ignore
            .extend(values.into_iter().map(|v| fold(v.as_ref())));
        self
    }

    pub fn with_special_cases(mut self, special_cases: Vec<SpecialCase>) -> Self {
        self.special_cases = special_cases;
        self
    }

    pub fn with_return_how(mut self, return_how: bool) -> Self {
        self.return_how = return_how;
        self
    }

    /// The options that influence a `MatchResult`, used as cache key
    pub fn effective(&self) -> Self {
        let mut effective = self.clone();
        effective.return_how = false;
        effective
    }

    /// Minimum successor share as a fraction
    pub(crate) fn ratio_fraction(&self) -> f64 {
        f64::from(self.threshold_ratio) / 100.0
    }
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let parsed = if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        trimmed
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .ok_or_else(|| "year out of range".to_string())
    } else {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| Error::InvalidDate {
        input: input.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(MatchOptions::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let options = MatchOptions::default().with_threshold_fuzzy(101);
        assert_eq!(
            options.validate(),
            Err(Error::InvalidThreshold {
                name: "threshold_fuzzy",
                value: 101
            })
        );

        let options = MatchOptions::default().with_threshold_ratio(200);
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidThreshold { name: "threshold_ratio", .. })
        ));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let options = MatchOptions::default().with_delimiters([",", ""]);
        assert_eq!(options.validate(), Err(Error::InvalidDelimiter));
    }

    #[test]
    fn test_date_parsing() {
        let options = MatchOptions::default().with_date_str("2019-01-01").unwrap();
        assert_eq!(options.date, NaiveDate::from_ymd_opt(2019, 1, 1));

        let options = MatchOptions::default().with_date_str("2001").unwrap();
        assert_eq!(options.date, NaiveDate::from_ymd_opt(2001, 1, 1));

        let err = MatchOptions::default().with_date_str("last tuesday").unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));
    }

    #[test]
    fn test_recode_merge_overrides_defaults() {
        let options = MatchOptions::default().with_recodes([("Den Haag", "Den Haag")]);
        assert_eq!(options.recode_map.get("den haag"), Some("Den Haag"));
        // Defaults stay in place
        assert_eq!(options.recode_map.get("den bosch"), Some("'s-Hertogenbosch"));
    }

    #[test]
    fn test_default_recodes_are_not_global() {
        let _extended = MatchOptions::default().with_recodes([("mokum", "Amsterdam")]);
        assert_eq!(MatchOptions::default().recode_map.get("mokum"), None);
    }

    #[test]
    fn test_effective_ignores_return_how() {
        let a = MatchOptions::default().with_return_how(true);
        let b = MatchOptions::default();
        assert_ne!(a, b);
        assert_eq!(a.effective(), b.effective());
    }

    #[test]
    fn test_special_case_bergen() {
        let rules = SpecialCase::defaults();
        assert!(rules[0].applies("bergen (nh)"));
        assert!(rules[1].applies("bergen limburg"));
        assert!(!rules[0].applies("bergen op zoom"));
    }
}
