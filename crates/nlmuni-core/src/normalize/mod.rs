//! Input normalization
//!
//! Turns one raw location string into an ordered list of candidate keys:
//!
//! 1. Fold (case, diacritics, whitespace); ignored inputs stop here
//! 2. Special cases (the two Bergens) resolve immediately
//! 3. `clean`: strip surrounding punctuation, restore `'s-` prefixes,
//!    substitute a whole-string area code
//! 4. Remove country tokens as whole words
//! 5. Recode the whole string
//! 6. Split on delimiters; clean, area-code and recode every token
//!
//! Recoded candidates come first, then the split tokens left to right.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use nlmuni_core::normalize::Normalizer;
//! use nlmuni_core::reference::{Municipality, ReferenceStore};
//! use nlmuni_core::MatchOptions;
//!
//! let since = NaiveDate::from_ymd_opt(1812, 1, 1).unwrap();
//! let store = ReferenceStore::builder(2024)
//!     .municipalities(vec![Municipality::new("Rotterdam", since)])
//!     .former_municipalities(vec![])
//!     .place_names(vec![])
//!     .neighbourhoods(vec![])
//!     .build()
//!     .unwrap();
//!
//! let options = MatchOptions::default();
//! let candidates = Normalizer::new(&store, &options).candidates("Delfshaven, Rotterdam");
//! let keys: Vec<&str> = candidates.iter().map(|c| c.key.as_str()).collect();
//! assert_eq!(keys, vec!["delfshaven", "rotterdam"]);
//! ```

mod text;

pub use text::{
    canonical_s_prefix, fold, is_area_code, remove_word, statistical_code, strip_punctuation,
};

use crate::options::MatchOptions;
use crate::reference::ReferenceStore;

/// Tokens shorter than this are dropped after splitting
const MIN_TOKEN_CHARS: usize = 2;

/// Separator the delimiters are rewritten to before splitting
const SPLIT: char = '\u{1f}';

/// A folded string to try against the reference tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    /// Produced by the recode map or a special case
    pub recoded: bool,
}

impl Candidate {
    fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            recoded: false,
        }
    }

    fn recoded(canonical: &str) -> Self {
        Self {
            key: fold(canonical),
            recoded: true,
        }
    }
}

/// Normalizer bound to one snapshot and one set of options
pub struct Normalizer<'a> {
    store: &'a ReferenceStore,
    options: &'a MatchOptions,
}

impl<'a> Normalizer<'a> {
    pub fn new(store: &'a ReferenceStore, options: &'a MatchOptions) -> Self {
        Self { store, options }
    }

    /// Ordered, de-duplicated candidates for a raw input.
    ///
    /// Empty when the input is blank or ignored.
    pub fn candidates(&self, raw: &str) -> Vec<Candidate> {
        let folded = fold(raw);
        if folded.is_empty() || self.options.ignore.contains(&folded) {
            return Vec::new();
        }

        if let Some(rule) = self
            .options
            .special_cases
            .iter()
            .find(|rule| rule.applies(&folded))
        {
            return vec![Candidate::recoded(&rule.target)];
        }

        let mut text = if self.options.clean {
            self.clean_token(&folded)
        } else {
            folded
        };
        for token in &self.options.remove_tokens {
            text = remove_word(&text, &fold(token));
        }

        let mut recoded = Vec::new();
        let mut plain = Vec::new();

        if let Some(canonical) = self.options.recode_map.get(&text) {
            recoded.push(Candidate::recoded(canonical));
        }

        for token in self.split(&text) {
            let token = if self.options.clean {
                self.clean_token(&token)
            } else {
                token
            };
            if token.chars().count() < MIN_TOKEN_CHARS {
                continue;
            }
            match self.options.recode_map.get(&token) {
                Some(canonical) => recoded.push(Candidate::recoded(canonical)),
                None => plain.push(Candidate::plain(token)),
            }
        }

        let mut candidates: Vec<Candidate> = Vec::with_capacity(recoded.len() + plain.len());
        for candidate in recoded.into_iter().chain(plain) {
            if !candidates.iter().any(|c| c.key == candidate.key) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// Strip punctuation, restore `'s-`, substitute area codes
    fn clean_token(&self, token: &str) -> String {
        let stripped = strip_punctuation(token);
        if is_area_code(stripped) {
            if let Some(place) = self.store.area_code(stripped) {
                return place.to_string();
            }
        }
        canonical_s_prefix(stripped)
    }

    /// Split on every configured delimiter, keeping order
    fn split(&self, text: &str) -> Vec<String> {
        let mut joined = text.to_string();
        for delimiter in &self.options.delimiters {
            joined = joined.replace(delimiter.as_str(), &SPLIT.to_string());
        }

        joined
            .split(SPLIT)
            .map(|token| token.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|token| !token.is_empty())
            .collect()
    }
}
