//! String similarity scoring
//!
//! Resolvers take any [`Similarity`]; plain closures qualify. Scores are
//! integers from 0 (nothing in common) to 100 (identical).

use strsim::{jaro_winkler, normalized_levenshtein};

/// A symmetric, deterministic 0-100 similarity score
pub trait Similarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> u8;
}

impl<F> Similarity for F
where
    F: Fn(&str, &str) -> u8 + Send + Sync,
{
    fn score(&self, a: &str, b: &str) -> u8 {
        self(a, b)
    }
}

/// Levenshtein ratio of the whitespace tokens, sorted.
///
/// Word order is ignored, so "haag den" scores 100 against "den haag".
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl Similarity for TokenSortRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        to_percent(normalized_levenshtein(&sort_tokens(a), &sort_tokens(b)))
    }
}

/// Jaro-Winkler similarity, which favours shared prefixes
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Similarity for JaroWinkler {
    fn score(&self, a: &str, b: &str) -> u8 {
        to_percent(jaro_winkler(a, b))
    }
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[inline]
fn to_percent(ratio: f64) -> u8 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u8
}
