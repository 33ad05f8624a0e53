//! Resolution results and provenance

use serde::{Deserialize, Serialize};

/// Which table and strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedHow {
    ExactMunicipality,
    ExactHistory,
    ExactPlace,
    ExactNeighbourhood,
    FuzzyMunicipality,
    FuzzyHistory,
    FuzzyPlace,
    FuzzyNeighbourhood,
    /// Nothing matched
    None,
}

impl MatchedHow {
    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            Self::ExactMunicipality | Self::ExactHistory | Self::ExactPlace | Self::ExactNeighbourhood
        )
    }

    pub fn is_fuzzy(&self) -> bool {
        matches!(
            self,
            Self::FuzzyMunicipality | Self::FuzzyHistory | Self::FuzzyPlace | Self::FuzzyNeighbourhood
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactMunicipality => "exact_municipality",
            Self::ExactHistory => "exact_history",
            Self::ExactPlace => "exact_place",
            Self::ExactNeighbourhood => "exact_neighbourhood",
            Self::FuzzyMunicipality => "fuzzy_municipality",
            Self::FuzzyHistory => "fuzzy_history",
            Self::FuzzyPlace => "fuzzy_place",
            Self::FuzzyNeighbourhood => "fuzzy_neighbourhood",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for MatchedHow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful lookup by one resolver stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMatch {
    pub value: String,
    pub how: MatchedHow,
    pub score: u8,
}

impl StageMatch {
    pub(crate) fn new(value: impl Into<String>, how: MatchedHow, score: u8) -> Self {
        Self {
            value: value.into(),
            how,
            score,
        }
    }
}

/// Outcome of resolving one raw input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    pub input: String,
    pub matched_value: Option<String>,
    pub matched_how: MatchedHow,
    /// 100 for exact matches, the similarity for fuzzy ones
    pub score: Option<u8>,
}

impl MatchResult {
    pub fn none(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            matched_value: None,
            matched_how: MatchedHow::None,
            score: None,
        }
    }

    pub fn matched(input: impl Into<String>, stage: StageMatch) -> Self {
        Self {
            input: input.into(),
            matched_value: Some(stage.value),
            matched_how: stage.how,
            score: Some(stage.score),
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched_value.is_some()
    }
}

/// What a caller gets back, shaped by `MatchOptions::return_how`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    /// Just the municipality name
    Name(Option<String>),
    /// The name plus provenance and score
    Full(MatchResult),
}

impl Resolution {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => name.as_deref(),
            Self::Full(result) => result.matched_value.as_deref(),
        }
    }
}
