//! Error types
//!
//! Only configuration and reference-store problems are errors. Inputs that
//! cannot be resolved come back as a `MatchResult` without a value.

use thiserror::Error;

/// Errors raised while configuring a session or building a reference store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A 0-100 threshold was out of range
    #[error("{name} must be between 0 and 100, got {value}")]
    InvalidThreshold { name: &'static str, value: u8 },

    /// Date filter could not be parsed
    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    /// Delimiters must be non-empty strings
    #[error("delimiter must not be empty")]
    InvalidDelimiter,

    /// One of the four reference tables was never supplied
    #[error("reference table '{table}' missing for match year {match_year}")]
    MissingTable {
        table: &'static str,
        match_year: i32,
    },

    /// No municipality is active at the requested year
    #[error("no active municipalities for match year {match_year}")]
    EmptySnapshot { match_year: i32 },

    /// Two active municipalities fold to the same name
    #[error("duplicate active municipality '{name}' in match year {match_year}")]
    DuplicateMunicipality { name: String, match_year: i32 },
}

/// Result type for configuration and store construction
pub type Result<T> = std::result::Result<T, Error>;
