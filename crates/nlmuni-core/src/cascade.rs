//! Match cascade
//!
//! A `Guesser` ties a reference snapshot, default options, a similarity
//! function and a result cache together. Every lookup runs the same way:
//!
//! 1. Return the cached result for (effective options, raw input) if any
//! 2. Normalize the input into ordered candidates
//! 3. Try the exact resolver on every candidate, first hit wins
//! 4. Only then, if enabled, try the fuzzy resolver on every candidate
//! 5. Cache the outcome, including misses
//!
//! Exact matching is exhausted across all candidates before fuzzy matching
//! starts, so an exact hit on a later candidate beats a fuzzy hit on an
//! earlier one.

use std::borrow::Cow;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cache::ResultCache;
use crate::error::Result;
use crate::normalize::{Candidate, Normalizer};
use crate::options::MatchOptions;
use crate::reference::ReferenceStore;
use crate::resolve::{ExactResolver, FuzzyResolver, ResolveContext, DEFAULT_PARALLEL_THRESHOLD};
use crate::result::{MatchResult, Resolution, StageMatch};
use crate::similarity::{Similarity, TokenSortRatio};

/// Resolution session over one reference snapshot
pub struct Guesser {
    store: Arc<ReferenceStore>,
    options: MatchOptions,
    similarity: Box<dyn Similarity>,
    cache: ResultCache,
    parallel_threshold: usize,
}

impl std::fmt::Debug for Guesser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guesser")
            .field("match_year", &self.store.match_year())
            .field("options", &self.options)
            .field("cache", &self.cache.stats())
            .finish()
    }
}

impl Guesser {
    /// Session with default options and token-sort similarity
    pub fn new(store: Arc<ReferenceStore>) -> Self {
        Self {
            store,
            options: MatchOptions::default(),
            similarity: Box::new(TokenSortRatio),
            cache: ResultCache::new(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn builder(store: Arc<ReferenceStore>) -> GuesserBuilder {
        GuesserBuilder::new(store)
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Year the reference snapshot was taken for
    pub fn match_year(&self) -> i32 {
        self.store.match_year()
    }

    /// Resolve with the session options
    pub fn guess(&self, raw: &str) -> MatchResult {
        self.guess_validated(raw, &self.options)
    }

    /// Resolve with per-call options; only invalid options fail
    pub fn guess_with(&self, raw: &str, options: &MatchOptions) -> Result<MatchResult> {
        options.validate()?;
        Ok(self.guess_validated(raw, options))
    }

    /// Just the municipality name, if any
    pub fn guess_name(&self, raw: &str) -> Option<String> {
        self.guess(raw).matched_value
    }

    /// Name or full result, depending on `return_how`
    pub fn resolve(&self, raw: &str) -> Resolution {
        shape(self.guess(raw), self.options.return_how)
    }

    /// Name or full result, shaped by the per-call `return_how`
    pub fn resolve_with(&self, raw: &str, options: &MatchOptions) -> Result<Resolution> {
        let result = self.guess_with(raw, options)?;
        Ok(shape(result, options.return_how))
    }

    /// Resolve a batch, in input order.
    ///
    /// Each distinct input is resolved at most once; repeated inputs share
    /// the result.
    pub fn guess_many<'i, I>(&self, inputs: I) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = &'i str>,
    {
        let inputs: Vec<&str> = inputs.into_iter().collect();
        let key = cache_key(&self.options);

        let mut seen = AHashSet::new();
        let mut resolved: AHashMap<&str, MatchResult> = AHashMap::new();
        let mut pending = Vec::new();
        for raw in inputs.iter().copied() {
            if !seen.insert(raw) {
                continue;
            }
            match self.cache.get(&key, raw) {
                Some(hit) => {
                    resolved.insert(raw, hit);
                }
                None => pending.push(raw),
            }
        }

        debug!(
            total = inputs.len(),
            distinct = seen.len(),
            pending = pending.len(),
            "resolving batch"
        );

        for (raw, result) in self.run_pending(&pending) {
            self.cache.insert(&key, raw, result.clone());
            resolved.insert(raw, result);
        }

        inputs
            .iter()
            .map(|raw| {
                resolved
                    .get(raw)
                    .cloned()
                    .unwrap_or_else(|| MatchResult::none(*raw))
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_pending<'i>(&self, pending: &[&'i str]) -> Vec<(&'i str, MatchResult)> {
        pending
            .par_iter()
            .map(|raw| (*raw, self.cascade(raw, &self.options)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_pending<'i>(&self, pending: &[&'i str]) -> Vec<(&'i str, MatchResult)> {
        pending
            .iter()
            .map(|raw| (*raw, self.cascade(raw, &self.options)))
            .collect()
    }

    fn guess_validated(&self, raw: &str, options: &MatchOptions) -> MatchResult {
        let key = cache_key(options);
        if let Some(hit) = self.cache.get(&key, raw) {
            trace!(input = raw, "cache hit");
            return hit;
        }

        let result = self.cascade(raw, options);
        self.cache.insert(&key, raw, result.clone());
        result
    }

    /// Normalize, then exact over all candidates, then fuzzy over all
    fn cascade(&self, raw: &str, options: &MatchOptions) -> MatchResult {
        let candidates = Normalizer::new(&self.store, options).candidates(raw);
        if candidates.is_empty() {
            debug!(input = raw, "no candidates");
            return MatchResult::none(raw);
        }

        let ctx = ResolveContext::new(&self.store, options);

        let exact = ExactResolver::new(&ctx);
        let mut found = first_match(&candidates, "exact", |key| exact.resolve(key));

        if found.is_none() && options.check_fuzzy {
            let fuzzy = FuzzyResolver::new(&ctx, self.similarity.as_ref())
                .with_parallel_threshold(self.parallel_threshold);
            found = first_match(&candidates, "fuzzy", |key| fuzzy.resolve(key));
        }

        let result = match found {
            Some(stage) => MatchResult::matched(raw, stage),
            None => MatchResult::none(raw),
        };
        debug!(
            input = raw,
            how = %result.matched_how,
            value = ?result.matched_value,
            score = ?result.score,
            "resolved"
        );
        result
    }
}

fn first_match<F>(candidates: &[Candidate], strategy: &'static str, resolve: F) -> Option<StageMatch>
where
    F: Fn(&str) -> Option<StageMatch>,
{
    candidates.iter().find_map(|candidate| {
        let found = resolve(candidate.key.as_str());
        trace!(
            candidate = %candidate.key,
            recoded = candidate.recoded,
            strategy,
            hit = found.is_some(),
            "attempt"
        );
        found
    })
}

fn shape(result: MatchResult, return_how: bool) -> Resolution {
    if return_how {
        Resolution::Full(result)
    } else {
        Resolution::Name(result.matched_value)
    }
}

/// Options with `return_how` cleared, borrowing when already clear
fn cache_key(options: &MatchOptions) -> Cow<'_, MatchOptions> {
    if options.return_how {
        Cow::Owned(options.effective())
    } else {
        Cow::Borrowed(options)
    }
}

/// Builder for [`Guesser`]
pub struct GuesserBuilder {
    store: Arc<ReferenceStore>,
    options: MatchOptions,
    similarity: Box<dyn Similarity>,
    parallel_threshold: usize,
}

impl GuesserBuilder {
    pub fn new(store: Arc<ReferenceStore>) -> Self {
        Self {
            store,
            options: MatchOptions::default(),
            similarity: Box::new(TokenSortRatio),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Merge aliases over the recode map of the current options
    pub fn recodes<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.options = self.options.with_recodes(entries);
        self
    }

    pub fn similarity(mut self, similarity: impl Similarity + 'static) -> Self {
        self.similarity = Box::new(similarity);
        self
    }

    /// Vocabulary size from which fuzzy scans go parallel
    pub fn parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn build(self) -> Result<Guesser> {
        self.options.validate()?;
        Ok(Guesser {
            store: self.store,
            options: self.options,
            similarity: self.similarity,
            cache: ResultCache::new(),
            parallel_threshold: self.parallel_threshold,
        })
    }
}
