//! Approximate lookups
//!
//! Every stage scores the candidate against every eligible reference key,
//! keeps the best score and accepts it when it reaches `threshold_fuzzy`
//! and the best-scoring keys point at a single municipality.

use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::succession::{is_eligible, resolve_group};
use super::ResolveContext;
use crate::reference::{ActiveMunicipality, FormerEntry, Locality, LocalityIndex};
use crate::result::{MatchedHow, StageMatch};
use crate::similarity::Similarity;

/// Vocabulary size from which scans run on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// Fuzzy resolver over the four reference stages
pub struct FuzzyResolver<'c> {
    ctx: &'c ResolveContext<'c>,
    similarity: &'c dyn Similarity,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel_threshold: usize,
}

impl<'c> FuzzyResolver<'c> {
    pub fn new(ctx: &'c ResolveContext<'c>, similarity: &'c dyn Similarity) -> Self {
        Self {
            ctx,
            similarity,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    /// Resolve one folded candidate, first stage wins
    pub fn resolve(&self, candidate: &str) -> Option<StageMatch> {
        let options = self.ctx.options;

        self.municipality(candidate)
            .or_else(|| options.check_history.then(|| self.history(candidate)).flatten())
            .or_else(|| {
                (options.check_places && options.check_places_fuzzy)
                    .then(|| self.locality(candidate, self.ctx.store.places(), MatchedHow::FuzzyPlace))
                    .flatten()
            })
            .or_else(|| {
                options
                    .check_neighbourhoods
                    .then(|| {
                        self.locality(
                            candidate,
                            self.ctx.store.neighbourhoods(),
                            MatchedHow::FuzzyNeighbourhood,
                        )
                    })
                    .flatten()
            })
    }

    fn municipality(&self, candidate: &str) -> Option<StageMatch> {
        let (score, winners) = self.best(
            candidate,
            self.ctx.store.municipalities(),
            |m: &ActiveMunicipality| m.key.as_str(),
            |m: &ActiveMunicipality| self.ctx.province_matches(m.province.as_deref()),
        )?;

        match winners.as_slice() {
            [only] => Some(StageMatch::new(&only.name, MatchedHow::FuzzyMunicipality, score)),
            _ => {
                trace!(candidate, score, tied = winners.len(), "fuzzy municipality tie");
                None
            }
        }
    }

    fn history(&self, candidate: &str) -> Option<StageMatch> {
        let (score, winners) = self.best(
            candidate,
            self.ctx.store.former_entries(),
            |e: &FormerEntry| e.key.as_str(),
            |e: &FormerEntry| is_eligible(&e.record, self.ctx),
        )?;

        resolve_group(winners.iter().map(|e| &e.record), self.ctx)
            .map(|name| StageMatch::new(name, MatchedHow::FuzzyHistory, score))
    }

    fn locality(&self, candidate: &str, index: &LocalityIndex, how: MatchedHow) -> Option<StageMatch> {
        let (score, winners) = self.best(
            candidate,
            index.entries(),
            |l: &Locality| l.key.as_str(),
            |l: &Locality| l.municipalities.iter().any(|m| self.ctx.in_province(m)),
        )?;

        match self
            .ctx
            .unique_municipality(winners.iter().flat_map(|l| l.municipalities.iter()))
        {
            Some(name) => Some(StageMatch::new(name, how, score)),
            None => {
                trace!(candidate, %how, score, "ambiguous fuzzy locality");
                None
            }
        }
    }

    /// Best score at or above the threshold and every item reaching it
    fn best<'s, T, K, E>(&self, query: &str, items: &'s [T], key: K, eligible: E) -> Option<(u8, Vec<&'s T>)>
    where
        T: Sync,
        K: Fn(&T) -> &str + Sync,
        E: Fn(&T) -> bool + Sync,
    {
        let scored = self.score_items(query, items, &key, &eligible);
        let best = scored.iter().map(|(score, _)| *score).max()?;
        let winners = scored
            .into_iter()
            .filter(|(score, _)| *score == best)
            .map(|(_, item)| item)
            .collect();
        Some((best, winners))
    }

    /// Score items - parallel for large vocabularies
    #[cfg(feature = "parallel")]
    fn score_items<'s, T, K, E>(&self, query: &str, items: &'s [T], key: &K, eligible: &E) -> Vec<(u8, &'s T)>
    where
        T: Sync,
        K: Fn(&T) -> &str + Sync,
        E: Fn(&T) -> bool + Sync,
    {
        if items.len() >= self.parallel_threshold {
            items
                .par_iter()
                .filter_map(|item| self.score_single(query, item, key, eligible))
                .collect()
        } else {
            self.score_sequential(query, items, key, eligible)
        }
    }

    /// Score items sequentially
    #[cfg(not(feature = "parallel"))]
    fn score_items<'s, T, K, E>(&self, query: &str, items: &'s [T], key: &K, eligible: &E) -> Vec<(u8, &'s T)>
    where
        T: Sync,
        K: Fn(&T) -> &str + Sync,
        E: Fn(&T) -> bool + Sync,
    {
        self.score_sequential(query, items, key, eligible)
    }

    fn score_sequential<'s, T, K, E>(&self, query: &str, items: &'s [T], key: &K, eligible: &E) -> Vec<(u8, &'s T)>
    where
        K: Fn(&T) -> &str,
        E: Fn(&T) -> bool,
    {
        items
            .iter()
            .filter_map(|item| self.score_single(query, item, key, eligible))
            .collect()
    }

    #[inline]
    fn score_single<'s, T, K, E>(&self, query: &str, item: &'s T, key: &K, eligible: &E) -> Option<(u8, &'s T)>
    where
        K: Fn(&T) -> &str,
        E: Fn(&T) -> bool,
    {
        if !eligible(item) {
            return None;
        }
        let score = self.similarity.score(query, key(item));
        (score >= self.ctx.options.threshold_fuzzy).then_some((score, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MatchOptions;
    use crate::reference::{FormerMunicipality, Municipality, Neighbourhood, PlaceName, ReferenceStore};
    use crate::similarity::TokenSortRatio;
    use chrono::NaiveDate;

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 1, 1).unwrap()
    }

    fn store() -> ReferenceStore {
        ReferenceStore::builder(2024)
            .municipalities(vec![
                Municipality::new("Amsterdam", date(1812)).province("Noord-Holland"),
                Municipality::new("Leeuwarden", date(1812)).province("Fryslân"),
                Municipality::new("Westerkwartier", date(2019)).province("Groningen"),
                Municipality::new("Het Hogeland", date(2019)).province("Groningen"),
            ])
            .former_municipalities(vec![
                FormerMunicipality::new("Leek", date(2019)).successor("Westerkwartier", 1.0),
                FormerMunicipality::new("Ten Boer", date(2019))
                    .successor("Groningen", 1.0),
            ])
            .place_names(vec![
                PlaceName::new("Uithuizen", "Het Hogeland"),
                PlaceName::new("Zuidhorn", "Westerkwartier"),
            ])
            .neighbourhoods(vec![Neighbourhood::new("Vosseparkwijk", "Leeuwarden")])
            .build()
            .unwrap()
    }

    fn resolve(options: &MatchOptions, candidate: &str) -> Option<StageMatch> {
        let store = store();
        let ctx = ResolveContext::new(&store, options);
        FuzzyResolver::new(&ctx, &TokenSortRatio).resolve(candidate)
    }

    #[test]
    fn test_typo_in_municipality() {
        let m = resolve(&MatchOptions::default(), "amsterdan").unwrap();
        assert_eq!(m.value, "Amsterdam");
        assert_eq!(m.how, MatchedHow::FuzzyMunicipality);
        assert_eq!(m.score, 89);
    }

    #[test]
    fn test_typo_in_place() {
        let m = resolve(&MatchOptions::default(), "uithuisen").unwrap();
        assert_eq!((m.value.as_str(), m.how), ("Het Hogeland", MatchedHow::FuzzyPlace));
    }

    #[test]
    fn test_threshold_boundary() {
        // "amsterdan" scores exactly 89 against "amsterdam"
        let at = MatchOptions::default().with_threshold_fuzzy(89);
        assert!(resolve(&at, "amsterdan").is_some());

        let above = MatchOptions::default().with_threshold_fuzzy(90);
        assert!(resolve(&above, "amsterdan").is_none());
    }

    #[test]
    fn test_successor_outside_snapshot_is_dropped() {
        // Ten Boer went to Groningen, which is not in this snapshot
        let options = MatchOptions::default().with_threshold_fuzzy(80);
        assert!(resolve(&options, "ten boer").is_none());
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let store = store();
        // Every municipality and both places tie at 90
        let options = MatchOptions::default()
            .with_threshold_fuzzy(0)
            .with_history(false)
            .with_neighbourhoods(false);
        let ctx = ResolveContext::new(&store, &options);
        let constant = |_: &str, _: &str| 90u8;
        assert!(FuzzyResolver::new(&ctx, &constant).resolve("anything").is_none());
    }

    #[test]
    fn test_typo_in_former_name() {
        // "leeek" scores 80 against "leek"
        let options = MatchOptions::default().with_threshold_fuzzy(80);
        let m = resolve(&options, "leeek").unwrap();
        assert_eq!((m.value.as_str(), m.how), ("Westerkwartier", MatchedHow::FuzzyHistory));
        assert_eq!(m.score, 80);

        assert!(resolve(&options.with_history(false), "leeek").is_none());
    }

    #[test]
    fn test_typo_in_neighbourhood() {
        let m = resolve(&MatchOptions::default(), "vossenparkwijk").unwrap();
        assert_eq!((m.value.as_str(), m.how), ("Leeuwarden", MatchedHow::FuzzyNeighbourhood));
        assert_eq!(m.score, 93);
    }

    #[test]
    fn test_fuzzy_places_toggle() {
        let options = MatchOptions::default().with_places_fuzzy(false);
        assert!(resolve(&options, "uithuisen").is_none());
        // Other fuzzy stages are unaffected
        assert!(resolve(&options, "amsterdan").is_some());
    }

    #[test]
    fn test_parallel_threshold_does_not_change_results() {
        let store = store();
        let options = MatchOptions::default().with_threshold_fuzzy(80);
        let ctx = ResolveContext::new(&store, &options);
        let sequential = FuzzyResolver::new(&ctx, &TokenSortRatio);
        let eager = FuzzyResolver::new(&ctx, &TokenSortRatio).with_parallel_threshold(0);

        for candidate in ["amsterdan", "uithuisen", "leeek", "vossenparkwijk", "ten boer", "xyz"] {
            assert_eq!(eager.resolve(candidate), sequential.resolve(candidate), "{candidate}");
        }
    }

    #[test]
    fn test_province_narrows_fuzzy_scan() {
        let options = MatchOptions::default().with_province("Fryslân");
        assert!(resolve(&options, "amsterdan").is_none());
        assert!(resolve(&options, "leeuwaarden").is_some());
    }
}
