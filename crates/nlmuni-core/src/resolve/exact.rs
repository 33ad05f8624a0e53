//! Exact lookups against the folded reference keys

use tracing::trace;

use super::succession::{is_eligible, resolve_group};
use super::ResolveContext;
use crate::normalize::statistical_code;
use crate::reference::LocalityIndex;
use crate::result::{MatchedHow, StageMatch};

/// Score reported for exact matches
pub const EXACT_SCORE: u8 = 100;

/// Exact resolver over the four reference stages
pub struct ExactResolver<'c> {
    ctx: &'c ResolveContext<'c>,
}

impl<'c> ExactResolver<'c> {
    pub fn new(ctx: &'c ResolveContext<'c>) -> Self {
        Self { ctx }
    }

    /// Resolve one folded candidate, first stage wins
    pub fn resolve(&self, candidate: &str) -> Option<StageMatch> {
        let options = self.ctx.options;

        self.municipality(candidate)
            .or_else(|| options.check_history.then(|| self.history(candidate)).flatten())
            .or_else(|| {
                options
                    .check_places
                    .then(|| self.locality(candidate, self.ctx.store.places(), MatchedHow::ExactPlace))
                    .flatten()
            })
            .or_else(|| {
                options
                    .check_neighbourhoods
                    .then(|| {
                        self.locality(
                            candidate,
                            self.ctx.store.neighbourhoods(),
                            MatchedHow::ExactNeighbourhood,
                        )
                    })
                    .flatten()
            })
    }

    fn municipality(&self, candidate: &str) -> Option<StageMatch> {
        let active = self.ctx.store.municipality(candidate)?;
        if !self.ctx.province_matches(active.province.as_deref()) {
            trace!(candidate, "municipality outside province");
            return None;
        }
        Some(StageMatch::new(&active.name, MatchedHow::ExactMunicipality, EXACT_SCORE))
    }

    fn history(&self, candidate: &str) -> Option<StageMatch> {
        let store = self.ctx.store;

        let by_name = store
            .former_by_name(candidate)
            .filter(|f| is_eligible(f, self.ctx));
        if let Some(name) = resolve_group(by_name, self.ctx) {
            return Some(StageMatch::new(name, MatchedHow::ExactHistory, EXACT_SCORE));
        }

        let code = statistical_code(candidate)?;
        let by_code = store
            .former_by_code(&code)
            .filter(|f| is_eligible(f, self.ctx));
        resolve_group(by_code, self.ctx)
            .map(|name| StageMatch::new(name, MatchedHow::ExactHistory, EXACT_SCORE))
    }

    fn locality(&self, candidate: &str, index: &LocalityIndex, how: MatchedHow) -> Option<StageMatch> {
        let locality = index.get(candidate)?;
        match self.ctx.unique_municipality(&locality.municipalities) {
            Some(name) => Some(StageMatch::new(name, how, EXACT_SCORE)),
            None => {
                trace!(candidate, %how, candidates = locality.municipalities.len(), "ambiguous locality");
                None
            }
        }
    }
}
