//! Successor selection for dissolved municipalities
//!
//! A former name maps to a present-day municipality only when one successor
//! clearly dominates: either it is the sole successor, or it received at
//! least `threshold_ratio` percent of the population. A successor that was
//! itself dissolved later is followed through the same rule.

use tracing::trace;

use super::ResolveContext;
use crate::normalize::fold;
use crate::reference::{FormerMunicipality, Successor};

/// Longest succession chain followed
const MAX_CHAIN: usize = 8;

/// Slack for fractions like 0.8 that are not exact in binary
const RATIO_EPSILON: f64 = 1e-9;

/// Whether a former municipality passes the caller's date filter
pub(crate) fn is_eligible(former: &FormerMunicipality, ctx: &ResolveContext<'_>) -> bool {
    ctx.options.date.map_or(true, |since| former.dissolved_on >= since)
}

/// Resolve a group of former municipalities sharing a name.
///
/// Entries that are too fragmented abstain; if the remaining ones disagree
/// the group is ambiguous.
pub(crate) fn resolve_group<'s>(
    formers: impl IntoIterator<Item = &'s FormerMunicipality>,
    ctx: &ResolveContext<'_>,
) -> Option<String> {
    resolve_group_at(formers, ctx, 0)
}

fn resolve_group_at<'s>(
    formers: impl IntoIterator<Item = &'s FormerMunicipality>,
    ctx: &ResolveContext<'_>,
    depth: usize,
) -> Option<String> {
    let mut resolved: Option<String> = None;
    for former in formers {
        let Some(name) = resolve_former(former, ctx, depth) else {
            continue;
        };
        if resolved.is_none() {
            resolved = Some(name);
            continue;
        }
        if resolved.as_deref() != Some(name.as_str()) {
            trace!(former = %former.former_name, other = %name, "former name ambiguous");
            return None;
        }
    }
    resolved
}

/// Resolve one former municipality to an active municipality
fn resolve_former(former: &FormerMunicipality, ctx: &ResolveContext<'_>, depth: usize) -> Option<String> {
    if depth >= MAX_CHAIN {
        return None;
    }

    let successor = dominant_successor(&former.successors, ctx.options.ratio_fraction())?;
    let key = fold(&successor.municipality);

    if let Some(active) = ctx.store.municipality(&key) {
        if !ctx.in_province(&active.name) {
            return None;
        }
        return Some(active.name.clone());
    }

    // Successor dissolved later on; follow it
    resolve_group_at(ctx.store.former_by_name(&key), ctx, depth + 1)
}

/// The successor that inherits the former name, if any
pub fn dominant_successor(successors: &[Successor], min_fraction: f64) -> Option<&Successor> {
    if let [only] = successors {
        return Some(only);
    }

    let mut best: Option<&Successor> = None;
    let mut tied = false;
    for s in successors {
        if s.population_fraction + RATIO_EPSILON < min_fraction {
            continue;
        }
        match best {
            Some(b) if s.population_fraction > b.population_fraction => {
                best = Some(s);
                tied = false;
            }
            Some(b) if s.population_fraction == b.population_fraction => tied = true,
            Some(_) => {}
            None => best = Some(s),
        }
    }

    if tied {
        None
    } else {
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn successors(list: &[(&str, f64)]) -> Vec<Successor> {
        list.iter().map(|(m, f)| Successor::new(*m, *f)).collect()
    }

    #[test]
    fn test_single_successor_always_wins() {
        let s = successors(&[("Amsterdam", 1.0)]);
        assert_eq!(dominant_successor(&s, 1.0).unwrap().municipality, "Amsterdam");

        // Even with a fraction below the threshold
        let s = successors(&[("Amsterdam", 0.4)]);
        assert!(dominant_successor(&s, 0.8).is_some());
    }

    #[test]
    fn test_ratio_threshold() {
        let s = successors(&[("A", 0.85), ("B", 0.15)]);
        assert_eq!(dominant_successor(&s, 0.80).unwrap().municipality, "A");
        assert!(dominant_successor(&s, 0.90).is_none());
    }

    #[test]
    fn test_ratio_boundary_inclusive() {
        let s = successors(&[("A", 0.8), ("B", 0.2)]);
        assert_eq!(dominant_successor(&s, 0.8).unwrap().municipality, "A");
    }

    #[test]
    fn test_low_threshold_tie_is_ambiguous() {
        let s = successors(&[("A", 0.5), ("B", 0.5)]);
        assert!(dominant_successor(&s, 0.3).is_none());
    }

    #[test]
    fn test_low_threshold_picks_largest() {
        let s = successors(&[("A", 0.3), ("B", 0.45), ("C", 0.25)]);
        assert_eq!(dominant_successor(&s, 0.0).unwrap().municipality, "B");
    }

    #[test]
    fn test_empty_successors() {
        assert!(dominant_successor(&[], 0.5).is_none());
    }
}
