//! Backtracking matcher for sibling lists.
//!
//! Concrete pattern elements consume exactly one candidate each, in order.
//! Array placeholders consume a contiguous run, shortest first; rest
//! placeholders try the longest run first. `$Maybe(..)` elements consume one
//! candidate if they can and none otherwise. The first assignment that lets
//! the rest of the list match wins.
//!
//! Lists whose members are unordered (object members, JSX attributes, ...)
//! and whose pattern holds exactly one array placeholder fall back to a
//! looser search: the concrete elements must still match candidates in
//! pattern order, but need not be adjacent. The placeholder absorbs every
//! candidate left between, before or after them.

use graft_syntax::NodeId;

use crate::bindings::Bindings;
use crate::error::GraftError;
use crate::placeholder::{Placeholder, PlaceholderKind};

use super::{FieldRule, MatchEnv, Rule, bind_splice};

type Candidate = (Option<&'static str>, NodeId);

/// Matches a pattern list against a candidate list.
pub(crate) fn match_list(
    env: &MatchEnv<'_>,
    patterns: &[FieldRule],
    candidates: &[Candidate],
    bindings: Bindings,
    unordered: bool,
) -> Result<Option<Bindings>, GraftError> {
    if let Some(bound) = match_ordered(env, patterns, candidates, bindings.clone())? {
        return Ok(Some(bound));
    }
    let splices = patterns
        .iter()
        .filter(|pattern| pattern.rule.as_splice().is_some())
        .count();
    if unordered && splices == 1 {
        return match_unordered(env, patterns, candidates, bindings);
    }
    Ok(None)
}

fn match_ordered(
    env: &MatchEnv<'_>,
    patterns: &[FieldRule],
    candidates: &[Candidate],
    bindings: Bindings,
) -> Result<Option<Bindings>, GraftError> {
    let Some((first, rest)) = patterns.split_first() else {
        return Ok(candidates.is_empty().then_some(bindings));
    };
    match &first.rule {
        Rule::Splice(placeholder) => {
            let available = candidates.len().saturating_sub(required(rest));
            for length in run_lengths(placeholder.kind(), available) {
                let Some((taken, remaining)) = candidates.split_at_checked(length) else {
                    continue;
                };
                let nodes = taken.iter().map(|(_, node)| *node).collect();
                let Some(bound) = bind_splice(env, placeholder, nodes, bindings.clone()) else {
                    continue;
                };
                if let Some(done) = match_ordered(env, rest, remaining, bound)? {
                    return Ok(Some(done));
                }
            }
            Ok(None)
        }
        Rule::Maybe(inner) => {
            if let Some(((field, node), remaining)) = candidates.split_first()
                && *field == first.field
                && let Some(bound) = inner.matches(env, *node, bindings.clone())?
                && let Some(done) = match_ordered(env, rest, remaining, bound)?
            {
                return Ok(Some(done));
            }
            match_ordered(env, rest, candidates, bindings)
        }
        rule => {
            let Some(((field, node), remaining)) = candidates.split_first() else {
                return Ok(None);
            };
            if *field != first.field {
                return Ok(None);
            }
            let Some(bound) = rule.matches(env, *node, bindings)? else {
                return Ok(None);
            };
            match_ordered(env, rest, remaining, bound)
        }
    }
}

/// Number of candidates the remaining patterns need at minimum.
fn required(patterns: &[FieldRule]) -> usize {
    patterns
        .iter()
        .filter(|pattern| !matches!(pattern.rule, Rule::Splice(_) | Rule::Maybe(_)))
        .count()
}

fn run_lengths(kind: PlaceholderKind, available: usize) -> Vec<usize> {
    match kind {
        PlaceholderKind::Rest => (0..=available).rev().collect(),
        PlaceholderKind::Node | PlaceholderKind::Array => (0..=available).collect(),
    }
}

fn match_unordered(
    env: &MatchEnv<'_>,
    patterns: &[FieldRule],
    candidates: &[Candidate],
    bindings: Bindings,
) -> Result<Option<Bindings>, GraftError> {
    let Some(splice) = patterns.iter().find_map(|pattern| pattern.rule.as_splice()) else {
        return Ok(None);
    };
    let concrete: Vec<&FieldRule> = patterns
        .iter()
        .filter(|pattern| pattern.rule.as_splice().is_none())
        .collect();
    if concrete.len() > candidates.len()
        || concrete
            .iter()
            .any(|pattern| matches!(pattern.rule, Rule::Maybe(_)))
    {
        return Ok(None);
    }
    let mut used = vec![false; candidates.len()];
    assign(env, &concrete, candidates, 0, &mut used, splice, bindings)
}

/// Assigns each concrete pattern to a distinct candidate at or after
/// `start`, keeping pattern order, then hands the unassigned candidates, in
/// source order, to the array placeholder.
fn assign(
    env: &MatchEnv<'_>,
    concrete: &[&FieldRule],
    candidates: &[Candidate],
    start: usize,
    used: &mut [bool],
    splice: &Placeholder,
    bindings: Bindings,
) -> Result<Option<Bindings>, GraftError> {
    let Some((first, rest)) = concrete.split_first() else {
        let leftovers = candidates
            .iter()
            .zip(used.iter())
            .filter(|(_, taken)| !**taken)
            .map(|((_, node), _)| *node)
            .collect();
        return Ok(bind_splice(env, splice, leftovers, bindings));
    };
    for (index, (field, node)) in candidates.iter().enumerate().skip(start) {
        if *field != first.field {
            continue;
        }
        let Some(bound) = first.rule.matches(env, *node, bindings.clone())? else {
            continue;
        };
        set(used, index, true);
        let result = assign(env, rest, candidates, index + 1, used, splice, bound)?;
        set(used, index, false);
        if result.is_some() {
            return Ok(result);
        }
    }
    Ok(None)
}

fn set(used: &mut [bool], index: usize, value: bool) {
    if let Some(slot) = used.get_mut(index) {
        *slot = value;
    }
}
