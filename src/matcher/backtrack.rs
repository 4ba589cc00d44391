//! The DFS backtracking interpreter for non-regular patterns: those with
//! backreferences or lazy quantifiers (§4.7). Walks the NFA depth-first,
//! trying each state's outgoing transitions in order — which is exactly
//! why quantifier greediness/laziness is encoded as transition order at
//! compile time rather than as a separate flag here.
//!
//! Capture state is threaded by value through the recursion, so
//! backtracking out of a failed branch is free: the caller's `starts`/
//! `groups` vectors are simply never updated in the first place. A
//! per-path `(state, pos)` visited set guards against the zero-width
//! cycles a nullable quantified subpattern can otherwise recurse into
//! forever (e.g. a lazy star whose body can match empty).

use std::collections::HashSet;

use crate::nfa::{eval, EvalContext, Outcome, StateId};

use super::{apply_capture, empty_groups, empty_starts, Groups, RawMatch, StartContext};

pub fn run(ctx: &StartContext<'_>) -> Option<RawMatch> {
    let nfa = ctx.nfa;
    let mut visiting = HashSet::new();
    dfs(
        ctx,
        nfa.start,
        ctx.start_index,
        empty_starts(nfa),
        empty_groups(nfa),
        &mut visiting,
    )
    .map(|(end, groups)| RawMatch {
        start: ctx.start_index,
        end,
        groups,
    })
}

fn dfs(
    ctx: &StartContext<'_>,
    state: StateId,
    pos: usize,
    starts: Vec<Option<usize>>,
    groups: Groups,
    visiting: &mut HashSet<(StateId, usize)>,
) -> Option<(usize, Groups)> {
    if !visiting.insert((state, pos)) {
        return None;
    }
    let (starts, groups) = apply_capture(ctx.nfa, state, pos, starts, groups);
    let result = dfs_inner(ctx, state, pos, starts, groups, visiting);
    visiting.remove(&(state, pos));
    result
}

fn dfs_inner(
    ctx: &StartContext<'_>,
    state: StateId,
    pos: usize,
    starts: Vec<Option<usize>>,
    groups: Groups,
    visiting: &mut HashSet<(StateId, usize)>,
) -> Option<(usize, Groups)> {
    if ctx.nfa.is_accepting(state) {
        return Some((pos, groups));
    }
    let eval_ctx = EvalContext {
        chars: ctx.chars,
        pos,
        search_origin: ctx.search_origin,
        previous_match_end: ctx.previous_match_end,
        groups: &groups,
        options: ctx.options,
    };
    for t in &ctx.nfa.state(state).transitions {
        match eval(&t.condition, &eval_ctx) {
            Outcome::Epsilon => {
                if let Some(r) = dfs(ctx, t.end_state, pos, starts.clone(), groups.clone(), visiting) {
                    return Some(r);
                }
            }
            Outcome::Accepted(k) => {
                if let Some(r) = dfs(
                    ctx,
                    t.end_state,
                    pos + k,
                    starts.clone(),
                    groups.clone(),
                    visiting,
                ) {
                    return Some(r);
                }
            }
            Outcome::Rejected => {}
        }
    }
    None
}
