//! The BFS (Pike-style) NFA simulator for the regular subset (§4.6).
//!
//! `run` makes one continuous forward pass over the remaining input rather
//! than being called once per start offset: at every position it injects a
//! fresh thread at `nfa.start` alongside whatever threads are already in
//! flight, the way the teacher's `vm.rs::run` adds a thread "simulating a
//! preceding `.*?`" at each step instead of restarting its simulation from
//! scratch. Trying every possible start this way costs one scan, not one
//! scan per start — a pattern like `a*c` against a long run of `a`s would
//! otherwise restart the whole simulation at every offset and cost O(n^2)
//! instead of O(n).
//!
//! Threads are evaluated in priority order — the earliest-injected
//! (leftmost) thread first — and a `seen` set per position drops any
//! thread that reaches a state an earlier, higher-priority thread already
//! claimed. Multi-character transitions stay "in flight" in a queue keyed
//! by arrival position, same as before.

use std::collections::{HashMap, HashSet};

use crate::nfa::{eval, EvalContext, Nfa, Outcome, StateId};
use crate::options::Options;

use super::{apply_capture, empty_groups, empty_starts, Groups, RawMatch, StartContext};

struct Thread {
    state: StateId,
    origin: usize,
    starts: Vec<Option<usize>>,
    groups: Groups,
}

pub fn run(ctx: &StartContext<'_>) -> Option<RawMatch> {
    let nfa = ctx.nfa;
    let len = ctx.chars.len();
    // An anchored, non-multiline pattern can only ever match at its one
    // fixed origin, so there's nothing to gain from injecting a thread at
    // every later position too — mirrors the teacher's `prefix_anchor`.
    let prefix_anchor = nfa.is_from_start_of_string && !ctx.options.contains(Options::MULTILINE);

    let mut pending: HashMap<usize, Vec<Thread>> = HashMap::new();
    let mut potential: Option<RawMatch> = None;
    let mut pos = ctx.start_index;

    loop {
        let arriving = pending.remove(&pos).unwrap_or_default();
        let inject = potential.is_none() && (arriving.is_empty() || !prefix_anchor);

        let mut seen: HashSet<StateId> = HashSet::new();
        let mut deposits: HashMap<usize, Vec<Thread>> = HashMap::new();

        for thread in arriving {
            add_thread(
                ctx,
                nfa,
                pos,
                thread.state,
                thread.origin,
                thread.starts,
                thread.groups,
                &mut seen,
                &mut potential,
                &mut deposits,
            );
        }
        if inject {
            add_thread(
                ctx,
                nfa,
                pos,
                nfa.start,
                pos,
                empty_starts(nfa),
                empty_groups(nfa),
                &mut seen,
                &mut potential,
                &mut deposits,
            );
        }
        for (arrival, threads) in deposits {
            pending.entry(arrival).or_default().extend(threads);
        }

        if pos >= len {
            break;
        }
        if potential.is_some() && pending.is_empty() {
            break;
        }
        pos += 1;
    }

    potential
}

/// Recursively follows `state`'s epsilon-closure, depth-first in transition
/// order, so that higher-priority (more greedy) alternatives are always
/// visited before lower-priority ones — the same priority the backtracking
/// matcher gets from transition order, here encoded by visiting order
/// instead of by recursion depth.
#[allow(clippy::too_many_arguments)]
fn add_thread(
    ctx: &StartContext<'_>,
    nfa: &Nfa,
    pos: usize,
    state: StateId,
    origin: usize,
    starts: Vec<Option<usize>>,
    groups: Groups,
    seen: &mut HashSet<StateId>,
    potential: &mut Option<RawMatch>,
    deposits: &mut HashMap<usize, Vec<Thread>>,
) {
    if !seen.insert(state) {
        return;
    }
    let (starts, groups) = apply_capture(nfa, state, pos, starts, groups);
    if nfa.is_accepting(state) {
        update_potential(potential, origin, pos, &groups);
        return;
    }
    let eval_ctx = EvalContext {
        chars: ctx.chars,
        pos,
        search_origin: ctx.search_origin,
        previous_match_end: ctx.previous_match_end,
        groups: &groups,
        options: ctx.options,
    };
    for t in &nfa.state(state).transitions {
        match eval(&t.condition, &eval_ctx) {
            Outcome::Epsilon => add_thread(
                ctx,
                nfa,
                pos,
                t.end_state,
                origin,
                starts.clone(),
                groups.clone(),
                seen,
                potential,
                deposits,
            ),
            Outcome::Accepted(k) => {
                deposits.entry(pos + k).or_default().push(Thread {
                    state: t.end_state,
                    origin,
                    starts: starts.clone(),
                    groups: groups.clone(),
                });
            }
            Outcome::Rejected => {}
        }
    }
}

/// Leftmost wins outright, regardless of length; among threads sharing a
/// start, the one reaching the accepting state later (greedier) wins.
fn update_potential(potential: &mut Option<RawMatch>, origin: usize, pos: usize, groups: &Groups) {
    let better = match potential {
        None => true,
        Some(m) if origin < m.start => true,
        Some(m) if origin == m.start && pos > m.end => true,
        _ => false,
    };
    if better {
        *potential = Some(RawMatch {
            start: origin,
            end: pos,
            groups: groups.clone(),
        });
    }
}
