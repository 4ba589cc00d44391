//! Lowers an (optimized) AST into an NFA (§4.4).
//!
//! Each AST node compiles to a `Frag` — a fragment with its own `start`/
//! `end` state, unlike textbook Thompson construction where every fragment
//! shares one implicit "current end". Combinators (concat, alternate,
//! quantify) wire fragments together by pushing epsilon transitions between
//! their start/end states; states are referred to purely by index, so
//! there's nothing for the borrow checker to fight over when quantifier
//! loops make the graph cyclic (see `DESIGN.md`).

use std::collections::{HashSet, VecDeque};

use crate::ast::{Ast, GroupItem, Quantifier};
use crate::charclass::CharSet;
use crate::error::Error;
use crate::nfa::{CaptureGroupRecord, Condition, Nfa, State, StateId, Transition};

#[derive(Debug, Clone, Copy)]
struct Frag {
    start: StateId,
    end: StateId,
}

struct Compiler {
    states: Vec<State>,
    captures: Vec<CaptureGroupRecord>,
    has_lazy: bool,
    has_backreference: bool,
}

pub fn compile(
    pattern: &str,
    ast: &Ast,
    num_groups: u32,
    is_from_start_of_string: bool,
) -> Result<Nfa, Error> {
    let mut compiler = Compiler {
        states: Vec::new(),
        captures: Vec::new(),
        has_lazy: false,
        has_backreference: false,
    };
    let frag = compiler.compile(ast);

    let Compiler {
        mut states,
        captures,
        has_lazy,
        has_backreference,
    } = compiler;

    let spliced = peephole(&mut states, &captures);
    log::trace!("peephole pass spliced {} epsilon transitions", spliced);

    let (states, remap) = bfs_reindex(states, frag.start);
    let start = remap[frag.start];
    let captures: Vec<CaptureGroupRecord> = captures
        .into_iter()
        .map(|c| CaptureGroupRecord {
            group_index: c.group_index,
            start_state: remap[c.start_state],
            end_state: remap[c.end_state],
        })
        .collect();

    validate_backreferences(pattern, ast, &captures)?;

    let is_regular = !has_lazy && !has_backreference;
    log::debug!(
        "compiled '{}' to {} states, {} capture groups, is_regular={}",
        pattern,
        states.len(),
        num_groups,
        is_regular
    );

    Ok(Nfa {
        states,
        start,
        captures,
        num_groups,
        is_regular,
        is_from_start_of_string,
    })
}

impl Compiler {
    fn new_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn add_transition(&mut self, from: StateId, to: StateId, condition: Condition) {
        self.states[from].transitions.push(Transition {
            end_state: to,
            condition,
        });
    }

    fn compile(&mut self, ast: &Ast) -> Frag {
        match ast {
            Ast::Character(c) => self.compile_single(Condition::Char(*c)),
            Ast::String(s) => self.compile_single(Condition::Literal(s.clone())),
            Ast::AnyCharacter => self.compile_single(Condition::AnyChar),
            Ast::CharacterSet(set) => self.compile_single(Condition::Set(set.clone())),
            Ast::CharacterGroup { inverted, items } => {
                let set = build_group_set(items);
                let condition = if *inverted {
                    Condition::NegatedSet(set)
                } else {
                    Condition::Set(set)
                };
                self.compile_single(condition)
            }
            Ast::ImplicitGroup(children) => self.compile_concat(children),
            Ast::Alternation(children) => self.compile_alternation(children),
            Ast::Group { index, child, .. } => self.compile_group(*index, child),
            Ast::Quantified {
                child,
                quantifier,
                lazy,
            } => {
                if *lazy {
                    self.has_lazy = true;
                }
                self.compile_quantified(child, *quantifier, *lazy)
            }
            Ast::Anchor(anchor) => self.compile_single(Condition::Anchor(*anchor)),
            Ast::Backreference(n) => {
                self.has_backreference = true;
                self.compile_single(Condition::Backreference(*n))
            }
        }
    }

    fn compile_single(&mut self, condition: Condition) -> Frag {
        let start = self.new_state();
        let end = self.new_state();
        self.add_transition(start, end, condition);
        Frag { start, end }
    }

    fn empty_frag(&mut self) -> Frag {
        let start = self.new_state();
        let end = self.new_state();
        self.add_transition(start, end, Condition::Epsilon);
        Frag { start, end }
    }

    fn compile_concat(&mut self, children: &[Ast]) -> Frag {
        if children.is_empty() {
            return self.empty_frag();
        }
        let frags: Vec<Frag> = children.iter().map(|c| self.compile(c)).collect();
        self.chain_frags(frags)
    }

    fn chain_frags(&mut self, frags: Vec<Frag>) -> Frag {
        let mut iter = frags.into_iter();
        let first = iter.next().expect("chain_frags called with no fragments");
        let start = first.start;
        let mut prev_end = first.end;
        for frag in iter {
            self.add_transition(prev_end, frag.start, Condition::Epsilon);
            prev_end = frag.end;
        }
        Frag {
            start,
            end: prev_end,
        }
    }

    fn compile_alternation(&mut self, children: &[Ast]) -> Frag {
        let start = self.new_state();
        let end = self.new_state();
        for child in children {
            let frag = self.compile(child);
            self.add_transition(start, frag.start, Condition::Epsilon);
            self.add_transition(frag.end, end, Condition::Epsilon);
        }
        Frag { start, end }
    }

    fn compile_group(&mut self, index: Option<u32>, child: &Ast) -> Frag {
        let start = self.new_state();
        let end = self.new_state();
        let child_frag = self.compile(child);
        self.add_transition(start, child_frag.start, Condition::Epsilon);
        self.add_transition(child_frag.end, end, Condition::Epsilon);
        if let Some(group_index) = index {
            self.captures.push(CaptureGroupRecord {
                group_index,
                start_state: child_frag.start,
                end_state: child_frag.end,
            });
        }
        Frag { start, end }
    }

    fn compile_quantified(&mut self, child: &Ast, quantifier: Quantifier, lazy: bool) -> Frag {
        match quantifier {
            Quantifier::ZeroOrOne => self.compile_zero_or_one(child, lazy),
            Quantifier::ZeroOrMore => self.compile_zero_or_more(child, lazy),
            Quantifier::OneOrMore => self.compile_one_or_more(child, lazy),
            Quantifier::Range { lower, upper } => self.compile_range(child, lower, upper, lazy),
        }
    }

    /// `?`: `start -eps-> child.start`, `start -eps-> end`; `child.end -eps-> end`.
    /// Lazy reverses `start`'s transition order so the skip path is tried first.
    fn compile_zero_or_one(&mut self, child: &Ast, lazy: bool) -> Frag {
        let start = self.new_state();
        let end = self.new_state();
        let frag = self.compile(child);
        self.add_transition(frag.end, end, Condition::Epsilon);
        self.wire_branch(start, frag.start, end, lazy);
        Frag { start, end }
    }

    /// `*`: `start -eps-> child.start`, `start -eps-> end`; `child.end -eps-> child.start`.
    fn compile_zero_or_more(&mut self, child: &Ast, lazy: bool) -> Frag {
        let start = self.new_state();
        let end = self.new_state();
        let frag = self.compile(child);
        self.add_transition(frag.end, frag.start, Condition::Epsilon);
        self.wire_branch(start, frag.start, end, lazy);
        Frag { start, end }
    }

    /// `+`: `start -eps-> child.start`; `child.end -eps-> child.start`,
    /// `child.end -eps-> end`. Lazy reverses `child.end`'s transition order.
    fn compile_one_or_more(&mut self, child: &Ast, lazy: bool) -> Frag {
        let start = self.new_state();
        let frag = self.compile(child);
        self.add_transition(start, frag.start, Condition::Epsilon);
        let end = self.new_state();
        self.wire_branch(frag.end, frag.start, end, lazy);
        Frag { start, end }
    }

    /// Pushes the two branch transitions of a quantifier's split point in
    /// greedy (repeat-first) or lazy (skip-first) order.
    fn wire_branch(&mut self, from: StateId, repeat: StateId, skip: StateId, lazy: bool) {
        if lazy {
            self.add_transition(from, skip, Condition::Epsilon);
            self.add_transition(from, repeat, Condition::Epsilon);
        } else {
            self.add_transition(from, repeat, Condition::Epsilon);
            self.add_transition(from, skip, Condition::Epsilon);
        }
    }

    /// `{n,m}`: `n` mandatory copies followed by a suffix — a `*` over a
    /// fresh copy when `m` is unbounded, or `m-n` right-folded nested
    /// optionals `(x(x(x)?)?)?` otherwise (nesting, rather than `m-n`
    /// independent `x?`s, keeps a cache key of `(state, cursor)` sound for
    /// the backtracking matcher — see §4.4).
    fn compile_range(&mut self, child: &Ast, lower: u32, upper: Option<u32>, lazy: bool) -> Frag {
        let mut prefix: Vec<Frag> = (0..lower).map(|_| self.compile(child)).collect();
        let suffix = match upper {
            None => Some(self.compile_zero_or_more(child, lazy)),
            Some(upper) => {
                let optional_count = upper - lower;
                if optional_count == 0 {
                    None
                } else {
                    Some(self.compile_nested_optionals(child, optional_count, lazy))
                }
            }
        };
        if let Some(suffix) = suffix {
            prefix.push(suffix);
        }
        if prefix.is_empty() {
            self.empty_frag()
        } else {
            self.chain_frags(prefix)
        }
    }

    fn compile_nested_optionals(&mut self, child: &Ast, remaining: u32, lazy: bool) -> Frag {
        if remaining == 0 {
            return self.empty_frag();
        }
        let start = self.new_state();
        let end = self.new_state();
        let x_frag = self.compile(child);
        let inner = self.compile_nested_optionals(child, remaining - 1, lazy);
        self.add_transition(x_frag.end, inner.start, Condition::Epsilon);
        self.add_transition(inner.end, end, Condition::Epsilon);
        self.wire_branch(start, x_frag.start, end, lazy);
        Frag { start, end }
    }
}

fn build_group_set(items: &[GroupItem]) -> CharSet {
    let mut set = CharSet::empty();
    for item in items {
        let piece = match item {
            GroupItem::Character(c) => CharSet::from_char(*c),
            GroupItem::Range(lo, hi) => CharSet::from_range(*lo, *hi),
            GroupItem::Set(s) => s.clone(),
        };
        set = set.union(piece);
    }
    set
}

/// For every transition ending in a state with a single, unconditional
/// epsilon outgoing transition — and not referenced by a capture-group
/// record — splices the transition to skip straight to that epsilon's
/// target. Repeats to a fixed point. Returns the number of transitions
/// rewritten, purely for logging.
fn peephole(states: &mut [State], captures: &[CaptureGroupRecord]) -> usize {
    let referenced: HashSet<StateId> = captures
        .iter()
        .flat_map(|c| [c.start_state, c.end_state])
        .collect();
    let mut total_spliced = 0;
    for _ in 0..states.len().saturating_add(4) {
        let spliceable: Vec<Option<StateId>> = (0..states.len())
            .map(|s| {
                if referenced.contains(&s) || states[s].transitions.len() != 1 {
                    return None;
                }
                match states[s].transitions[0].condition {
                    Condition::Epsilon => Some(states[s].transitions[0].end_state),
                    _ => None,
                }
            })
            .collect();
        let mut changed = false;
        for state in states.iter_mut() {
            for t in state.transitions.iter_mut() {
                if let Some(target) = spliceable[t.end_state] {
                    if target != t.end_state {
                        t.end_state = target;
                        changed = true;
                        total_spliced += 1;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    total_spliced
}

/// Assigns contiguous indices `0..N` by BFS from `start`, dropping any
/// state the peephole pass orphaned. Returns the reindexed states and the
/// old-id -> new-id map (`usize::MAX` for unreachable states).
fn bfs_reindex(states: Vec<State>, start: StateId) -> (Vec<State>, Vec<StateId>) {
    let mut remap = vec![usize::MAX; states.len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::new();
    remap[start] = 0;
    order.push(start);
    queue.push_back(start);
    while let Some(s) = queue.pop_front() {
        for t in &states[s].transitions {
            if remap[t.end_state] == usize::MAX {
                remap[t.end_state] = order.len();
                order.push(t.end_state);
                queue.push_back(t.end_state);
            }
        }
    }
    let mut new_states = Vec::with_capacity(order.len());
    for &old_id in &order {
        let mut transitions = states[old_id].transitions.clone();
        for t in &mut transitions {
            t.end_state = remap[t.end_state];
        }
        new_states.push(State { transitions });
    }
    (new_states, remap)
}

fn validate_backreferences(
    pattern: &str,
    ast: &Ast,
    captures: &[CaptureGroupRecord],
) -> Result<(), Error> {
    let valid: HashSet<u32> = captures.iter().map(|c| c.group_index).collect();
    let mut invalid = None;
    walk_backreferences(ast, &mut |n| {
        if invalid.is_none() && !valid.contains(&n) {
            invalid = Some(n);
        }
    });
    match invalid {
        Some(n) => Err(Error::semantic(
            pattern,
            0,
            format!(
                "The token '\\{}' references a non-existent or invalid subpattern",
                n
            ),
        )),
        None => Ok(()),
    }
}

fn walk_backreferences(ast: &Ast, f: &mut impl FnMut(u32)) {
    match ast {
        Ast::Backreference(n) => f(*n),
        Ast::Group { child, .. } => walk_backreferences(child, f),
        Ast::Quantified { child, .. } => walk_backreferences(child, f),
        Ast::ImplicitGroup(children) | Ast::Alternation(children) => {
            for c in children {
                walk_backreferences(c, f);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::optimize;
    use crate::parser::parse;

    fn compile_pattern(pattern: &str) -> Nfa {
        let (ast, anchored) = parse(pattern).unwrap();
        let (ast, num_groups) = optimize(ast);
        compile(pattern, &ast, num_groups, anchored).unwrap()
    }

    #[test]
    fn literal_compiles_to_single_transition_chain() {
        let nfa = compile_pattern("abc");
        // "abc" collapses to one String("abc") node, so after BFS reindex
        // and peephole splicing, start should have exactly one transition.
        assert_eq!(nfa.states[nfa.start].transitions.len(), 1);
    }

    #[test]
    fn regular_pattern_flagged_is_regular() {
        let nfa = compile_pattern("a+b*c?");
        assert!(nfa.is_regular);
    }

    #[test]
    fn lazy_quantifier_marks_not_regular() {
        let nfa = compile_pattern("a*?");
        assert!(!nfa.is_regular);
    }

    #[test]
    fn backreference_marks_not_regular() {
        let nfa = compile_pattern("(a)\\1");
        assert!(!nfa.is_regular);
    }

    #[test]
    fn invalid_backreference_is_rejected() {
        let err = compile_pattern_err("\\1");
        assert_eq!(
            err.message,
            "The token '\\1' references a non-existent or invalid subpattern"
        );
    }

    fn compile_pattern_err(pattern: &str) -> Error {
        let (ast, anchored) = parse(pattern).unwrap();
        let (ast, num_groups) = optimize(ast);
        compile(pattern, &ast, num_groups, anchored).unwrap_err()
    }

    #[test]
    fn capture_group_records_child_boundaries() {
        let nfa = compile_pattern("(a)");
        assert_eq!(nfa.captures.len(), 1);
        assert_eq!(nfa.captures[0].group_index, 1);
    }
}
