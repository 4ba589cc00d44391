//! The NFA data model: an indexed state table built by the compiler and
//! frozen once construction finishes. States are referred to by index
//! (`StateId`), never by pointer or reference — see `DESIGN.md` for why
//! this is the right shape for a graph with cycles (quantifier loops).

use crate::ast::Anchor;
use crate::charclass::{self, CharSet};
use crate::options::Options;

pub type StateId = usize;

#[derive(Debug, Clone, Default)]
pub struct State {
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub end_state: StateId,
    pub condition: Condition,
}

/// A capture group's start/end states, as recorded during compilation.
/// `start_state` is the state at the *child*'s start, not the wrapping
/// group fragment's start, so the group's own entry epsilon doesn't count
/// as having "entered" the group for bookkeeping purposes (see §4.4).
#[derive(Debug, Clone, Copy)]
pub struct CaptureGroupRecord {
    pub group_index: u32,
    pub start_state: StateId,
    pub end_state: StateId,
}

#[derive(Debug, Clone)]
pub enum Condition {
    Epsilon,
    Anchor(Anchor),
    Char(char),
    /// A literal multi-character run; consumes `chars().count()`.
    Literal(String),
    Set(CharSet),
    NegatedSet(CharSet),
    Range(char, char),
    AnyChar,
    Backreference(u32),
}

/// The result of evaluating a `Condition` against a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rejected,
    Epsilon,
    Accepted(usize),
}

/// Everything a `Condition` needs to evaluate itself at one cursor
/// position. Borrowed, not owned, since both matchers build one of these
/// per step without extra allocation.
pub struct EvalContext<'a> {
    pub chars: &'a [char],
    pub pos: usize,
    /// Where the *whole search* began, fixed for the lifetime of a cursor —
    /// not the position of the current match attempt, which drifts forward
    /// on every retry. Only `\G` reads this.
    pub search_origin: usize,
    pub previous_match_end: Option<usize>,
    pub groups: &'a [Option<(usize, usize)>],
    pub options: Options,
}

pub fn eval(condition: &Condition, ctx: &EvalContext<'_>) -> Outcome {
    match condition {
        Condition::Epsilon => Outcome::Epsilon,
        Condition::Anchor(anchor) => {
            if anchor_matches(*anchor, ctx) {
                Outcome::Epsilon
            } else {
                Outcome::Rejected
            }
        }
        Condition::Char(c) => match ctx.chars.get(ctx.pos) {
            Some(&x) if char_eq(*c, x, ctx.options) => Outcome::Accepted(1),
            _ => Outcome::Rejected,
        },
        Condition::Literal(lit) => {
            let lit: Vec<char> = lit.chars().collect();
            let end = ctx.pos + lit.len();
            if end <= ctx.chars.len()
                && lit
                    .iter()
                    .zip(&ctx.chars[ctx.pos..end])
                    .all(|(&a, &b)| char_eq(a, b, ctx.options))
            {
                Outcome::Accepted(lit.len())
            } else {
                Outcome::Rejected
            }
        }
        Condition::Set(set) => match ctx.chars.get(ctx.pos) {
            Some(&x) if set_matches(set, x, ctx.options) => Outcome::Accepted(1),
            _ => Outcome::Rejected,
        },
        Condition::NegatedSet(set) => match ctx.chars.get(ctx.pos) {
            Some(&x) if !set_matches(set, x, ctx.options) => Outcome::Accepted(1),
            _ => Outcome::Rejected,
        },
        Condition::Range(lo, hi) => match ctx.chars.get(ctx.pos) {
            Some(&x) => {
                let ok = if ctx.options.contains(Options::CASE_INSENSITIVE) {
                    charclass::range_contains_case_insensitive(*lo, *hi, x)
                } else {
                    *lo <= x && x <= *hi
                };
                if ok {
                    Outcome::Accepted(1)
                } else {
                    Outcome::Rejected
                }
            }
            None => Outcome::Rejected,
        },
        Condition::AnyChar => match ctx.chars.get(ctx.pos) {
            Some(&x) if x != '\n' || ctx.options.contains(Options::DOT_MATCHES_LINE_SEPARATORS) => {
                Outcome::Accepted(1)
            }
            _ => Outcome::Rejected,
        },
        Condition::Backreference(index) => eval_backreference(*index, ctx),
    }
}

fn eval_backreference(index: u32, ctx: &EvalContext<'_>) -> Outcome {
    match ctx.groups.get(index as usize).and_then(|g| *g) {
        None => Outcome::Rejected,
        Some((start, end)) => {
            let len = end - start;
            if len == 0 {
                return Outcome::Epsilon;
            }
            if ctx.pos + len > ctx.chars.len() {
                return Outcome::Rejected;
            }
            let captured = &ctx.chars[start..end];
            let current = &ctx.chars[ctx.pos..ctx.pos + len];
            let eq = if ctx.options.contains(Options::CASE_INSENSITIVE) {
                captured
                    .iter()
                    .zip(current)
                    .all(|(&a, &b)| charclass::case_fold_eq(a, b))
            } else {
                captured == current
            };
            if eq {
                Outcome::Accepted(len)
            } else {
                Outcome::Rejected
            }
        }
    }
}

fn char_eq(a: char, b: char, options: Options) -> bool {
    if options.contains(Options::CASE_INSENSITIVE) {
        charclass::case_fold_eq(a, b)
    } else {
        a == b
    }
}

fn set_matches(set: &CharSet, c: char, options: Options) -> bool {
    if options.contains(Options::CASE_INSENSITIVE) {
        set.contains_case_insensitive(c)
    } else {
        set.contains(c)
    }
}

/// Anchor semantics resolved against the cursor's current position. The
/// `^`/`$`/`\A` "start_index == 0" wording in the external contract is
/// read as "the cursor sits at the absolute start of the input" — see
/// `DESIGN.md` for why (grounded in the teacher's `is_begin`/`is_end`).
fn anchor_matches(anchor: Anchor, ctx: &EvalContext<'_>) -> bool {
    let len = ctx.chars.len();
    let i = ctx.pos;
    let prev = if i > 0 { Some(ctx.chars[i - 1]) } else { None };
    let cur = ctx.chars.get(i).copied();
    let multiline = ctx.options.contains(Options::MULTILINE);
    match anchor {
        Anchor::StartOfLine => i == 0 || (multiline && prev == Some('\n')),
        Anchor::EndOfLine => i == len || (multiline && cur == Some('\n')),
        Anchor::StartOfStringOnly => i == 0,
        Anchor::EndOfStringOnly => i == len,
        Anchor::EndOfStringOnlyStrict => {
            i == len || (len > 0 && i == len - 1 && cur == Some('\n'))
        }
        Anchor::WordBoundary => is_word_char(prev) != is_word_char(cur),
        Anchor::NonWordBoundary => is_word_char(prev) == is_word_char(cur),
        Anchor::PreviousMatchEnd => i == ctx.search_origin || ctx.previous_match_end == Some(i),
    }
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(charclass::is_word)
}

/// An immutable, shareable compiled pattern. See §5: this value is freely
/// shareable for read across threads — every match attempt allocates its
/// own cursor and scratch state.
#[derive(Debug)]
pub struct Nfa {
    pub states: Vec<State>,
    pub start: StateId,
    pub captures: Vec<CaptureGroupRecord>,
    pub num_groups: u32,
    pub is_regular: bool,
    pub is_from_start_of_string: bool,
}

impl Nfa {
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.states[id].transitions.is_empty()
    }
}
