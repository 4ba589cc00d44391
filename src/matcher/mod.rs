//! The common shell shared by both matching strategies (§4.5): a cursor
//! that drives repeated match attempts across an input, routing each
//! attempt to the BFS or DFS engine depending on `Nfa::is_regular`.

pub mod backtrack;
pub mod bfs;

use crate::nfa::{Nfa, StateId};
use crate::options::Options;

/// One capture group's resolved boundaries, or `None` if the group never
/// participated in this match attempt. Index 0 is unused; groups are
/// 1-indexed to match `CaptureGroupRecord::group_index`.
pub type Groups = Vec<Option<(usize, usize)>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub start: usize,
    pub end: usize,
    pub groups: Groups,
}

/// Everything one match attempt (one call into `bfs::run` or
/// `backtrack::run`) needs; borrowed from the driving `Cursor`.
pub struct StartContext<'a> {
    pub chars: &'a [char],
    pub nfa: &'a Nfa,
    pub options: Options,
    /// Floor below which the attempt won't look. For the backtracker this
    /// is the one fixed position it tries; the BFS engine treats it as a
    /// starting point for a scan that keeps going, not a single offset.
    pub start_index: usize,
    /// Where the overall search began, fixed for the cursor's whole
    /// lifetime. This is what `\G` compares against — never `start_index`,
    /// which drifts forward on every retry.
    pub search_origin: usize,
    pub previous_match_end: Option<usize>,
}

/// Drives repeated match attempts over one input, sliding the search
/// start forward after each attempt per the rules in §4.5.
pub struct Cursor<'a> {
    chars: &'a [char],
    nfa: &'a Nfa,
    options: Options,
    search_from: usize,
    search_origin: usize,
    previous_match_end: Option<usize>,
    exhausted: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(chars: &'a [char], nfa: &'a Nfa, options: Options) -> Cursor<'a> {
        Cursor {
            chars,
            nfa,
            options,
            search_from: 0,
            search_origin: 0,
            previous_match_end: None,
            exhausted: false,
        }
    }

    /// Advances to the next match, or `None` once the input is exhausted.
    /// Anchored patterns (`is_from_start_of_string`) outside multiline mode
    /// only ever get one attempt, at index 0 — multiline mode instead lets
    /// the anchor condition itself gate which positions can match, so the
    /// same sliding scan works for both (see `DESIGN.md`).
    pub fn next_match(&mut self) -> Option<RawMatch> {
        if self.exhausted {
            return None;
        }
        if self.search_from > self.chars.len() {
            self.exhausted = true;
            return None;
        }
        if self.nfa.is_regular {
            self.next_match_bfs()
        } else {
            self.next_match_backtrack()
        }
    }

    /// `bfs::run` makes one continuous forward pass over the remaining
    /// input, injecting a fresh start thread at every position it visits
    /// (see its doc comment) — so it already tries every start offset from
    /// `search_from` onward in a single call. A `None` here means no match
    /// exists anywhere in the rest of the input; there is nothing to retry.
    fn next_match_bfs(&mut self) -> Option<RawMatch> {
        let ctx = StartContext {
            chars: self.chars,
            nfa: self.nfa,
            options: self.options,
            start_index: self.search_from,
            search_origin: self.search_origin,
            previous_match_end: self.previous_match_end,
        };
        match bfs::run(&ctx) {
            Some(m) => {
                self.previous_match_end = Some(m.end);
                self.search_from = if m.end == m.start { m.end + 1 } else { m.end };
                Some(m)
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    /// Backreferences and lazy quantifiers fall outside the regular subset
    /// the BFS engine handles, so each start position is its own
    /// independent backtracking attempt with no guarantee of linear time.
    fn next_match_backtrack(&mut self) -> Option<RawMatch> {
        loop {
            if self.search_from > self.chars.len() {
                self.exhausted = true;
                return None;
            }
            let ctx = StartContext {
                chars: self.chars,
                nfa: self.nfa,
                options: self.options,
                start_index: self.search_from,
                search_origin: self.search_origin,
                previous_match_end: self.previous_match_end,
            };
            let anchored_single_shot =
                self.nfa.is_from_start_of_string && !self.options.contains(Options::MULTILINE);

            match backtrack::run(&ctx) {
                Some(m) => {
                    self.previous_match_end = Some(m.end);
                    self.search_from = if m.end == m.start { m.end + 1 } else { m.end };
                    if anchored_single_shot {
                        self.exhausted = true;
                    }
                    return Some(m);
                }
                None => {
                    if anchored_single_shot {
                        self.exhausted = true;
                        return None;
                    }
                    self.search_from += 1;
                }
            }
        }
    }
}

/// Applies every capture-group record gated on `state` to `starts`/`groups`:
/// records a pending start the first time a group's start state is entered,
/// and finalizes the group's range the first time its end state is entered
/// with a start already recorded. Shared by both matchers.
pub fn apply_capture(
    nfa: &Nfa,
    state: StateId,
    pos: usize,
    mut starts: Vec<Option<usize>>,
    mut groups: Groups,
) -> (Vec<Option<usize>>, Groups) {
    for record in &nfa.captures {
        let index = record.group_index as usize;
        if record.start_state == state && starts[index].is_none() {
            starts[index] = Some(pos);
        }
        if record.end_state == state {
            if let Some(start) = starts[index] {
                groups[index] = Some((start, pos));
            }
        }
    }
    (starts, groups)
}

pub fn empty_groups(nfa: &Nfa) -> Groups {
    vec![None; nfa.num_groups as usize + 1]
}

pub fn empty_starts(nfa: &Nfa) -> Vec<Option<usize>> {
    vec![None; nfa.num_groups as usize + 1]
}
