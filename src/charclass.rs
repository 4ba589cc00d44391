//! The character-class service (see the design notes in `DESIGN.md`).
//!
//! This module is the engine's one dependency on Unicode data. It answers
//! three questions for the rest of the crate: is this character in some
//! named set, are these two characters the same under case folding, and is
//! this character a "word" character. Everything above it — the parser's
//! bracket-expression items, the compiler's `Condition::Set` — is built out
//! of the `CharSet` type defined here.

use unicode_general_category::{get_general_category, GeneralCategory};

use crate::unicode_tables;

/// The Unicode general-category groupings this engine exposes through
/// `\p{...}` / `\P{...}`. Limited to the five names the grammar supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeCategory {
    /// `P`: any punctuation category.
    Punctuation,
    /// `Lt`: titlecase letter.
    TitlecaseLetter,
    /// `Ll`: lowercase letter.
    LowercaseLetter,
    /// `N`: any number category.
    Number,
    /// `S`: any symbol category.
    Symbol,
}

impl UnicodeCategory {
    pub fn parse(name: &str) -> Option<UnicodeCategory> {
        match name {
            "P" => Some(UnicodeCategory::Punctuation),
            "Lt" => Some(UnicodeCategory::TitlecaseLetter),
            "Ll" => Some(UnicodeCategory::LowercaseLetter),
            "N" => Some(UnicodeCategory::Number),
            "S" => Some(UnicodeCategory::Symbol),
            _ => None,
        }
    }

    pub fn contains(self, c: char) -> bool {
        use GeneralCategory::*;
        match (self, get_general_category(c)) {
            (
                UnicodeCategory::Punctuation,
                DashPunctuation
                | OpenPunctuation
                | ClosePunctuation
                | ConnectorPunctuation
                | OtherPunctuation
                | InitialPunctuation
                | FinalPunctuation,
            ) => true,
            (UnicodeCategory::TitlecaseLetter, TitlecaseLetter) => true,
            (UnicodeCategory::LowercaseLetter, LowercaseLetter) => true,
            (UnicodeCategory::Number, DecimalNumber | LetterNumber | OtherNumber) => true,
            (
                UnicodeCategory::Symbol,
                MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol,
            ) => true,
            _ => false,
        }
    }
}

/// An opaque predicate over `char`, supporting the set algebra the compiler
/// needs: union, inversion, and insertion of a single character.
///
/// Kept as a small tree rather than flattened scalar ranges, since the
/// Unicode-category variants aren't naturally expressible as a short list
/// of ranges; `contains` just evaluates the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CharSet {
    Ranges(Vec<(char, char)>),
    Category(UnicodeCategory),
    Union(Vec<CharSet>),
    Negated(Box<CharSet>),
}

impl CharSet {
    pub fn empty() -> CharSet {
        CharSet::Ranges(Vec::new())
    }

    pub fn from_char(c: char) -> CharSet {
        CharSet::Ranges(vec![(c, c)])
    }

    pub fn from_range(lo: char, hi: char) -> CharSet {
        CharSet::Ranges(vec![(lo, hi)])
    }

    pub fn from_static_ranges(ranges: &[(char, char)]) -> CharSet {
        CharSet::Ranges(ranges.to_vec())
    }

    pub fn from_category(category: UnicodeCategory) -> CharSet {
        CharSet::Category(category)
    }

    pub fn perl_digit() -> CharSet {
        CharSet::from_static_ranges(unicode_tables::PERL_DIGIT)
    }

    pub fn perl_space() -> CharSet {
        CharSet::from_static_ranges(unicode_tables::PERL_SPACE)
    }

    pub fn perl_word() -> CharSet {
        CharSet::from_static_ranges(unicode_tables::PERL_WORD)
    }

    pub fn insert_char(&mut self, c: char) {
        self.insert_range(c, c);
    }

    pub fn insert_range(&mut self, lo: char, hi: char) {
        match self {
            CharSet::Ranges(ranges) => {
                ranges.push((lo, hi));
                normalize(ranges);
            }
            other => {
                let mut ranges = vec![(lo, hi)];
                let existing = std::mem::replace(other, CharSet::empty());
                normalize(&mut ranges);
                *other = CharSet::Union(vec![existing, CharSet::Ranges(ranges)]);
            }
        }
    }

    pub fn union(self, other: CharSet) -> CharSet {
        match (self, other) {
            (CharSet::Ranges(mut a), CharSet::Ranges(b)) => {
                a.extend(b);
                normalize(&mut a);
                CharSet::Ranges(a)
            }
            (CharSet::Union(mut a), CharSet::Union(b)) => {
                a.extend(b);
                CharSet::Union(a)
            }
            (CharSet::Union(mut a), b) => {
                a.push(b);
                CharSet::Union(a)
            }
            (a, CharSet::Union(mut b)) => {
                b.insert(0, a);
                CharSet::Union(b)
            }
            (a, b) => CharSet::Union(vec![a, b]),
        }
    }

    pub fn invert(self) -> CharSet {
        match self {
            CharSet::Negated(inner) => *inner,
            other => CharSet::Negated(Box::new(other)),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        match self {
            CharSet::Ranges(ranges) => ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi),
            CharSet::Category(cat) => cat.contains(c),
            CharSet::Union(sets) => sets.iter().any(|s| s.contains(c)),
            CharSet::Negated(inner) => !inner.contains(c),
        }
    }

    /// Membership under case folding: true if `c` is in the set directly,
    /// or any case-fold variant of `c` is.
    pub fn contains_case_insensitive(&self, c: char) -> bool {
        if self.contains(c) {
            return true;
        }
        c.to_lowercase().chain(c.to_uppercase()).any(|folded| self.contains(folded))
    }
}

/// Merges overlapping or adjacent ranges in place and sorts the result.
/// O(n log n); the sets built by a single pattern's bracket expression are
/// small enough that this never matters in practice.
fn normalize(ranges: &mut Vec<(char, char)>) {
    if ranges.is_empty() {
        return;
    }
    ranges.sort();
    let mut merged: Vec<(char, char)> = Vec::with_capacity(ranges.len());
    for &(lo, hi) in ranges.iter() {
        match merged.last_mut() {
            Some((_, prev_hi)) if adjacent_or_overlapping(*prev_hi, lo) => {
                if hi > *prev_hi {
                    *prev_hi = hi;
                }
            }
            _ => merged.push((lo, hi)),
        }
    }
    *ranges = merged;
}

fn adjacent_or_overlapping(prev_hi: char, next_lo: char) -> bool {
    (next_lo as u32) <= (prev_hi as u32).saturating_add(1)
}

/// Two code points compare equal under this engine's case-folding policy:
/// scalar-wise `char::to_lowercase()`, applied consistently wherever
/// case-insensitive matching occurs (literal characters, string runs,
/// ranges and sets). See `DESIGN.md` for why this was chosen over an NFKC
/// fold.
pub fn case_fold_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// `a` is the `lo..=hi` boundary of a parsed character range; under case
/// folding, `c` is a member if any of its case variants falls in range.
pub fn range_contains_case_insensitive(lo: char, hi: char, c: char) -> bool {
    let in_range = |x: char| lo <= x && x <= hi;
    in_range(c) || c.to_lowercase().chain(c.to_uppercase()).any(in_range)
}

/// A "word" character: letter, digit, or underscore.
pub fn is_word(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
