//! The abstract syntax tree produced by the parser and rewritten by the
//! optimizer. A sealed tagged variant, matched exhaustively everywhere it's
//! consumed rather than dispatched through a trait object — see
//! `DESIGN.md` for why.

use crate::charclass::CharSet;

/// One item inside a bracket expression (`[...]`).
#[derive(Debug, Clone, PartialEq)]
pub enum GroupItem {
    Character(char),
    Range(char, char),
    Set(CharSet),
}

/// How many times a quantified node may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
    /// `{lower,upper}`; `upper = None` means unbounded.
    Range { lower: u32, upper: Option<u32> },
}

/// A zero-width, position-gated assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `^`
    StartOfLine,
    /// `$`
    EndOfLine,
    /// `\A`
    StartOfStringOnly,
    /// `\z`
    EndOfStringOnly,
    /// `\Z`
    EndOfStringOnlyStrict,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// `\G`
    PreviousMatchEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Character(char),
    /// A literal multi-character run; only ever produced by the optimizer.
    String(String),
    AnyCharacter,
    /// A predicate set spelled directly in the grammar (`\d`, `\p{N}`, ...).
    CharacterSet(CharSet),
    CharacterGroup {
        inverted: bool,
        items: Vec<GroupItem>,
    },
    Group {
        index: Option<u32>,
        capturing: bool,
        child: Box<Ast>,
    },
    /// Anonymous concatenation of children, in source order.
    ImplicitGroup(Vec<Ast>),
    /// Alternatives in source (left-first) order.
    Alternation(Vec<Ast>),
    Quantified {
        child: Box<Ast>,
        quantifier: Quantifier,
        lazy: bool,
    },
    Anchor(Anchor),
    Backreference(u32),
}

impl Ast {
    pub fn implicit_group(children: Vec<Ast>) -> Ast {
        Ast::ImplicitGroup(children)
    }
}
