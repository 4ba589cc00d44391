//! A recursive-descent parser with rollback (the stack lives on the Rust
//! call stack rather than the explicit `BuildAst` stack the teacher used;
//! the grammar here has no flag-scoping or named captures to justify that
//! machinery).
//!
//! Grammar, informally (see `DESIGN.md` for the grounding notes):
//!
//! ```text
//! regex          := '^'? expression END
//! expression     := subexpression ('|' subexpression)*
//! subexpression  := quantified*
//! quantified     := term quantifier?
//! term           := group | anchor | backreference | match
//! group          := '(' '?:'? expression ')'
//! match          := '.' | characterGroup | characterClass | escapedChar | literalChar
//! ```

use crate::ast::{Anchor, Ast, GroupItem, Quantifier};
use crate::charclass::{CharSet, UnicodeCategory};
use crate::error::Error;

/// Parses `pattern`, returning its AST and whether the pattern's very first
/// character is `^` (the `is_from_start_of_string` flag the compiler uses
/// to skip the matcher's restart loop outside multiline mode).
pub fn parse(pattern: &str) -> Result<(Ast, bool), Error> {
    let mut parser = Parser {
        pattern,
        chars: pattern.chars().collect(),
        pos: 0,
    };
    let ast = parser.parse_expression()?;
    match parser.peek() {
        None => {}
        Some(')') => {
            return Err(Error::syntax(
                pattern,
                parser.pos,
                "Unmatched closing parentheses",
            ))
        }
        Some(_) => {
            return Err(Error::syntax(
                pattern,
                parser.pos,
                "Unexpected trailing input",
            ))
        }
    }
    let is_from_start_of_string = pattern.starts_with('^');
    Ok((ast, is_from_start_of_string))
}

/// A single item parsed inside `[...]`, before it is known to be a range
/// endpoint or a standalone item.
enum BracketAtom {
    Char(char),
    Set(CharSet),
}

struct Parser<'p> {
    pattern: &'p str,
    chars: Vec<char>,
    pos: usize,
}

impl<'p> Parser<'p> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn find_char(&self, target: char) -> Option<usize> {
        self.chars[self.pos..]
            .iter()
            .position(|&c| c == target)
            .map(|i| self.pos + i)
    }

    fn err(&self, at: usize, message: &str) -> Error {
        Error::syntax(self.pattern, at, message)
    }

    fn parse_expression(&mut self) -> Result<Ast, Error> {
        let mut alternatives = vec![self.parse_subexpression()?];
        while self.peek() == Some('|') {
            self.advance();
            alternatives.push(self.parse_subexpression()?);
        }
        if alternatives.len() == 1 {
            Ok(alternatives.into_iter().next().unwrap())
        } else {
            Ok(Ast::Alternation(alternatives))
        }
    }

    /// A run of quantified terms. May be empty (an empty group body, or an
    /// empty alternative), which compiles to a fragment that consumes
    /// nothing.
    fn parse_subexpression(&mut self) -> Result<Ast, Error> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None | Some('|') | Some(')') => break,
                _ => items.push(self.parse_quantified()?),
            }
        }
        Ok(Ast::ImplicitGroup(items))
    }

    fn parse_quantified(&mut self) -> Result<Ast, Error> {
        let (term, quantifiable) = self.parse_term()?;
        if !quantifiable {
            return Ok(term);
        }
        let quantifier = match self.peek() {
            Some('*') => {
                self.advance();
                Some(Quantifier::ZeroOrMore)
            }
            Some('+') => {
                self.advance();
                Some(Quantifier::OneOrMore)
            }
            Some('?') => {
                self.advance();
                Some(Quantifier::ZeroOrOne)
            }
            Some('{') => self.parse_counted()?,
            _ => None,
        };
        match quantifier {
            None => Ok(term),
            Some(quantifier) => {
                let lazy = if self.peek() == Some('?') {
                    self.advance();
                    true
                } else {
                    false
                };
                Ok(Ast::Quantified {
                    child: Box::new(term),
                    quantifier,
                    lazy,
                })
            }
        }
    }

    /// Returns the parsed term and whether a postfix quantifier may follow
    /// it (anchors and backreferences may not, per the grammar).
    fn parse_term(&mut self) -> Result<(Ast, bool), Error> {
        match self.peek() {
            Some('*') | Some('+') | Some('?') => Err(self.err(
                self.pos,
                "The preceding token is not quantifiable",
            )),
            Some('(') => self.parse_group(),
            Some('[') => {
                self.advance();
                Ok((self.parse_character_group()?, true))
            }
            Some('.') => {
                self.advance();
                Ok((Ast::AnyCharacter, true))
            }
            Some('^') => {
                self.advance();
                Ok((Ast::Anchor(Anchor::StartOfLine), false))
            }
            Some('$') => {
                self.advance();
                Ok((Ast::Anchor(Anchor::EndOfLine), false))
            }
            Some('\\') => self.parse_escape(),
            Some(c) => {
                self.advance();
                Ok((Ast::Character(c), true))
            }
            None => unreachable!("caller only invokes parse_term when a term is present"),
        }
    }

    fn parse_group(&mut self) -> Result<(Ast, bool), Error> {
        let open_pos = self.pos;
        self.advance(); // '('
        let mut capturing = true;
        if self.peek() == Some('?') && self.peek_at(1) == Some(':') {
            self.advance();
            self.advance();
            capturing = false;
        }
        let child = self.parse_expression()?;
        if self.peek() != Some(')') {
            return Err(self.err(open_pos, "Unmatched opening parentheses"));
        }
        self.advance(); // ')'
        Ok((
            Ast::Group {
                index: None,
                capturing,
                child: Box::new(child),
            },
            true,
        ))
    }

    fn parse_counted(&mut self) -> Result<Option<Quantifier>, Error> {
        let open_pos = self.pos;
        self.advance(); // '{'
        let closer = match self.find_char('}') {
            Some(i) => i,
            None => return Err(self.err(open_pos, "Range quantifier missing closing bracket")),
        };
        let inner: String = self.chars[self.pos..closer].iter().collect();
        self.pos = closer + 1;
        let body_pos = open_pos + 1;

        if inner.is_empty() {
            return Err(self.err(open_pos, "Range quantifier missing range"));
        }
        if let Some(comma) = inner.find(',') {
            let (lower_s, upper_s) = (&inner[..comma], &inner[comma + 1..]);
            if lower_s.is_empty() {
                return Err(self.err(body_pos, "Range quantifier missing lower bound"));
            }
            let lower: i64 = lower_s
                .parse()
                .map_err(|_| self.err(body_pos, "Range quantifier has invalid lower bound"))?;
            if lower < 0 {
                return Err(self.err(
                    body_pos,
                    "Range quantifier lower bound must be non-negative",
                ));
            }
            if upper_s.is_empty() {
                return Ok(Some(Quantifier::Range {
                    lower: lower as u32,
                    upper: None,
                }));
            }
            let upper: i64 = upper_s
                .parse()
                .map_err(|_| self.err(body_pos, "Range quantifier has invalid upper bound"))?;
            if upper < lower {
                return Err(self.err(
                    body_pos,
                    "Range quantifier upper bound must be greater than or equal than lower bound",
                ));
            }
            Ok(Some(Quantifier::Range {
                lower: lower as u32,
                upper: Some(upper as u32),
            }))
        } else {
            let n: i64 = inner
                .parse()
                .map_err(|_| self.err(body_pos, "Range quantifier has invalid bound"))?;
            if n <= 0 {
                return Err(self.err(body_pos, "Range quantifier must be more than zero"));
            }
            Ok(Some(Quantifier::Range {
                lower: n as u32,
                upper: Some(n as u32),
            }))
        }
    }

    fn parse_escape(&mut self) -> Result<(Ast, bool), Error> {
        let backslash_pos = self.pos;
        self.advance(); // '\'
        let c = match self.peek() {
            None => {
                return Err(self.err(
                    backslash_pos,
                    "Pattern may not end with a trailing backslash",
                ))
            }
            Some(c) => c,
        };
        match c {
            'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
                self.advance();
                Ok((Ast::CharacterSet(perl_class(c)), true))
            }
            'p' | 'P' => {
                let negated = c == 'P';
                self.advance();
                let category = self.parse_unicode_category_body()?;
                let mut set = CharSet::from_category(category);
                if negated {
                    set = set.invert();
                }
                Ok((Ast::CharacterSet(set), true))
            }
            'b' => {
                self.advance();
                Ok((Ast::Anchor(Anchor::WordBoundary), false))
            }
            'B' => {
                self.advance();
                Ok((Ast::Anchor(Anchor::NonWordBoundary), false))
            }
            'A' => {
                self.advance();
                Ok((Ast::Anchor(Anchor::StartOfStringOnly), false))
            }
            'Z' => {
                self.advance();
                Ok((Ast::Anchor(Anchor::EndOfStringOnlyStrict), false))
            }
            'z' => {
                self.advance();
                Ok((Ast::Anchor(Anchor::EndOfStringOnly), false))
            }
            'G' => {
                self.advance();
                Ok((Ast::Anchor(Anchor::PreviousMatchEnd), false))
            }
            '1'..='9' => {
                self.advance();
                Ok((Ast::Backreference(c.to_digit(10).unwrap()), false))
            }
            other => {
                self.advance();
                Ok((Ast::Character(escaped_literal(other)), true))
            }
        }
    }

    /// Parses `{name}` after `\p` / `\P` has already been consumed.
    fn parse_unicode_category_body(&mut self) -> Result<UnicodeCategory, Error> {
        if self.peek() != Some('{') {
            return Err(self.err(self.pos, "Missing unicode category name"));
        }
        self.advance(); // '{'
        let name_start = self.pos;
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '}' {
                break;
            }
            name.push(c);
            self.advance();
        }
        if self.peek() != Some('}') {
            return Err(self.err(
                name_start,
                "Missing closing bracket for unicode category name",
            ));
        }
        if name.is_empty() {
            return Err(self.err(name_start, "Missing unicode category name"));
        }
        let category = UnicodeCategory::parse(&name).ok_or_else(|| {
            self.err(
                name_start,
                &format!("Unsupported unicode category '{}'", name),
            )
        })?;
        self.advance(); // '}'
        Ok(category)
    }

    /// Parses `[...]`. Assumes `[` has already been consumed.
    fn parse_character_group(&mut self) -> Result<Ast, Error> {
        let open_pos = self.pos - 1;
        let inverted = if self.peek() == Some('^') {
            self.advance();
            true
        } else {
            false
        };

        let mut items: Vec<GroupItem> = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => {
                    return Err(self.err(open_pos, "Character group missing closing bracket"))
                }
                Some(']') => {
                    self.advance();
                    break;
                }
                Some('-') if first || self.peek_at(1) == Some(']') => {
                    self.advance();
                    items.push(GroupItem::Character('-'));
                    first = false;
                }
                Some('/') => {
                    return Err(self.err(
                        self.pos,
                        "An unescaped delimiter must be escaped with a backslash",
                    ))
                }
                Some('\\') => {
                    let atom_pos = self.pos;
                    match self.parse_bracket_escape()? {
                        BracketAtom::Set(set) => {
                            items.push(GroupItem::Set(set));
                            first = false;
                        }
                        BracketAtom::Char(c) => {
                            self.push_bracket_char(&mut items, c, atom_pos)?;
                            first = false;
                        }
                    }
                }
                Some(c) => {
                    let atom_pos = self.pos;
                    self.advance();
                    self.push_bracket_char(&mut items, c, atom_pos)?;
                    first = false;
                }
            }
        }

        if items.is_empty() {
            return Err(self.err(open_pos, "Character group is empty"));
        }
        Ok(Ast::CharacterGroup { inverted, items })
    }

    /// Having just consumed a literal character `c` at `atom_pos`, checks
    /// whether it opens a `c-c2` range and pushes the right item either way.
    fn push_bracket_char(
        &mut self,
        items: &mut Vec<GroupItem>,
        c: char,
        atom_pos: usize,
    ) -> Result<(), Error> {
        if self.peek() == Some('-') && self.peek_at(1).is_some() && self.peek_at(1) != Some(']') {
            self.advance(); // '-'
            let hi_pos = self.pos;
            let hi = match self.peek() {
                Some('\\') => match self.parse_bracket_escape()? {
                    BracketAtom::Char(hi) => hi,
                    BracketAtom::Set(_) => {
                        return Err(self.err(hi_pos, "Character range is out of order"))
                    }
                },
                Some(hi) => {
                    self.advance();
                    hi
                }
                None => unreachable!("peek_at(1) was confirmed Some before consuming '-'"),
            };
            if hi < c {
                return Err(self.err(atom_pos, "Character range is out of order"));
            }
            items.push(GroupItem::Range(c, hi));
        } else {
            items.push(GroupItem::Character(c));
        }
        Ok(())
    }

    /// Parses an escape sequence inside `[...]`. Assumes the cursor is at
    /// the leading `\`.
    fn parse_bracket_escape(&mut self) -> Result<BracketAtom, Error> {
        let backslash_pos = self.pos;
        self.advance(); // '\'
        let c = match self.peek() {
            None => {
                return Err(self.err(
                    backslash_pos,
                    "Pattern may not end with a trailing backslash",
                ))
            }
            Some(c) => c,
        };
        match c {
            'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
                self.advance();
                Ok(BracketAtom::Set(perl_class(c)))
            }
            'p' | 'P' => {
                let negated = c == 'P';
                self.advance();
                let category = self.parse_unicode_category_body()?;
                let mut set = CharSet::from_category(category);
                if negated {
                    set = set.invert();
                }
                Ok(BracketAtom::Set(set))
            }
            'A' | 'Z' | 'z' | 'b' | 'B' | 'G' | '1'..='9' => Err(self.err(
                backslash_pos,
                "Invalid escape sequence inside a character group",
            )),
            other => {
                self.advance();
                Ok(BracketAtom::Char(escaped_literal(other)))
            }
        }
    }
}

fn perl_class(c: char) -> CharSet {
    let base = match c.to_ascii_lowercase() {
        'd' => CharSet::perl_digit(),
        's' => CharSet::perl_space(),
        'w' => CharSet::perl_word(),
        _ => unreachable!(),
    };
    if c.is_ascii_uppercase() {
        base.invert()
    } else {
        base
    }
}

fn escaped_literal(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'f' => '\x0C',
        'v' => '\x0B',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_items(ast: &Ast) -> &[GroupItem] {
        match ast {
            Ast::CharacterGroup { items, .. } => items,
            other => panic!("expected CharacterGroup, got {:?}", other),
        }
    }

    #[test]
    fn parses_literal_concatenation() {
        let (ast, anchored) = parse("ab").unwrap();
        assert!(!anchored);
        assert_eq!(
            ast,
            Ast::ImplicitGroup(vec![Ast::Character('a'), Ast::Character('b')])
        );
    }

    #[test]
    fn tracks_leading_caret() {
        let (_, anchored) = parse("^a").unwrap();
        assert!(anchored);
        let (_, not_anchored) = parse("a^").unwrap();
        assert!(!not_anchored);
    }

    #[test]
    fn parses_alternation() {
        let (ast, _) = parse("a|b").unwrap();
        match ast {
            Ast::Alternation(alts) => assert_eq!(alts.len(), 2),
            other => panic!("expected Alternation, got {:?}", other),
        }
    }

    #[test]
    fn parses_capturing_and_noncapturing_groups() {
        let (ast, _) = parse("(a)(?:b)").unwrap();
        match ast {
            Ast::ImplicitGroup(items) => {
                assert!(matches!(&items[0], Ast::Group { capturing: true, .. }));
                assert!(matches!(&items[1], Ast::Group { capturing: false, .. }));
            }
            other => panic!("expected ImplicitGroup, got {:?}", other),
        }
    }

    #[test]
    fn parses_counted_quantifier() {
        let (ast, _) = parse("a{2,5}").unwrap();
        match ast {
            Ast::ImplicitGroup(items) => match &items[0] {
                Ast::Quantified { quantifier, lazy, .. } => {
                    assert_eq!(
                        *quantifier,
                        Quantifier::Range {
                            lower: 2,
                            upper: Some(5)
                        }
                    );
                    assert!(!lazy);
                }
                other => panic!("expected Quantified, got {:?}", other),
            },
            other => panic!("expected ImplicitGroup, got {:?}", other),
        }
    }

    #[test]
    fn character_group_has_leading_dash_as_literal() {
        let (ast, _) = parse("[-a]").unwrap();
        let items = match &ast {
            Ast::ImplicitGroup(v) => group_items(&v[0]),
            other => panic!("expected ImplicitGroup, got {:?}", other),
        };
        assert_eq!(items, &[GroupItem::Character('-'), GroupItem::Character('a')]);
    }

    #[test]
    fn error_unclosed_character_group() {
        let err = parse("[b").unwrap_err();
        assert_eq!(err.message, "Character group missing closing bracket");
        assert_eq!(err.index_in_pattern, 0);
    }

    #[test]
    fn error_unclosed_counted_repetition() {
        let err = parse("a{3").unwrap_err();
        assert_eq!(err.message, "Range quantifier missing closing bracket");
        assert_eq!(err.index_in_pattern, 1);
    }

    #[test]
    fn error_leading_star() {
        let err = parse("*").unwrap_err();
        assert_eq!(err.message, "The preceding token is not quantifiable");
    }

    #[test]
    fn error_unmatched_opening_paren() {
        let err = parse("(").unwrap_err();
        assert_eq!(err.message, "Unmatched opening parentheses");
    }

    #[test]
    fn error_unmatched_closing_paren() {
        let err = parse("a)").unwrap_err();
        assert_eq!(err.message, "Unmatched closing parentheses");
    }

    #[test]
    fn error_trailing_backslash() {
        let err = parse("\\").unwrap_err();
        assert_eq!(
            err.message,
            "Pattern may not end with a trailing backslash"
        );
    }

    #[test]
    fn error_out_of_order_range() {
        let err = parse("[z-a]").unwrap_err();
        assert_eq!(err.message, "Character range is out of order");
    }

    #[test]
    fn error_empty_character_group() {
        let err = parse("[]").unwrap_err();
        assert_eq!(err.message, "Character group is empty");
    }

    #[test]
    fn error_double_repeat() {
        let err = parse("a**").unwrap_err();
        assert_eq!(err.message, "The preceding token is not quantifiable");
    }
}
