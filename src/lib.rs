//! A from-scratch regular expression engine: a combinator-style parser, an
//! idempotent AST optimizer, a Thompson-style compiler producing an
//! indexed NFA, and a dual-strategy matcher — BFS simulation for the
//! regular subset, DFS backtracking for patterns using backreferences or
//! lazy quantifiers.
//!
//! ```
//! use rex::Regex;
//!
//! let re = Regex::new(r"(\w+)\s+(car)").unwrap();
//! let m = re.first_match("Green car red car").unwrap();
//! assert_eq!(m.full_match, "Green car");
//! assert_eq!(m.groups, vec!["Green".to_owned(), "car".to_owned()]);
//! ```

mod ast;
mod charclass;
mod compiler;
mod error;
mod matcher;
mod nfa;
mod optimizer;
mod options;
mod parser;
mod regexp;
mod unicode_tables;

pub use crate::error::{Error, ErrorKind};
pub use crate::options::Options;
pub use crate::regexp::{Match, Regex};

/// Escapes every metacharacter in `s` so the result matches `s` literally
/// wherever it's dropped into a pattern.
pub fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len());
    for c in s.chars() {
        if is_metacharacter(c) {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}

fn is_metacharacter(c: char) -> bool {
    matches!(
        c,
        '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
    )
}

/// Compiles `pattern` and tests it against `text` in one call.
pub fn is_match(pattern: &str, text: &str) -> Result<bool, Error> {
    Regex::new(pattern).map(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_every_metacharacter() {
        assert_eq!(quote("a.b*c"), r"a\.b\*c");
        assert_eq!(quote("(1+1)?"), r"\(1\+1\)\?");
    }

    #[test]
    fn quote_then_compile_matches_only_the_literal_text() {
        let pattern = quote("a.b*c");
        let re = Regex::new(&pattern).unwrap();
        assert!(re.is_match("a.b*c"));
        assert!(!re.is_match("axbbbc"));
    }

    #[test]
    fn top_level_is_match_matches_regex_method() {
        assert_eq!(is_match("a|b", "zzz").unwrap(), false);
        assert_eq!(is_match("a|b", "zab").unwrap(), true);
    }

    #[test]
    fn top_level_is_match_propagates_compile_errors() {
        assert!(is_match("[b", "text").is_err());
    }
}
