//! The public façade: `Regex`, its `Match` record, and the four
//! enumerated operations (§6). Deliberately narrower than a production
//! engine's surface — no replace, no split — since those weren't part of
//! what this engine sets out to do.

use crate::compiler;
use crate::error::Error;
use crate::matcher::{Cursor, RawMatch};
use crate::nfa::Nfa;
use crate::optimizer::optimize;
use crate::options::Options;
use crate::parser::parse;

/// A compiled pattern. Immutable once built and safe to share for
/// concurrent read (§5): every call allocates its own cursor and scratch.
#[derive(Debug)]
pub struct Regex {
    pattern: String,
    nfa: Nfa,
    options: Options,
}

/// One match against an input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub full_match: String,
    /// One entry per capture group, in index order. A group that didn't
    /// participate in this match contributes an empty string.
    pub groups: Vec<String>,
    pub end_index: usize,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Regex::with_options(pattern, Options::empty())
    }

    pub fn with_options(pattern: &str, options: Options) -> Result<Regex, Error> {
        let (ast, is_from_start_of_string) = parse(pattern)?;
        let (ast, num_groups) = optimize(ast);
        let nfa = compiler::compile(pattern, &ast, num_groups, is_from_start_of_string)?;
        Ok(Regex {
            pattern: pattern.to_owned(),
            nfa,
            options,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn number_of_capture_groups(&self) -> u32 {
        self.nfa.num_groups
    }

    pub fn is_match(&self, text: &str) -> bool {
        let chars: Vec<char> = text.chars().collect();
        Cursor::new(&chars, &self.nfa, self.options)
            .next_match()
            .is_some()
    }

    pub fn first_match(&self, text: &str) -> Option<Match> {
        let chars: Vec<char> = text.chars().collect();
        Cursor::new(&chars, &self.nfa, self.options)
            .next_match()
            .map(|raw| to_match(&chars, &raw, self.nfa.num_groups))
    }

    pub fn matches(&self, text: &str) -> Vec<Match> {
        let chars: Vec<char> = text.chars().collect();
        let mut cursor = Cursor::new(&chars, &self.nfa, self.options);
        let mut out = Vec::new();
        while let Some(raw) = cursor.next_match() {
            out.push(to_match(&chars, &raw, self.nfa.num_groups));
        }
        out
    }
}

fn to_match(chars: &[char], raw: &RawMatch, num_groups: u32) -> Match {
    let full_match: String = chars[raw.start..raw.end].iter().collect();
    let groups = (1..=num_groups)
        .map(|i| match raw.groups.get(i as usize).copied().flatten() {
            Some((start, end)) => chars[start..end].iter().collect(),
            None => String::new(),
        })
        .collect();
    Match {
        full_match,
        groups,
        end_index: raw.end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternation_yields_two_matches() {
        let re = Regex::new("a|b").unwrap();
        let matches = re.matches("ab");
        let texts: Vec<&str> = matches.iter().map(|m| m.full_match.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn capturing_groups_in_order() {
        let re = Regex::new(r"(\w+)\s+(car)").unwrap();
        let matches = re.matches("Green car red car");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].groups, vec!["red".to_owned(), "car".to_owned()]);
    }

    #[test]
    fn backreference_matches_doubled_letters() {
        let re = Regex::new(r"(\w)\1").unwrap();
        let matches = re.matches("trellis seerlatter summer");
        let texts: Vec<&str> = matches.iter().map(|m| m.full_match.as_str()).collect();
        assert_eq!(texts, vec!["ll", "ee", "tt", "mm"]);
    }

    #[test]
    fn anchored_alternation_hex_color() {
        let re = Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").unwrap();
        assert!(re.is_match("#1AFFa1"));
        assert!(!re.is_match("#afaf"));
    }

    #[test]
    fn linear_time_on_pathological_backtracking_shape() {
        let re = Regex::new("a*c").unwrap();
        let input = "a".repeat(10_000) + "b";
        assert!(re.matches(&input).is_empty());
    }

    #[test]
    fn word_boundary_anchors() {
        let re = Regex::new(r"\bab\b").unwrap();
        assert!(re.is_match("a ab"));
        assert!(!re.is_match("aab"));
    }

    #[test]
    fn nested_capture_order() {
        let re = Regex::new(r"(a(b)c)").unwrap();
        let matches = re.matches("abc");
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].groups,
            vec!["abc".to_owned(), "a".to_owned(), "b".to_owned()]
        );
    }

    #[test]
    fn greedy_star_then_trailing_empty_match() {
        let re = Regex::new("a*").unwrap();
        let matches = re.matches("aaaa");
        let texts: Vec<&str> = matches.iter().map(|m| m.full_match.as_str()).collect();
        assert_eq!(texts, vec!["aaaa", ""]);
    }

    #[test]
    fn lazy_star_matches_all_empty() {
        let re = Regex::new("a*?").unwrap();
        let matches = re.matches("aaaa");
        assert_eq!(matches.len(), 5);
        assert!(matches.iter().all(|m| m.full_match.is_empty()));
    }

    #[test]
    fn bounded_range_quantifier_greedy_vs_lazy() {
        let greedy = Regex::new("a{1,3}").unwrap();
        let texts: Vec<String> = greedy
            .matches("aaaa")
            .into_iter()
            .map(|m| m.full_match)
            .collect();
        assert_eq!(texts, vec!["aaa".to_owned(), "a".to_owned()]);

        let lazy = Regex::new("a{1,3}?").unwrap();
        let texts: Vec<String> = lazy
            .matches("aaaa")
            .into_iter()
            .map(|m| m.full_match)
            .collect();
        assert_eq!(texts, vec!["a", "a", "a", "a"]);
    }

    #[test]
    fn is_match_agrees_with_matches_non_empty() {
        let re = Regex::new(r"(\w)\1").unwrap();
        let text = "trellis";
        assert_eq!(re.is_match(text), !re.matches(text).is_empty());
    }

    #[test]
    fn first_match_is_first_of_matches() {
        let re = Regex::new("a|b").unwrap();
        assert_eq!(re.first_match("ab"), re.matches("ab").into_iter().next());
    }

    #[test]
    fn invalid_backreference_is_a_semantic_error() {
        let err = Regex::new(r"\5").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Semantic);
    }
}
