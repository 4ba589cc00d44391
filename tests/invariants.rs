//! Universal invariants and error scenarios from §8, as end-to-end tests
//! against the public façade rather than internal modules.

use rex::{ErrorKind, Regex};

#[test]
fn is_match_agrees_with_matches_emptiness() {
    let cases: &[(&str, &str)] = &[
        ("a|b", "ab"),
        ("a|b", "zzz"),
        (r"(\w)\1", "trellis"),
        ("a*c", "aaab"),
    ];
    for &(pattern, text) in cases {
        let re = Regex::new(pattern).unwrap();
        assert_eq!(re.is_match(text), !re.matches(text).is_empty(), "{pattern:?} vs {text:?}");
    }
}

#[test]
fn first_match_matches_head_of_matches() {
    let re = Regex::new(r"(\w+)\s+(car)").unwrap();
    let text = "Green car red car";
    assert_eq!(re.first_match(text), re.matches(text).into_iter().next());
}

#[test]
fn matches_are_non_overlapping_and_increasing() {
    let re = Regex::new("a*").unwrap();
    let matches = re.matches("abaabaccadaaae");
    let mut prev_end = 0;
    for m in &matches {
        assert!(m.end_index >= prev_end);
        prev_end = m.end_index;
    }
}

#[test]
fn every_match_reports_all_capture_groups() {
    let re = Regex::new(r"(a)(b)?").unwrap();
    for m in re.matches("a ab") {
        assert_eq!(m.groups.len() as u32, re.number_of_capture_groups());
    }
}

#[test]
fn determinism_across_runs() {
    let re = Regex::new(r"(\w+)\s+(car)").unwrap();
    let text = "Green car red car";
    assert_eq!(re.matches(text), re.matches(text));
}

#[test]
fn dot_excludes_newline_unless_requested() {
    let re = Regex::new(".").unwrap();
    assert!(!re.is_match("\n"));

    let re = Regex::with_options(".", rex::Options::DOT_MATCHES_LINE_SEPARATORS).unwrap();
    assert!(re.is_match("\n"));
}

#[test]
fn character_group_equals_alternation_for_is_match() {
    let group = Regex::new("[abc]").unwrap();
    let alternation = Regex::new("a|b|c").unwrap();
    for text in ["a", "b", "c", "d", ""] {
        assert_eq!(group.is_match(text), alternation.is_match(text), "text={text:?}");
    }
}

#[test]
fn counted_repetition_matches_concatenated_literal() {
    let counted = Regex::new("a{3}").unwrap();
    let literal = Regex::new("aaa").unwrap();
    for text in ["aaa", "aa", "aaaa", "b"] {
        assert_eq!(counted.is_match(text), literal.is_match(text), "text={text:?}");
    }
}

#[test]
fn unclosed_character_group_reports_exact_message_and_index() {
    let err = Regex::new("[b").unwrap_err();
    assert_eq!(err.message, "Character group missing closing bracket");
    assert_eq!(err.index_in_pattern, 0);
}

#[test]
fn unclosed_counted_repetition_reports_exact_message_and_index() {
    let err = Regex::new("a{3").unwrap_err();
    assert_eq!(err.message, "Range quantifier missing closing bracket");
    assert_eq!(err.index_in_pattern, 1);
}

#[test]
fn leading_quantifier_is_rejected() {
    let err = Regex::new("*").unwrap_err();
    assert_eq!(err.message, "The preceding token is not quantifiable");
}

#[test]
fn unmatched_opening_paren_is_rejected() {
    let err = Regex::new("(").unwrap_err();
    assert_eq!(err.message, "Unmatched opening parentheses");
}

#[test]
fn unmatched_closing_paren_is_rejected() {
    let err = Regex::new("a)").unwrap_err();
    assert_eq!(err.message, "Unmatched closing parentheses");
}

#[test]
fn trailing_backslash_is_rejected() {
    let err = Regex::new("\\").unwrap_err();
    assert_eq!(err.message, "Pattern may not end with a trailing backslash");
}

#[test]
fn all_error_scenarios_are_syntax_or_semantic() {
    for pattern in ["[b", "a{3", "*", "(", "a)", "\\"] {
        let err = Regex::new(pattern).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }
}
