//! Property tests adapted from the teacher's `no_crashing_*` checks:
//! construction and matching must never panic, whatever garbage the
//! pattern or input text contains.

use rex::Regex;

#[test]
fn construction_never_panics_on_arbitrary_ascii() {
    let _ = env_logger::try_init();
    fn prop(s: String) -> bool {
        let _ = Regex::new(&s);
        true
    }
    quickcheck::quickcheck(prop as fn(String) -> bool);
}

#[test]
fn construction_never_panics_on_arbitrary_chars() {
    fn prop(cs: Vec<char>) -> bool {
        let s: String = cs.into_iter().collect();
        let _ = Regex::new(&s);
        true
    }
    quickcheck::quickcheck(prop as fn(Vec<char>) -> bool);
}

#[test]
fn matching_never_panics_on_arbitrary_input() {
    fn prop(text: String) -> bool {
        const PATTERNS: &[&str] = &[
            "a*",
            "(a|b)+",
            r"(\w)\1",
            r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$",
            r"\bab\b",
            "a*?",
        ];
        for pattern in PATTERNS {
            if let Ok(re) = Regex::new(pattern) {
                let _ = re.matches(&text);
            }
        }
        true
    }
    quickcheck::quickcheck(prop as fn(String) -> bool);
}
