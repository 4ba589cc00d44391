use std::fmt;

use thiserror::Error as ThisError;

/// Category of a pattern-construction failure.
///
/// All three arise only while compiling a pattern; the matcher itself never
/// fails (it either yields matches or an empty sequence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pattern text does not conform to the grammar.
    Syntax,
    /// The pattern uses a feature this engine does not implement.
    Unsupported,
    /// The pattern parses but fails a post-parse semantic check
    /// (e.g. a backreference to a group that doesn't exist).
    Semantic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Semantic => "semantic",
        };
        f.write_str(s)
    }
}

/// Something that went wrong while parsing or compiling a pattern.
///
/// Once a pattern is compiled, it is not possible to produce an error by
/// matching against it.
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
#[error("{kind} error in pattern '{pattern}' at position {index_in_pattern}: {message}")]
pub struct Error {
    pub message: String,
    pub index_in_pattern: usize,
    pub pattern: String,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(
        kind: ErrorKind,
        pattern: &str,
        index_in_pattern: usize,
        message: impl Into<String>,
    ) -> Error {
        Error {
            message: message.into(),
            index_in_pattern,
            pattern: pattern.to_owned(),
            kind,
        }
    }

    pub fn syntax(pattern: &str, index_in_pattern: usize, message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Syntax, pattern, index_in_pattern, message)
    }

    pub fn semantic(pattern: &str, index_in_pattern: usize, message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Semantic, pattern, index_in_pattern, message)
    }
}
