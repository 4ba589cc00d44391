//! Static scalar-range tables backing the ASCII-flavored Perl classes.
//!
//! Taken from the same convention the teacher used: ranges are kept in
//! ascending order and merged where adjacent. Each table has at most a
//! handful of ranges, so `CharSet::contains` just scans them linearly —
//! not worth a binary search.

pub static PERL_DIGIT: &[(char, char)] = &[('0', '9')];

pub static PERL_SPACE: &[(char, char)] = &[
    ('\t', '\t'),
    ('\n', '\n'),
    ('\x0B', '\x0C'),
    ('\r', '\r'),
    (' ', ' '),
];

pub static PERL_WORD: &[(char, char)] = &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')];
