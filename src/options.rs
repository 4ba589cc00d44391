use bitflags::bitflags;

bitflags! {
    /// Construction-time switches that change how a compiled pattern
    /// matches. Unlike the teacher's inline `(?i)`-style flag groups, this
    /// grammar has no per-subtree flag scoping, so these apply uniformly
    /// to the whole pattern.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Options: u8 {
        /// Case-insensitive matching, applied via `charclass::case_fold_eq`.
        const CASE_INSENSITIVE = 0b001;
        /// `^` / `$` match at line boundaries, not just string boundaries.
        const MULTILINE = 0b010;
        /// `.` also matches `\n`.
        const DOT_MATCHES_LINE_SEPARATORS = 0b100;
    }
}
