//! Source location tracking for diagnostics.
//!
//! Provides [`Span`] to record where a declaration or reference appears.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// Diagnostics are reported as `line:col`; the length is kept so callers
/// can underline the offending text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is the default "unknown location" span.
    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }

    /// Whether this span covers no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend this span to the end of `other` when both are on the same line.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        if self.line == other.line && other.col >= self.col {
            Span {
                line: self.line,
                col: self.col,
                len: (other.col + other.len) - self.col,
            }
        } else {
            self
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_display() {
        let span = Span::new(3, 15, 5);
        assert_eq!(format!("{}", span), "3:15");
        assert_eq!(format!("{:?}", span), "3:15");
    }

    #[test]
    fn default_span_is_unknown() {
        assert!(Span::default().is_unknown());
        assert!(!Span::point(1, 1).is_unknown());
        assert!(Span::point(1, 1).is_empty());
    }

    #[test]
    fn span_to_same_line() {
        let start = Span::new(2, 5, 3);
        let end = Span::new(2, 12, 4);
        let joined = start.to(end);
        assert_eq!(joined.col, 5);
        assert_eq!(joined.len, 11);
    }

    #[test]
    fn span_to_other_line_keeps_start() {
        let start = Span::new(2, 5, 3);
        let end = Span::new(4, 1, 4);
        assert_eq!(start.to(end), start);
    }
}
