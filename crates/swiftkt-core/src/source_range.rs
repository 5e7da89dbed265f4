// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source location tracking.
//!
//! Every AST node may carry a [`SourceRange`] indicating its position in the
//! Swift source file. Ranges feed two consumers: diagnostics, and the output
//! line-map that projects Kotlin positions back onto Swift positions.
//!
//! Unlike byte-offset spans, ranges here are line/column pairs because the
//! line-map format is line/column based end to end.

use std::fmt;

/// A position in a source file, 1-indexed on both axes.
///
/// # Examples
///
/// ```
/// use swiftkt_core::source_range::SourcePosition;
///
/// let start = SourcePosition::new(1, 1);
/// let after = start.advanced_by("val x\n= 1");
/// assert_eq!(after, SourcePosition::new(2, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
}

impl SourcePosition {
    /// Creates a position from 1-indexed line and column.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The start of a file.
    #[must_use]
    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Returns the position after emitting `text` from this position.
    ///
    /// Each `\n` advances the line and resets the column to 1; every other
    /// character advances the column by one.
    #[must_use]
    pub fn advanced_by(mut self, text: &str) -> Self {
        for character in text.chars() {
            if character == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open region of source code, `(line_start, col_start)` up to but not
/// including `(line_end, col_end)`, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    /// 1-indexed first line of the range.
    pub line_start: u32,
    /// 1-indexed first column of the range.
    pub column_start: u32,
    /// 1-indexed line of the exclusive end position.
    pub line_end: u32,
    /// 1-indexed column of the exclusive end position.
    pub column_end: u32,
}

impl SourceRange {
    /// Creates a new range from 1-indexed start and end coordinates.
    #[must_use]
    pub const fn new(line_start: u32, column_start: u32, line_end: u32, column_end: u32) -> Self {
        Self {
            line_start,
            column_start,
            line_end,
            column_end,
        }
    }

    /// The start position of the range.
    #[must_use]
    pub const fn start(self) -> SourcePosition {
        SourcePosition::new(self.line_start, self.column_start)
    }

    /// The exclusive end position of the range.
    #[must_use]
    pub const fn end(self) -> SourcePosition {
        SourcePosition::new(self.line_end, self.column_end)
    }

    /// Returns true if `other` starts and ends within `self`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        let starts_after = (other.line_start, other.column_start) >= (self.line_start, self.column_start);
        let ends_before = (other.line_end, other.column_end) <= (self.line_end, self.column_end);
        starts_after && ends_before
    }

    /// Creates a range that covers both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let (line_start, column_start) = (self.line_start, self.column_start)
            .min((other.line_start, other.column_start));
        let (line_end, column_end) =
            (self.line_end, self.column_end).max((other.line_end, other.column_end));
        Self {
            line_start,
            column_start,
            line_end,
            column_end,
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}..{}:{}",
            self.line_start, self.column_start, self.line_end, self.column_end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_advance_plain_text() {
        let position = SourcePosition::start().advanced_by("val x");
        assert_eq!(position, SourcePosition::new(1, 6));
    }

    #[test]
    fn position_advance_newlines() {
        let position = SourcePosition::start().advanced_by("a\nbc\n");
        assert_eq!(position, SourcePosition::new(3, 1));
    }

    #[test]
    fn position_advance_empty_string_is_identity() {
        let position = SourcePosition::new(7, 3);
        assert_eq!(position.advanced_by(""), position);
    }

    #[test]
    fn range_contains() {
        let outer = SourceRange::new(1, 1, 5, 10);
        let inner = SourceRange::new(2, 3, 4, 1);
        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
    }

    #[test]
    fn range_contains_same_line_ordering() {
        let outer = SourceRange::new(2, 5, 2, 20);
        let inner = SourceRange::new(2, 6, 2, 19);
        assert!(outer.contains(inner));
        assert!(!outer.contains(SourceRange::new(2, 4, 2, 10)));
    }

    #[test]
    fn range_merge() {
        let a = SourceRange::new(1, 5, 2, 3);
        let b = SourceRange::new(2, 1, 4, 8);
        assert_eq!(a.merge(b), SourceRange::new(1, 5, 4, 8));
    }

    #[test]
    fn range_display() {
        let range = SourceRange::new(3, 1, 3, 12);
        assert_eq!(range.to_string(), "3:1..3:12");
    }
}
