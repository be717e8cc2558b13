//! Positions, ranges and selections.
//!
//! All coordinates are 1-based. Columns count UTF-16 code units, not visual width: a character
//! outside the Basic Multilingual Plane occupies two columns, and a line of `len` code units
//! has columns `1..=len + 1`. The helpers at the bottom of this module map columns onto Rust
//! string slices.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A `(line, column)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// One-based line number.
    pub line: usize,
    /// One-based column, in UTF-16 code units.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// `true` if `self` comes strictly before `other`.
    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }

    /// `true` if `self` comes before or is equal to `other`.
    pub fn is_before_or_equal(&self, other: &Position) -> bool {
        self <= other
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// A direction-agnostic range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start line.
    pub start_line: usize,
    /// Start column.
    pub start_column: usize,
    /// End line.
    pub end_line: usize,
    /// End column.
    pub end_column: usize,
}

impl Range {
    /// Create a range; the two ends are swapped if given in reverse order.
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self::from_positions(
            Position::new(start_line, start_column),
            Position::new(end_line, end_column),
        )
    }

    /// Create a range spanning two positions, in either order.
    pub fn from_positions(a: Position, b: Position) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
        }
    }

    /// An empty range at `position`.
    pub fn collapsed(position: Position) -> Self {
        Self::from_positions(position, position)
    }

    /// Start position.
    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_column)
    }

    /// End position.
    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_column)
    }

    /// `true` if start equals end.
    pub fn is_empty(&self) -> bool {
        self.start_line == self.end_line && self.start_column == self.end_column
    }

    /// `true` if `position` lies inside the range, edges included.
    pub fn contains_position(&self, position: Position) -> bool {
        self.start() <= position && position <= self.end()
    }

    /// `true` if `other` lies fully inside the range.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains_position(other.start()) && self.contains_position(other.end())
    }

    /// The smallest range covering both `self` and `other`.
    pub fn plus_range(&self, other: &Range) -> Range {
        Range::from_positions(self.start().min(other.start()), self.end().max(other.end()))
    }

    /// An empty range at the start.
    pub fn collapse_to_start(&self) -> Range {
        Range::collapsed(self.start())
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} -> {},{}]",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

/// Selection direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionDirection {
    /// The anchor precedes (or equals) the active end.
    Ltr,
    /// The active end precedes the anchor.
    Rtl,
}

/// A range with an anchor (`selection_start`) and an active end (`position`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Anchor line.
    pub selection_start_line: usize,
    /// Anchor column.
    pub selection_start_column: usize,
    /// Active line.
    pub position_line: usize,
    /// Active column.
    pub position_column: usize,
}

impl Selection {
    /// Create a selection from anchor and active coordinates.
    pub const fn new(
        selection_start_line: usize,
        selection_start_column: usize,
        position_line: usize,
        position_column: usize,
    ) -> Self {
        Self {
            selection_start_line,
            selection_start_column,
            position_line,
            position_column,
        }
    }

    /// Create a selection from an anchor and an active position.
    pub fn from_positions(anchor: Position, active: Position) -> Self {
        Self::new(anchor.line, anchor.column, active.line, active.column)
    }

    /// An empty selection at `position`.
    pub fn collapsed(position: Position) -> Self {
        Self::from_positions(position, position)
    }

    /// Build a selection covering `range` in the given direction.
    pub fn from_range(range: Range, direction: SelectionDirection) -> Self {
        match direction {
            SelectionDirection::Ltr => Self::from_positions(range.start(), range.end()),
            SelectionDirection::Rtl => Self::from_positions(range.end(), range.start()),
        }
    }

    /// The anchor end.
    pub fn anchor(&self) -> Position {
        Position::new(self.selection_start_line, self.selection_start_column)
    }

    /// The active end (the cursor position).
    pub fn active(&self) -> Position {
        Position::new(self.position_line, self.position_column)
    }

    /// The direction.
    pub fn direction(&self) -> SelectionDirection {
        if self.anchor() <= self.active() {
            SelectionDirection::Ltr
        } else {
            SelectionDirection::Rtl
        }
    }

    /// The visual start (the smaller end).
    pub fn start(&self) -> Position {
        self.anchor().min(self.active())
    }

    /// The visual end (the larger end).
    pub fn end(&self) -> Position {
        self.anchor().max(self.active())
    }

    /// The covered range.
    pub fn to_range(&self) -> Range {
        Range::from_positions(self.anchor(), self.active())
    }

    /// `true` if anchor equals active.
    pub fn is_empty(&self) -> bool {
        self.anchor() == self.active()
    }

    /// `true` if the covered range equals `range`, regardless of direction.
    pub fn equals_range(&self, range: &Range) -> bool {
        self.to_range() == *range
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} -> {},{}]",
            self.selection_start_line,
            self.selection_start_column,
            self.position_line,
            self.position_column
        )
    }
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte index of the 1-based `column` in `line`.
///
/// Columns past the end clamp to `line.len()`. A column that falls between the two halves of a
/// surrogate pair maps to the start of the pair.
pub fn byte_index_at_column(line: &str, column: usize) -> usize {
    let target = column.saturating_sub(1);
    let mut units = 0;
    for (index, ch) in line.char_indices() {
        let next = units + ch.len_utf16();
        if next > target {
            return index;
        }
        units = next;
    }
    line.len()
}

/// The 1-based column of `byte_index` in `line`. `byte_index` must be a char boundary.
pub fn column_at_byte_index(line: &str, byte_index: usize) -> usize {
    utf16_len(&line[..byte_index.min(line.len())]) + 1
}

/// `true` if `column` splits a surrogate pair on `line`.
pub fn is_inside_surrogate_pair(line: &str, column: usize) -> bool {
    column_at_byte_index(line, byte_index_at_column(line, column)) != column
        && column <= utf16_len(line) + 1
}

/// The part of `line` before `column`.
pub fn text_before_column(line: &str, column: usize) -> &str {
    &line[..byte_index_at_column(line, column)]
}

/// The part of `line` from `column` on.
pub fn text_from_column(line: &str, column: usize) -> &str {
    &line[byte_index_at_column(line, column)..]
}

/// The part of `line` between two columns.
pub fn text_between_columns(line: &str, start_column: usize, end_column: usize) -> &str {
    let start = byte_index_at_column(line, start_column);
    let end = byte_index_at_column(line, end_column).max(start);
    &line[start..end]
}

/// The character starting at `column`.
pub fn char_at_column(line: &str, column: usize) -> Option<char> {
    text_from_column(line, column).chars().next()
}

/// The character ending at `column`.
pub fn char_before_column(line: &str, column: usize) -> Option<char> {
    text_before_column(line, column).chars().next_back()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalizes_reverse_input() {
        let r = Range::new(3, 4, 1, 2);
        assert_eq!(r.start(), Position::new(1, 2));
        assert_eq!(r.end(), Position::new(3, 4));
        assert!(!r.is_empty());
        assert!(r.contains_position(Position::new(2, 100)));
        assert!(!r.contains_position(Position::new(3, 5)));
    }

    #[test]
    fn test_selection_direction_and_edges() {
        let s = Selection::new(2, 5, 1, 3);
        assert_eq!(s.direction(), SelectionDirection::Rtl);
        assert_eq!(s.start(), Position::new(1, 3));
        assert_eq!(s.end(), Position::new(2, 5));
        assert_eq!(s.anchor(), Position::new(2, 5));
        assert_eq!(s.active(), Position::new(1, 3));
        assert!(s.equals_range(&Range::new(1, 3, 2, 5)));

        let back = Selection::from_range(s.to_range(), SelectionDirection::Rtl);
        assert_eq!(back, s);
    }

    #[test]
    fn test_plus_range() {
        let a = Range::new(1, 5, 1, 8);
        let b = Range::new(2, 1, 2, 2);
        assert_eq!(a.plus_range(&b), Range::new(1, 5, 2, 2));
    }

    #[test]
    fn test_columns_count_utf16_code_units() {
        let line = "a😀b";
        assert_eq!(utf16_len(line), 4);
        assert_eq!(byte_index_at_column(line, 1), 0);
        assert_eq!(byte_index_at_column(line, 2), 1);
        // Column 3 splits the emoji and snaps back to its start.
        assert_eq!(byte_index_at_column(line, 3), 1);
        assert_eq!(byte_index_at_column(line, 4), 5);
        assert_eq!(byte_index_at_column(line, 10), line.len());
        assert_eq!(column_at_byte_index(line, 5), 4);

        assert!(is_inside_surrogate_pair(line, 3));
        assert!(!is_inside_surrogate_pair(line, 4));
        assert!(!is_inside_surrogate_pair(line, 9));

        assert_eq!(char_at_column(line, 2), Some('😀'));
        assert_eq!(char_before_column(line, 4), Some('😀'));
        assert_eq!(text_before_column(line, 4), "a😀");
        assert_eq!(text_from_column(line, 4), "b");
        assert_eq!(text_between_columns(line, 2, 5), "😀b");
    }
}
