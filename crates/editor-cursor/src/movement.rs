//! Stateless cursor movement over any coordinate space.
//!
//! Every function works against a [`LineSource`], so the same code moves the cursor in model
//! space (the raw document) and in view space (wrapped lines).
//!
//! Visible columns are 0-based cell offsets from the line start: each character advances by one
//! cell, and a tab advances to the next multiple of `tab_size`. All arithmetic is exact integer
//! arithmetic. Horizontal steps never stop between the halves of a surrogate pair.

use crate::model::LineSource;
use crate::position::{Position, Selection, char_at_column, char_before_column, text_before_column};

/// A `(line, column)` target with the visible-column remainder carried over from a vertical move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// Target line.
    pub line: usize,
    /// Target column.
    pub column: usize,
    /// Visible columns the target could not reach; carried into the next vertical move.
    pub leftover_visible_columns: usize,
}

impl MoveResult {
    fn at(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            leftover_visible_columns: 0,
        }
    }

    /// The target as a position.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Result of a rectangular (column) selection in view space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewColumnSelectResult {
    /// One selection per covered line, in the order lines were visited.
    pub view_selections: Vec<Selection>,
    /// `true` if the block was dragged upwards (`to` line precedes `from` line).
    pub reversed: bool,
    /// View line of the moving corner.
    pub to_line: usize,
    /// Visible column of the moving corner.
    pub to_visual_column: usize,
}

/// The next tab stop strictly after `visible_column`.
pub fn next_tab_column(visible_column: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    visible_column + tab_size - visible_column % tab_size
}

/// The previous tab stop strictly before `visible_column` (or `0`).
pub fn prev_tab_column(visible_column: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    match visible_column.checked_sub(1) {
        Some(c) => c - c % tab_size,
        None => 0,
    }
}

/// Visible column of `column` (1-based) on `line_content`.
pub fn visible_column_from_column(line_content: &str, column: usize, tab_size: usize) -> usize {
    text_before_column(line_content, column)
        .chars()
        .fold(0, |visible, ch| advance(visible, ch, tab_size))
}

/// Column (1-based) closest to `visible_column` on `line_content`.
///
/// When `visible_column` falls inside a tab, the nearer edge wins and ties go to the left edge.
/// Past the end of the line, the line's last column is returned.
pub fn column_from_visible_column(line_content: &str, visible_column: usize, tab_size: usize) -> usize {
    let mut before = 0;
    let mut column = 1;
    for ch in line_content.chars() {
        let after = advance(before, ch, tab_size);
        if after > visible_column {
            let before_delta = visible_column - before;
            let after_delta = after - visible_column;
            return if after_delta < before_delta {
                column + ch.len_utf16()
            } else {
                column
            };
        }
        before = after;
        column += ch.len_utf16();
    }
    column
}

fn advance(visible: usize, ch: char, tab_size: usize) -> usize {
    if ch == '\t' {
        next_tab_column(visible, tab_size)
    } else {
        visible + 1
    }
}

/// [`visible_column_from_column`] for a line of `model`.
pub fn visible_column_at<M: LineSource + ?Sized>(model: &M, position: Position, tab_size: usize) -> usize {
    visible_column_from_column(&model.line_content(position.line), position.column, tab_size)
}

/// [`column_from_visible_column`] for a line of `model`, clamped to the line's column bounds.
pub fn column_from_visible_column_clamped<M: LineSource + ?Sized>(
    model: &M,
    line: usize,
    visible_column: usize,
    tab_size: usize,
) -> usize {
    let column = column_from_visible_column(&model.line_content(line), visible_column, tab_size);
    column.clamp(model.line_min_column(line), model.line_max_column(line))
}

/// One character to the left, wrapping to the end of the previous line.
pub fn left_of<M: LineSource + ?Sized>(model: &M, line: usize, column: usize) -> Position {
    let min_column = model.line_min_column(line);
    if column > min_column {
        let step = char_before_column(&model.line_content(line), column).map_or(1, char::len_utf16);
        Position::new(line, column.saturating_sub(step).max(min_column))
    } else if line > 1 {
        Position::new(line - 1, model.line_max_column(line - 1))
    } else {
        Position::new(line, column)
    }
}

/// One character to the right, wrapping to the start of the next line.
pub fn right_of<M: LineSource + ?Sized>(model: &M, line: usize, column: usize) -> Position {
    let max_column = model.line_max_column(line);
    if column < max_column {
        let step = char_at_column(&model.line_content(line), column).map_or(1, char::len_utf16);
        Position::new(line, (column + step).min(max_column))
    } else if line < model.line_count() {
        Position::new(line + 1, model.line_min_column(line + 1))
    } else {
        Position::new(line, column)
    }
}

/// Move `count` lines up, keeping the visible column.
///
/// With `allow_move_on_first_line`, moving up from the first line goes to its first column.
pub fn position_up<M: LineSource + ?Sized>(
    model: &M,
    tab_size: usize,
    line: usize,
    column: usize,
    leftover_visible_columns: usize,
    count: usize,
    allow_move_on_first_line: bool,
) -> MoveResult {
    let current_visible =
        visible_column_at(model, Position::new(line, column), tab_size) + leftover_visible_columns;

    let (target_line, target_column) = match line.checked_sub(count).filter(|&l| l >= 1) {
        Some(target) => (
            target,
            column_from_visible_column_clamped(model, target, current_visible, tab_size),
        ),
        None if allow_move_on_first_line => (1, model.line_min_column(1)),
        None => (1, column.min(model.line_max_column(1))),
    };

    finish_vertical(model, tab_size, target_line, target_column, current_visible)
}

/// Move `count` lines down, keeping the visible column.
///
/// With `allow_move_on_last_line`, moving down from the last line goes to its last column.
pub fn position_down<M: LineSource + ?Sized>(
    model: &M,
    tab_size: usize,
    line: usize,
    column: usize,
    leftover_visible_columns: usize,
    count: usize,
    allow_move_on_last_line: bool,
) -> MoveResult {
    let current_visible =
        visible_column_at(model, Position::new(line, column), tab_size) + leftover_visible_columns;
    let line_count = model.line_count();

    let target = line.saturating_add(count);
    let (target_line, target_column) = if target > line_count {
        if allow_move_on_last_line {
            (line_count, model.line_max_column(line_count))
        } else {
            (line_count, column.min(model.line_max_column(line_count)))
        }
    } else {
        (
            target,
            column_from_visible_column_clamped(model, target, current_visible, tab_size),
        )
    };

    finish_vertical(model, tab_size, target_line, target_column, current_visible)
}

fn finish_vertical<M: LineSource + ?Sized>(
    model: &M,
    tab_size: usize,
    line: usize,
    column: usize,
    wanted_visible: usize,
) -> MoveResult {
    let reached = visible_column_at(model, Position::new(line, column), tab_size);
    MoveResult {
        line,
        column,
        leftover_visible_columns: wanted_visible.saturating_sub(reached),
    }
}

/// Home: toggles between the first non-whitespace column and the line start.
pub fn column_at_beginning_of_line<M: LineSource + ?Sized>(model: &M, line: usize, column: usize) -> usize {
    let min_column = model.line_min_column(line);
    let first_non_blank = match model.line_first_non_whitespace_column(line) {
        0 => min_column,
        c => c,
    };
    if column != min_column && column <= first_non_blank {
        min_column
    } else {
        first_non_blank
    }
}

/// End: toggles between the last non-whitespace column and the line end.
pub fn column_at_end_of_line<M: LineSource + ?Sized>(model: &M, line: usize, column: usize) -> usize {
    let max_column = model.line_max_column(line);
    let last_non_blank = match model.line_last_non_whitespace_column(line) {
        0 => max_column,
        c => c,
    };
    if column != max_column && column >= last_non_blank {
        max_column
    } else {
        last_non_blank
    }
}

/// Build one selection per line between `from_line` and `to_line`, spanning the visible
/// columns `from_visible_column..to_visible_column` clamped to each line.
///
/// Lines that do not reach into the block are skipped.
pub fn column_select<M: LineSource + ?Sized>(
    model: &M,
    tab_size: usize,
    from_line: usize,
    from_visible_column: usize,
    to_line: usize,
    to_visible_column: usize,
) -> ViewColumnSelectResult {
    let line_count = from_line.abs_diff(to_line) + 1;
    let reversed = from_line > to_line;
    let is_rtl = from_visible_column > to_visible_column;
    let is_ltr = from_visible_column < to_visible_column;

    let mut view_selections = Vec::with_capacity(line_count);
    for i in 0..line_count {
        let line = if reversed { from_line - i } else { from_line + i };

        let start_column =
            column_from_visible_column_clamped(model, line, from_visible_column, tab_size);
        let end_column = column_from_visible_column_clamped(model, line, to_visible_column, tab_size);
        let visible_start = visible_column_at(model, Position::new(line, start_column), tab_size);
        let visible_end = visible_column_at(model, Position::new(line, end_column), tab_size);

        if is_ltr && (visible_start > to_visible_column || visible_end < from_visible_column) {
            continue;
        }
        if is_rtl && (visible_end > from_visible_column || visible_start < to_visible_column) {
            continue;
        }

        view_selections.push(Selection::new(line, start_column, line, end_column));
    }

    ViewColumnSelectResult {
        view_selections,
        reversed,
        to_line,
        to_visual_column: to_visible_column,
    }
}

/// Column `count` characters to the left on the same line, clamped to the line start.
pub fn columns_left<M: LineSource + ?Sized>(model: &M, line: usize, column: usize, count: usize) -> MoveResult {
    let content = model.line_content(line);
    let min_column = model.line_min_column(line);
    let mut column = column;
    for _ in 0..count {
        if column <= min_column {
            break;
        }
        let step = char_before_column(&content, column).map_or(1, char::len_utf16);
        column = column.saturating_sub(step).max(min_column);
    }
    MoveResult::at(line, column)
}

/// Column `count` characters to the right on the same line, clamped to the line end.
pub fn columns_right<M: LineSource + ?Sized>(model: &M, line: usize, column: usize, count: usize) -> MoveResult {
    let content = model.line_content(line);
    let max_column = model.line_max_column(line);
    let mut column = column;
    for _ in 0..count {
        if column >= max_column {
            break;
        }
        let step = char_at_column(&content, column).map_or(1, char::len_utf16);
        column = (column + step).min(max_column);
    }
    MoveResult::at(line, column)
}
