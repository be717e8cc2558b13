//! Cursor movement and selection operations.

use super::{CursorChangeReason, MoveTarget, MoveUnit, OperationContext, OperationResult, ParsedMove};
use crate::cursor::{CursorHost, CursorModelState, OneCursor};
use crate::model::{DocumentModel, LineSource};
use crate::movement::{self, MoveResult};
use crate::position::{Position, Range};
use crate::words::{FindWordResult, WordNavigationType, WordType};

pub(super) fn move_to(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    position: Position,
    view_position: Option<Position>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let view_position = resolve_view_position(host, position, view_position);
    ctx.cursor_change_reason = CursorChangeReason::Explicit;
    cursor.move_view_position(host, select, view_position.line, view_position.column, 0, false);
    OperationResult::Handled
}

fn resolve_view_position(host: &CursorHost<'_>, position: Position, view_position: Option<Position>) -> Position {
    let model = host.model();
    let position = model.validate_position(position);
    match view_position {
        Some(view_position) => host.view.validate_view_position(model, view_position, position),
        None => host.view.convert_model_position_to_view_position(model, position),
    }
}

pub(super) fn move_with_arguments(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    args: &ParsedMove,
    ctx: &mut OperationContext,
) -> OperationResult {
    let select = args.select;
    match args.to {
        MoveTarget::Left => {
            let count = horizontal_count(cursor, host, args);
            move_left(cursor, host, select, count, ctx)
        }
        MoveTarget::Right => {
            let count = horizontal_count(cursor, host, args);
            move_right(cursor, host, select, count, ctx)
        }
        MoveTarget::Up => match args.by {
            Some(MoveUnit::WrappedLine) => move_up_by_view_lines(cursor, host, select, args.value, ctx),
            _ => move_up_by_model_lines(cursor, host, select, args.value, ctx),
        },
        MoveTarget::Down => match args.by {
            Some(MoveUnit::WrappedLine) => move_down_by_view_lines(cursor, host, select, args.value, ctx),
            _ => move_down_by_model_lines(cursor, host, select, args.value, ctx),
        },
        MoveTarget::WrappedLineStart => move_in_view_line(cursor, host, select, |lines, line| {
            lines.line_min_column(line)
        }),
        MoveTarget::WrappedLineFirstNonWhitespaceCharacter => {
            move_in_view_line(cursor, host, select, |lines, line| {
                match lines.line_first_non_whitespace_column(line) {
                    0 => lines.line_min_column(line),
                    column => column,
                }
            })
        }
        MoveTarget::WrappedLineColumnCenter => move_in_view_line(cursor, host, select, |lines, line| {
            (lines.line_min_column(line) + lines.line_max_column(line)).div_ceil(2)
        }),
        MoveTarget::WrappedLineEnd => move_in_view_line(cursor, host, select, |lines, line| {
            lines.line_max_column(line)
        }),
        MoveTarget::WrappedLineLastNonWhitespaceCharacter => {
            move_in_view_line(cursor, host, select, |lines, line| {
                match lines.line_last_non_whitespace_column(line) {
                    0 => lines.line_max_column(line),
                    column => column,
                }
            })
        }
        MoveTarget::ViewPortTop => {
            let visible = host.view.completely_visible_model_lines(host.model());
            let line = (visible.start_line + args.value - 1).min(visible.end_line);
            move_to_model_line(cursor, host, select, line)
        }
        MoveTarget::ViewPortBottom => {
            let visible = host.view.completely_visible_model_lines(host.model());
            let line = visible
                .end_line
                .saturating_sub(args.value - 1)
                .max(visible.start_line);
            move_to_model_line(cursor, host, select, line)
        }
        MoveTarget::ViewPortCenter => {
            let visible = host.view.completely_visible_model_lines(host.model());
            let line = (visible.start_line + visible.end_line).div_ceil(2);
            move_to_model_line(cursor, host, select, line)
        }
        MoveTarget::ViewPortIfOutside => {
            let visible = host.view.completely_visible_model_lines(host.model());
            let line = cursor.position().line;
            if line < visible.start_line {
                move_to_model_line(cursor, host, select, visible.start_line)
            } else if line > visible.end_line {
                move_to_model_line(cursor, host, select, visible.end_line)
            } else {
                OperationResult::Handled
            }
        }
    }
}

fn horizontal_count(cursor: &OneCursor, host: &CursorHost<'_>, args: &ParsedMove) -> usize {
    match args.by {
        Some(MoveUnit::HalfLine) => {
            let line = cursor.view_position().line;
            let length = host.view.view_line_content(host.model(), line).chars().count();
            length.div_ceil(2).max(1)
        }
        _ => args.value,
    }
}

fn move_in_view_line(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    column_of: impl Fn(&dyn LineSource, usize) -> usize,
) -> OperationResult {
    let line = cursor.view_position().line;
    let column = column_of(&host.view_lines(), line);
    cursor.move_view_position(host, select, line, column, 0, true);
    OperationResult::Handled
}

fn move_to_model_line(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    line: usize,
) -> OperationResult {
    let model = host.model();
    let line = line.clamp(1, model.line_count());
    let column = match model.line_first_non_whitespace_column(line) {
        0 => model.line_min_column(line),
        column => column,
    };
    cursor.move_model_position(host, select, line, column, 0, true);
    OperationResult::Handled
}

pub(super) fn move_left(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    count: usize,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let view = *cursor.view_state();
    let target = if view.has_selection() && !select {
        view.selection.start()
    } else {
        let lines = host.view_lines();
        let stepped = movement::columns_left(&lines, view.position.line, view.position.column, count - 1);
        movement::left_of(&lines, stepped.line, stepped.column)
    };
    cursor.move_view_position(host, select, target.line, target.column, 0, true);
    OperationResult::Handled
}

pub(super) fn move_right(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    count: usize,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let view = *cursor.view_state();
    let target = if view.has_selection() && !select {
        view.selection.end()
    } else {
        let lines = host.view_lines();
        let stepped = movement::columns_right(&lines, view.position.line, view.position.column, count - 1);
        movement::right_of(&lines, stepped.line, stepped.column)
    };
    cursor.move_view_position(host, select, target.line, target.column, 0, true);
    OperationResult::Handled
}

fn vertical_origin(state: &CursorModelState, select: bool, up: bool) -> Position {
    if state.has_selection() && !select {
        if up {
            state.selection.start()
        } else {
            state.selection.end()
        }
    } else {
        state.position
    }
}

pub(super) fn move_up_by_view_lines(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    count: usize,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let view = *cursor.view_state();
    let from = vertical_origin(&view, select, true);
    let r = movement::position_up(
        &host.view_lines(),
        host.tab_size(),
        from.line,
        from.column,
        view.leftover_visible_columns,
        count,
        true,
    );
    cursor.move_view_position(host, select, r.line, r.column, r.leftover_visible_columns, true);
    OperationResult::Handled
}

pub(super) fn move_down_by_view_lines(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    count: usize,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let view = *cursor.view_state();
    let from = vertical_origin(&view, select, false);
    let r = movement::position_down(
        &host.view_lines(),
        host.tab_size(),
        from.line,
        from.column,
        view.leftover_visible_columns,
        count,
        true,
    );
    cursor.move_view_position(host, select, r.line, r.column, r.leftover_visible_columns, true);
    OperationResult::Handled
}

fn move_up_by_model_lines(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    count: usize,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let state = *cursor.model_state();
    let from = vertical_origin(&state, select, true);
    let r = movement::position_up(
        host.model(),
        host.tab_size(),
        from.line,
        from.column,
        state.leftover_visible_columns,
        count,
        true,
    );
    cursor.move_model_position(host, select, r.line, r.column, r.leftover_visible_columns, true);
    OperationResult::Handled
}

fn move_down_by_model_lines(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    count: usize,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let state = *cursor.model_state();
    let from = vertical_origin(&state, select, false);
    let r = movement::position_down(
        host.model(),
        host.tab_size(),
        from.line,
        from.column,
        state.leftover_visible_columns,
        count,
        true,
    );
    cursor.move_model_position(host, select, r.line, r.column, r.leftover_visible_columns, true);
    OperationResult::Handled
}

/// Target of a word-left move from `position`.
pub(super) fn word_left_position(
    cursor: &OneCursor,
    model: &dyn DocumentModel,
    position: Position,
    navigation: WordNavigationType,
) -> Position {
    let mut line = position.line;
    let mut column = position.column;
    if column == model.line_min_column(line) && line > 1 {
        line -= 1;
        column = model.line_max_column(line);
    }

    let previous = cursor.find_previous_word_on_line(model, Position::new(line, column));
    let previous = match navigation {
        WordNavigationType::WordStart => previous,
        WordNavigationType::WordEnd => match previous {
            // Already at this word's end: look one word further back.
            Some(word) if column <= word.end + 1 => {
                cursor.find_previous_word_on_line(model, Position::new(line, word.start + 1))
            }
            other => other,
        },
    };

    let column = match (navigation, previous) {
        (WordNavigationType::WordStart, Some(word)) => word.start + 1,
        (WordNavigationType::WordEnd, Some(word)) => word.end + 1,
        (_, None) => 1,
    };
    Position::new(line, column)
}

/// Target of a word-right move from `position`.
pub(super) fn word_right_position(
    cursor: &OneCursor,
    model: &dyn DocumentModel,
    position: Position,
    navigation: WordNavigationType,
) -> Position {
    let mut line = position.line;
    let mut column = position.column;
    if column == model.line_max_column(line) && line < model.line_count() {
        line += 1;
        column = 1;
    }

    let next = cursor.find_next_word_on_line(model, Position::new(line, column));
    let next = match navigation {
        WordNavigationType::WordEnd => next,
        WordNavigationType::WordStart => match next {
            // Already at this word's start: look one word further.
            Some(word) if column >= word.start + 1 => {
                cursor.find_next_word_on_line(model, Position::new(line, word.end + 1))
            }
            other => other,
        },
    };

    let column = match (navigation, next) {
        (WordNavigationType::WordEnd, Some(word)) => word.end + 1,
        (WordNavigationType::WordStart, Some(word)) => word.start + 1,
        (_, None) => model.line_max_column(line),
    };
    Position::new(line, column)
}

pub(super) fn move_word_left(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    navigation: WordNavigationType,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let target = word_left_position(cursor, host.model(), cursor.position(), navigation);
    cursor.move_model_position(host, select, target.line, target.column, 0, true);
    OperationResult::Handled
}

pub(super) fn move_word_right(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    navigation: WordNavigationType,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let target = word_right_position(cursor, host.model(), cursor.position(), navigation);
    cursor.move_model_position(host, select, target.line, target.column, 0, true);
    OperationResult::Handled
}

pub(super) fn move_to_beginning_of_line(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let position = cursor.view_position();
    let column = movement::column_at_beginning_of_line(&host.view_lines(), position.line, position.column);
    cursor.move_view_position(host, select, position.line, column, 0, true);
    OperationResult::Handled
}

pub(super) fn move_to_end_of_line(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let position = cursor.view_position();
    let column = movement::column_at_end_of_line(&host.view_lines(), position.line, position.column);
    cursor.move_view_position(host, select, position.line, column, 0, true);
    OperationResult::Handled
}

pub(super) fn move_to_beginning_of_buffer(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    _ctx: &mut OperationContext,
) -> OperationResult {
    cursor.move_model_position(host, select, 1, 1, 0, true);
    OperationResult::Handled
}

pub(super) fn move_to_end_of_buffer(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let model = host.model();
    let line = model.line_count();
    let column = model.line_max_column(line);
    cursor.move_model_position(host, select, line, column, 0, true);
    OperationResult::Handled
}

fn translate(cursor: &mut OneCursor, host: &mut CursorHost<'_>, up: bool) -> OperationResult {
    let view = *cursor.view_state();
    let anchor = view.selection.anchor();
    let active = view.selection.active();
    let tab_size = host.tab_size();

    let step = |line: usize, column: usize, leftover: usize| -> MoveResult {
        let lines = host.view_lines();
        if up {
            movement::position_up(&lines, tab_size, line, column, leftover, 1, false)
        } else {
            movement::position_down(&lines, tab_size, line, column, leftover, 1, false)
        }
    };
    let start = step(
        anchor.line,
        anchor.column,
        view.selection_start_leftover_visible_columns,
    );
    let end = step(active.line, active.column, view.leftover_visible_columns);

    let state = CursorModelState::new(
        Range::collapsed(start.position()),
        start.leftover_visible_columns,
        end.position(),
        end.leftover_visible_columns,
    );
    cursor.set_view_state(host, state);
    OperationResult::Handled
}

pub(super) fn translate_up(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    _ctx: &mut OperationContext,
) -> OperationResult {
    translate(cursor, host, true)
}

pub(super) fn translate_down(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    _ctx: &mut OperationContext,
) -> OperationResult {
    translate(cursor, host, false)
}

pub(super) fn expand_line_selection(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    let model = host.model();
    let line_count = model.line_count();

    let start_line = selection.start().line;
    let end_line = selection.end().line;
    let end = if end_line == line_count {
        Position::new(end_line, model.line_max_column(end_line))
    } else {
        Position::new(end_line + 1, 1)
    };

    let state = CursorModelState::new(Range::collapsed(Position::new(start_line, 1)), 0, end, 0);
    cursor.set_model_state(host, state);
    OperationResult::Handled
}

pub(super) fn select_all(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let model = host.model();
    let editable = model.editable_range();
    let target = if model.has_editable_range() && !cursor.selection().equals_range(&editable) {
        editable
    } else {
        model.full_model_range()
    };

    let state = CursorModelState::new(Range::collapsed(target.start()), 0, target.end(), 0);
    cursor.set_model_state(host, state);
    OperationResult::Handled
}

pub(super) fn line(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    position: Position,
    view_position: Option<Position>,
    ctx: &mut OperationContext,
) -> OperationResult {
    ctx.cursor_change_reason = CursorChangeReason::Explicit;
    let position = host.model().validate_position(position);
    let view_position = resolve_view_position(host, position, view_position);

    if !select || !cursor.has_selection() {
        let model = host.model();
        let line_count = model.line_count();
        let end = if position.line < line_count {
            Position::new(position.line + 1, 1)
        } else {
            Position::new(line_count, model.line_max_column(line_count))
        };
        cursor.set_selection_start(host, Range::new(position.line, 1, end.line, end.column), end);
        return OperationResult::Handled;
    }

    let selection_start = cursor.model_state().selection_start;
    let entering_line = selection_start.start_line;
    if position.line < entering_line {
        cursor.move_view_position(host, true, view_position.line, 1, 0, false);
    } else if position.line > entering_line {
        let lines = host.view_lines();
        let line_count = lines.line_count();
        let (line, column) = if view_position.line < line_count {
            (view_position.line + 1, 1)
        } else {
            (line_count, lines.line_max_column(line_count))
        };
        cursor.move_view_position(host, true, line, column, 0, false);
    } else {
        let end = selection_start.end();
        cursor.move_model_position(host, true, end.line, end.column, 0, false);
    }
    OperationResult::Handled
}

fn touches(word: Option<FindWordResult>, index: usize, strictly: bool) -> Option<FindWordResult> {
    word.filter(|w| {
        w.word_type == WordType::Regular
            && if strictly {
                w.start < index && index < w.end
            } else {
                w.start <= index && index <= w.end
            }
    })
}

pub(super) fn word(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    select: bool,
    position: Position,
    ctx: &mut OperationContext,
) -> OperationResult {
    ctx.cursor_change_reason = CursorChangeReason::Explicit;
    let model = host.model();
    let position = model.validate_position(position);
    let previous = cursor.find_previous_word_on_line(model, position);
    let next = cursor.find_next_word_on_line(model, position);
    let index = position.column - 1;
    let line = position.line;

    if !select || !cursor.has_selection() {
        let (start_column, end_column) = match touches(previous, index, false).or(touches(next, index, false)) {
            Some(word) => (word.start + 1, word.end + 1),
            None => (
                previous.map_or(1, |w| w.end + 1),
                next.map_or(model.line_max_column(line), |w| w.start + 1),
            ),
        };
        cursor.set_selection_start(
            host,
            Range::new(line, start_column, line, end_column),
            Position::new(line, end_column),
        );
        return OperationResult::Handled;
    }

    let (start_column, end_column) = match touches(previous, index, true).or(touches(next, index, true)) {
        Some(word) => (word.start + 1, word.end + 1),
        None => (position.column, position.column),
    };

    // Never shrink below the word that started the selection.
    let selection_start = cursor.model_state().selection_start;
    let column = if selection_start.contains_position(position) {
        selection_start.end_column
    } else if position.is_before_or_equal(&selection_start.start()) {
        if selection_start.contains_position(Position::new(line, start_column)) {
            selection_start.end_column
        } else {
            start_column
        }
    } else if selection_start.contains_position(Position::new(line, end_column)) {
        selection_start.start_column
    } else {
        end_column
    };
    cursor.move_model_position(host, true, line, column, 0, false);
    OperationResult::Handled
}

pub(super) fn cancel_selection(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    _ctx: &mut OperationContext,
) -> OperationResult {
    if !cursor.has_selection() {
        return OperationResult::NotApplicable;
    }
    cursor.collapse_selection(host);
    OperationResult::Handled
}

pub(super) fn jump_to_bracket(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    _ctx: &mut OperationContext,
) -> OperationResult {
    let position = cursor.position();
    let Some((at_cursor, matched)) = host.model().match_bracket(position) else {
        return OperationResult::NotApplicable;
    };

    let target = if at_cursor.contains_position(position) && !matched.contains_position(position) {
        matched.start()
    } else if matched.contains_position(position) {
        at_cursor.start()
    } else {
        return OperationResult::NotApplicable;
    };
    cursor.move_model_position(host, false, target.line, target.column, 0, true);
    OperationResult::Handled
}
