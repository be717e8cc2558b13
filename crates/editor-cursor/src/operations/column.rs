//! Column (box) selection.
//!
//! A column selection is described by two corners in view space, each a view line and a
//! visible column. The fixed corner comes from the context or, on the first gesture, from the
//! cursor's selection start; the moving corner is stepped by the individual operations.

use super::{ColumnSelectTarget, OperationContext, OperationResult};
use crate::cursor::{CursorHost, OneCursor};
use crate::model::LineSource;
use crate::movement;
use crate::position::Position;

fn corners(cursor: &OneCursor, host: &CursorHost<'_>, ctx: &OperationContext) -> (ColumnSelectTarget, ColumnSelectTarget) {
    let tab_size = host.tab_size();
    let lines = host.view_lines();
    let view = cursor.view_state();

    let from = ctx.column_select_from.unwrap_or_else(|| {
        let start = view.selection_start.start();
        ColumnSelectTarget {
            line: start.line,
            visual_column: movement::visible_column_at(&lines, start, tab_size),
        }
    });
    let to = ctx.column_select_to.unwrap_or_else(|| ColumnSelectTarget {
        line: view.position.line,
        visual_column: movement::visible_column_at(&lines, view.position, tab_size),
    });
    (from, to)
}

fn select(
    host: &CursorHost<'_>,
    from: ColumnSelectTarget,
    to: ColumnSelectTarget,
    ctx: &mut OperationContext,
) -> OperationResult {
    let result = movement::column_select(
        &host.view_lines(),
        host.tab_size(),
        from.line,
        from.visual_column,
        to.line,
        to.visual_column,
    );
    ctx.view_selections = Some(result.view_selections);
    ctx.reversed = result.reversed;
    ctx.column_select_from = Some(from);
    ctx.column_select_to = Some(ColumnSelectTarget {
        line: result.to_line,
        visual_column: result.to_visual_column,
    });
    OperationResult::Handled
}

pub(super) fn column_select_mouse(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    position: Position,
    view_position: Option<Position>,
    to_visual_column: usize,
    ctx: &mut OperationContext,
) -> OperationResult {
    let model = host.model();
    let position = model.validate_position(position);
    let view_position = match view_position {
        Some(view_position) => host.view.validate_view_position(model, view_position, position),
        None => host.view.convert_model_position_to_view_position(model, position),
    };
    let (from, _) = corners(cursor, host, ctx);
    let to = ColumnSelectTarget {
        line: view_position.line,
        visual_column: to_visual_column,
    };
    select(host, from, to, ctx)
}

pub(super) fn column_select_left(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let (from, mut to) = corners(cursor, host, ctx);
    to.visual_column = to.visual_column.saturating_sub(1);
    select(host, from, to, ctx)
}

pub(super) fn column_select_right(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let (from, mut to) = corners(cursor, host, ctx);
    let tab_size = host.tab_size();
    let lines = host.view_lines();

    let widest = (from.line.min(to.line)..=from.line.max(to.line))
        .map(|line| {
            let end = Position::new(line, lines.line_max_column(line));
            movement::visible_column_at(&lines, end, tab_size)
        })
        .max()
        .unwrap_or(0);
    if to.visual_column < widest {
        to.visual_column += 1;
    }
    select(host, from, to, ctx)
}

pub(super) fn column_select_up(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    page: bool,
    ctx: &mut OperationContext,
) -> OperationResult {
    let (from, mut to) = corners(cursor, host, ctx);
    let step = if page { host.view.page_size() } else { 1 };
    to.line = to.line.saturating_sub(step).max(1);
    select(host, from, to, ctx)
}

pub(super) fn column_select_down(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    page: bool,
    ctx: &mut OperationContext,
) -> OperationResult {
    let (from, mut to) = corners(cursor, host, ctx);
    let step = if page { host.view.page_size() } else { 1 };
    let line_count = host.view.view_line_count(host.model());
    to.line = (to.line + step).min(line_count);
    select(host, from, to, ctx)
}
