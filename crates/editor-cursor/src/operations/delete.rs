//! Deletion operations.
//!
//! Each operation computes the range to remove and emits a plain replace with empty text. An
//! empty range means there is nothing to delete: the operation is still handled, without a
//! command.

use super::{OperationContext, OperationResult};
use crate::commands::TextCommand;
use crate::cursor::{CursorHost, OneCursor};
use crate::indentation::{first_non_whitespace_index, last_non_whitespace_end};
use crate::model::DocumentModel;
use crate::movement::{self, column_from_visible_column_clamped, prev_tab_column};
use crate::position::{Position, Range, char_at_column, char_before_column, text_from_column, utf16_len};
use crate::words::WordNavigationType;

fn delete_range(range: Range, ctx: &mut OperationContext) -> OperationResult {
    if range.is_empty() {
        return OperationResult::Handled;
    }
    if range.start_line != range.end_line {
        ctx.should_push_stack_element_before = true;
    }
    ctx.execute_command = Some(TextCommand::replace(range, ""));
    OperationResult::Handled
}

/// The open and close characters around `position`, when they form an auto-closed pair.
fn auto_closing_pair_range(cursor: &OneCursor, model: &dyn DocumentModel, position: Position) -> Option<Range> {
    if !cursor.config().auto_closing_brackets || position.column < 2 {
        return None;
    }
    let line = model.line_content(position.line);
    let before = char_before_column(&line, position.column)?;
    let after = char_at_column(&line, position.column)?;
    cursor.mode().closes_pair(before, after).then(|| {
        Range::new(
            position.line,
            position.column - before.len_utf16(),
            position.line,
            position.column + after.len_utf16(),
        )
    })
}

pub(super) fn delete_left(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    if !selection.is_empty() {
        return delete_range(selection.to_range(), ctx);
    }

    let model = host.model();
    let position = selection.active();
    if let Some(pair) = auto_closing_pair_range(cursor, model, position) {
        return delete_range(pair, ctx);
    }

    let range = if cursor.config().use_tab_stops && position.column > 1 {
        let line = model.line_content(position.line);
        let indentation_end = first_non_whitespace_index(&line).map_or(utf16_len(&line) + 1, |i| i + 1);
        if position.column <= indentation_end {
            // Inside indentation: back to the previous tab stop.
            let tab_size = host.tab_size();
            let from = movement::visible_column_at(model, position, tab_size);
            let to = prev_tab_column(from, tab_size);
            let column = column_from_visible_column_clamped(model, position.line, to, tab_size);
            Range::new(position.line, column, position.line, position.column)
        } else {
            Range::from_positions(movement::left_of(model, position.line, position.column), position)
        }
    } else {
        Range::from_positions(movement::left_of(model, position.line, position.column), position)
    };
    delete_range(range, ctx)
}

pub(super) fn delete_right(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    if !selection.is_empty() {
        return delete_range(selection.to_range(), ctx);
    }
    let position = selection.active();
    let right = movement::right_of(host.model(), position.line, position.column);
    delete_range(Range::from_positions(position, right), ctx)
}

fn delete_word_left_whitespace(model: &dyn DocumentModel, position: Position) -> Option<Range> {
    let start_index = position.column.checked_sub(2)?;
    let line = model.line_content(position.line);
    let after_last_non_blank = last_non_whitespace_end(&line, Some(start_index)).unwrap_or(0);
    (after_last_non_blank < start_index).then(|| {
        Range::new(position.line, after_last_non_blank + 1, position.line, position.column)
    })
}

fn delete_word_right_whitespace(model: &dyn DocumentModel, position: Position) -> Option<Range> {
    let start_index = position.column - 1;
    let line = model.line_content(position.line);
    let rest = text_from_column(&line, position.column);
    // Spaces and tabs are one byte and one code unit each.
    let first_non_blank = start_index
        + rest
            .find(|ch: char| ch != ' ' && ch != '\t')
            .unwrap_or(rest.len());
    (start_index + 1 < first_non_blank).then(|| {
        Range::new(position.line, position.column, position.line, first_non_blank + 1)
    })
}

pub(super) fn delete_word_left(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    whitespace_heuristics: bool,
    navigation: WordNavigationType,
    ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    if !selection.is_empty() {
        return delete_range(selection.to_range(), ctx);
    }
    let model = host.model();
    let position = selection.active();
    if position == Position::new(1, 1) {
        return OperationResult::Handled;
    }

    if whitespace_heuristics
        && let Some(range) = delete_word_left_whitespace(model, position)
    {
        return delete_range(range, ctx);
    }

    let previous = cursor.find_previous_word_on_line(model, position);
    let previous = match (navigation, previous) {
        (WordNavigationType::WordEnd, Some(word)) if position.column <= word.end + 1 => {
            cursor.find_previous_word_on_line(model, Position::new(position.line, word.start + 1))
        }
        (_, previous) => previous,
    };

    let target = match (navigation, previous) {
        (WordNavigationType::WordStart, Some(word)) => Position::new(position.line, word.start + 1),
        (WordNavigationType::WordEnd, Some(word)) => Position::new(position.line, word.end + 1),
        (_, None) if position.column > 1 => Position::new(position.line, 1),
        (_, None) => {
            let line = position.line - 1;
            Position::new(line, model.line_max_column(line))
        }
    };
    delete_range(Range::from_positions(target, position), ctx)
}

pub(super) fn delete_word_right(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    whitespace_heuristics: bool,
    navigation: WordNavigationType,
    ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    if !selection.is_empty() {
        return delete_range(selection.to_range(), ctx);
    }
    let model = host.model();
    let position = selection.active();
    let line_count = model.line_count();
    let max_column = model.line_max_column(position.line);
    if position.line == line_count && position.column == max_column {
        return OperationResult::Handled;
    }

    if whitespace_heuristics
        && let Some(range) = delete_word_right_whitespace(model, position)
    {
        return delete_range(range, ctx);
    }

    let next = cursor.find_next_word_on_line(model, position);
    let next = match (navigation, next) {
        (WordNavigationType::WordStart, Some(word)) if position.column >= word.start + 1 => {
            cursor.find_next_word_on_line(model, Position::new(position.line, word.end + 1))
        }
        (_, next) => next,
    };

    let target = match (navigation, next) {
        (WordNavigationType::WordEnd, Some(word)) => Position::new(position.line, word.end + 1),
        (WordNavigationType::WordStart, Some(word)) => Position::new(position.line, word.start + 1),
        (_, None) if position.column < max_column || position.line == line_count => {
            Position::new(position.line, max_column)
        }
        (_, None) => {
            // At the end of the line: join with the next one up to its first word.
            let line = position.line + 1;
            let column = cursor
                .find_next_word_on_line(model, Position::new(line, 1))
                .map_or(model.line_max_column(line), |word| word.start + 1);
            Position::new(line, column)
        }
    };
    delete_range(Range::from_positions(position, target), ctx)
}

pub(super) fn delete_all_left(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    if !selection.is_empty() {
        return delete_range(selection.to_range(), ctx);
    }
    let model = host.model();
    let position = selection.active();
    let start = if position.column > model.line_min_column(position.line) {
        Position::new(position.line, model.line_min_column(position.line))
    } else {
        movement::left_of(model, position.line, position.column)
    };
    delete_range(Range::from_positions(start, position), ctx)
}

pub(super) fn delete_all_right(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    if !selection.is_empty() {
        return delete_range(selection.to_range(), ctx);
    }
    let model = host.model();
    let position = selection.active();
    let max_column = model.line_max_column(position.line);
    let end = if position.column < max_column {
        Position::new(position.line, max_column)
    } else {
        movement::right_of(model, position.line, position.column)
    };
    delete_range(Range::from_positions(position, end), ctx)
}

pub(super) fn cut(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    ctx.should_push_stack_element_before = true;
    ctx.should_push_stack_element_after = true;

    let selection = cursor.selection();
    if !selection.is_empty() {
        return delete_range(selection.to_range(), ctx);
    }
    if !cursor.config().empty_selection_clipboard {
        return OperationResult::Handled;
    }

    let model = host.model();
    let line = selection.active().line;
    let line_count = model.line_count();
    let range = if line < line_count {
        Range::new(line, 1, line + 1, 1)
    } else if line > 1 {
        // The last line takes the preceding line break with it.
        Range::new(line - 1, model.line_max_column(line - 1), line, model.line_max_column(line))
    } else {
        Range::new(1, 1, 1, model.line_max_column(1))
    };
    delete_range(range, ctx)
}


#[cfg(test)]
mod tests {
    use crate::operations::CursorOperation;
    use crate::position::{Position, Selection};
    use crate::words::WordNavigationType;
    use crate::{EditorOptions, EditorSession};
    use editor_cursor_lang::LanguageConfiguration;
    use pretty_assertions::assert_eq;

    fn plain(text: &str) -> EditorSession {
        EditorSession::new(text, LanguageConfiguration::plain(), EditorOptions::default()).unwrap()
    }

    fn at(line: usize, column: usize) -> Selection {
        Selection::collapsed(Position::new(line, column))
    }

    #[test]
    fn test_delete_word_right() {
        use WordNavigationType::{WordEnd, WordStart};
        let cases = [
            ("foo   bar", true, WordEnd, "foobar"),
            ("foo   bar", false, WordEnd, "foo"),
            ("foo   bar", false, WordStart, "foobar"),
            ("foo bar", true, WordEnd, "foo"),
            ("foo\n  bar", false, WordEnd, "foobar"),
        ];
        for (text, whitespace_heuristics, word_navigation, expected) in cases {
            let mut s = plain(text);
            s.set_selections(&[at(1, 4)]);
            s.execute(CursorOperation::DeleteWordRight {
                whitespace_heuristics,
                word_navigation,
            })
            .unwrap();
            assert_eq!(
                s.text(),
                expected,
                "{text:?} heuristics={whitespace_heuristics} {word_navigation:?}"
            );
            assert_eq!(s.primary_selection(), at(1, 4));
        }
    }

    #[test]
    fn test_delete_word_right_at_end_of_document_is_a_no_op() {
        let mut s = plain("foo");
        s.set_selections(&[at(1, 4)]);
        let result = s
            .execute(CursorOperation::DeleteWordRight {
                whitespace_heuristics: true,
                word_navigation: WordNavigationType::WordEnd,
            })
            .unwrap();
        assert!(result.is_handled());
        assert_eq!(s.text(), "foo");
    }

    #[test]
    fn test_delete_left_removes_whole_surrogate_pair() {
        let mut s = plain("a😀");
        s.set_selections(&[at(1, 4)]);
        s.execute(CursorOperation::DeleteLeft).unwrap();
        assert_eq!(s.text(), "a");
        assert_eq!(s.primary_selection(), at(1, 2));
    }

    #[test]
    fn test_delete_left_in_indentation_goes_to_previous_tab_stop() {
        let mut s = plain("      x");
        s.set_selections(&[at(1, 7)]);
        s.execute(CursorOperation::DeleteLeft).unwrap();
        assert_eq!(s.text(), "    x");

        let options = EditorOptions {
            use_tab_stops: false,
            ..EditorOptions::default()
        };
        let mut s = EditorSession::new("      x", LanguageConfiguration::plain(), options).unwrap();
        s.set_selections(&[at(1, 7)]);
        s.execute(CursorOperation::DeleteLeft).unwrap();
        assert_eq!(s.text(), "     x");
    }

    #[test]
    fn test_delete_all_left_and_right() {
        let mut s = plain("abc def");
        s.set_selections(&[at(1, 5)]);
        s.execute(CursorOperation::DeleteAllLeft).unwrap();
        assert_eq!(s.text(), "def");

        let mut s = plain("abc def");
        s.set_selections(&[at(1, 4)]);
        s.execute(CursorOperation::DeleteAllRight).unwrap();
        assert_eq!(s.text(), "abc");
    }
}
