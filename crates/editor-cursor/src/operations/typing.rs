//! Typing: the interceptor chain, enter handling, paste and composition input.
//!
//! A typed character is offered to each entry of [`TYPE_INTERCEPTORS`] in order. The first
//! one that returns [`OperationResult::Handled`] owns the keystroke; if none does, the
//! character is inserted literally.

use super::{CursorChangeReason, OperationContext, OperationResult};
use crate::commands::TextCommand;
use crate::cursor::{CursorHost, OneCursor};
use crate::indentation::{self, is_whitespace_only};
use crate::model::DocumentModel;
use crate::position::{Position, Range, char_at_column, text_between_columns, utf16_len};
use editor_cursor_lang::{ElectricAction, IndentAction};
use tracing::trace;

/// One entry of the interceptor chain.
#[derive(Debug, Clone, Copy)]
pub struct TypeInterceptor {
    /// Name used in traces.
    pub name: &'static str,
    /// Decide whether the character is handled, filling the context if it is.
    pub intercept: fn(&OneCursor, &CursorHost<'_>, char, &mut OperationContext) -> OperationResult,
}

/// The interceptor chain, in priority order.
pub const TYPE_INTERCEPTORS: &[TypeInterceptor] = &[
    TypeInterceptor {
        name: "enter",
        intercept: intercept_enter,
    },
    TypeInterceptor {
        name: "auto-closing-close",
        intercept: intercept_auto_closing_close,
    },
    TypeInterceptor {
        name: "auto-closing-open",
        intercept: intercept_auto_closing_open,
    },
    TypeInterceptor {
        name: "surround-selection",
        intercept: intercept_surround_selection,
    },
    TypeInterceptor {
        name: "electric-character",
        intercept: intercept_electric_character,
    },
];

pub(super) fn type_char(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    ch: char,
    ctx: &mut OperationContext,
) -> OperationResult {
    for interceptor in TYPE_INTERCEPTORS {
        if (interceptor.intercept)(cursor, host, ch, ctx).is_handled() {
            trace!(interceptor = interceptor.name, ?ch, "typed character intercepted");
            return OperationResult::Handled;
        }
    }
    actual_type(cursor, ch.encode_utf8(&mut [0; 4]), false, ctx)
}

/// Replace the selection with `text`.
pub(super) fn actual_type(
    cursor: &OneCursor,
    text: &str,
    keep_position: bool,
    ctx: &mut OperationContext,
) -> OperationResult {
    ctx.execute_command = Some(type_command(cursor.selection().to_range(), text.to_string(), keep_position));
    OperationResult::Handled
}

fn type_command(range: Range, text: String, keep_position: bool) -> TextCommand {
    if keep_position {
        TextCommand::ReplaceKeepPosition { range, text }
    } else {
        TextCommand::Replace { range, text }
    }
}

fn char_after(host: &CursorHost<'_>, position: Position) -> Option<char> {
    char_at_column(&host.model().line_content(position.line), position.column)
}

fn intercept_enter(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    ch: char,
    ctx: &mut OperationContext,
) -> OperationResult {
    if ch != '\n' {
        return OperationResult::NotApplicable;
    }
    enter(host, false, cursor.selection().to_range(), ctx)
}

/// Insert a line break at `range`, indenting the new line per the enter action.
fn enter(
    host: &CursorHost<'_>,
    keep_position: bool,
    range: Range,
    ctx: &mut OperationContext,
) -> OperationResult {
    let model = host.model();
    let action = model.enter_action_at(range);
    ctx.should_push_stack_element_before = true;
    ctx.is_auto_whitespace_command = true;

    let command = match action.indent_action {
        IndentAction::None | IndentAction::Indent => {
            let indent = model.normalize_indentation(&format!("{}{}", action.indentation, action.append_text));
            type_command(range, format!("\n{indent}"), keep_position)
        }
        IndentAction::IndentOutdent => {
            let normal = model.normalize_indentation(&action.indentation);
            let increased = model.normalize_indentation(&format!("{}{}", action.indentation, action.append_text));
            let text = format!("\n{increased}\n{normal}");
            if keep_position {
                TextCommand::ReplaceKeepPosition { range, text }
            } else {
                let increased_len = utf16_len(&increased) as isize;
                let normal_len = utf16_len(&normal) as isize;
                TextCommand::ReplaceWithOffsetCursor {
                    range,
                    text,
                    line_delta: -1,
                    column_delta: increased_len - normal_len,
                }
            }
        }
        IndentAction::Outdent => {
            let outdented = unshift_indent(model, &action.indentation);
            let indent = model.normalize_indentation(&format!("{outdented}{}", action.append_text));
            type_command(range, format!("\n{indent}"), keep_position)
        }
    };
    ctx.execute_command = Some(command);
    OperationResult::Handled
}

/// `indentation` moved one tab stop to the left, in the document's indent style.
fn unshift_indent(model: &dyn DocumentModel, indentation: &str) -> String {
    let tab_size = model.options().tab_size;
    let count = indentation::unshift_indent_count(indentation, utf16_len(indentation) + 1, tab_size);
    model.one_indent().repeat(count)
}

/// The indentation a new line after `line - 1` would get, used by tab on a blank line.
pub(super) fn good_indent_for_line(host: &CursorHost<'_>, line: usize) -> Option<String> {
    let model = host.model();
    let previous = (1..line)
        .rev()
        .find(|&l| !is_whitespace_only(&model.line_content(l)))?;

    let max_column = model.line_max_column(previous);
    let action = model.enter_action_at(Range::new(previous, max_column, previous, max_column));
    let base = match action.indent_action {
        IndentAction::Outdent => unshift_indent(model, &action.indentation),
        _ => action.indentation,
    };
    let indent = model.normalize_indentation(&format!("{base}{}", action.append_text));
    (!indent.is_empty()).then_some(indent)
}

fn intercept_auto_closing_close(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    ch: char,
    ctx: &mut OperationContext,
) -> OperationResult {
    if !cursor.config().auto_closing_brackets
        || !cursor.mode().auto_closing_pairs_close.contains_key(&ch)
        || !cursor.selection().is_empty()
    {
        return OperationResult::NotApplicable;
    }
    let position = cursor.position();
    if char_after(host, position) != Some(ch) {
        return OperationResult::NotApplicable;
    }

    // Type over the close character instead of inserting another one.
    let range = Range::new(
        position.line,
        position.column,
        position.line,
        position.column + ch.len_utf16(),
    );
    ctx.execute_command = Some(TextCommand::replace(range, ch));
    OperationResult::Handled
}

fn intercept_auto_closing_open(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    ch: char,
    ctx: &mut OperationContext,
) -> OperationResult {
    let mode = cursor.mode();
    let Some(close) = mode.auto_closing_pairs_open.get(&ch) else {
        return OperationResult::NotApplicable;
    };
    if !cursor.config().auto_closing_brackets || !cursor.selection().is_empty() {
        return OperationResult::NotApplicable;
    }
    let position = cursor.position();

    if let Some(after) = char_after(host, position)
        && !after.is_whitespace()
        && !mode.auto_closing_pairs_close.contains_key(&after)
    {
        return OperationResult::NotApplicable;
    }

    if !host.model().should_auto_close_pair(ch, position) {
        return OperationResult::NotApplicable;
    }

    ctx.should_push_stack_element_before = true;
    ctx.execute_command = Some(TextCommand::ReplaceWithOffsetCursor {
        range: cursor.selection().to_range(),
        text: format!("{ch}{close}"),
        line_delta: 0,
        column_delta: -(utf16_len(close) as isize),
    });
    OperationResult::Handled
}

fn intercept_surround_selection(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    ch: char,
    ctx: &mut OperationContext,
) -> OperationResult {
    let Some(&close) = cursor.mode().surrounding_pairs.get(&ch) else {
        return OperationResult::NotApplicable;
    };
    let selection = cursor.selection();
    if !cursor.config().auto_closing_brackets || selection.is_empty() {
        return OperationResult::NotApplicable;
    }
    if is_whitespace_only(&host.model().value_in_range(selection.to_range()).replace('\n', "")) {
        return OperationResult::NotApplicable;
    }

    ctx.should_push_stack_element_before = true;
    ctx.should_push_stack_element_after = true;
    ctx.execute_command = Some(TextCommand::SurroundSelection {
        range: selection.to_range(),
        open: ch,
        close,
    });
    OperationResult::Handled
}

fn intercept_electric_character(
    cursor: &OneCursor,
    _host: &CursorHost<'_>,
    ch: char,
    ctx: &mut OperationContext,
) -> OperationResult {
    if !cursor.mode().electric_chars.contains(&ch) || !cursor.selection().is_empty() {
        return OperationResult::NotApplicable;
    }
    ctx.post_edit = Some(electric_post_edit);
    actual_type(cursor, ch.encode_utf8(&mut [0; 4]), false, ctx)
}

/// Runs once the electric character is in the document and the cursor sits after it.
fn electric_post_edit(cursor: &OneCursor, host: &CursorHost<'_>, ctx: &mut OperationContext) -> OperationResult {
    let model = host.model();
    let position = cursor.position();
    let Some(action) = model.on_electric_character(position) else {
        return OperationResult::NotApplicable;
    };
    trace!(?action, %position, "electric character");

    match action {
        ElectricAction::AppendText { text, advance_count } => {
            let back = utf16_len(&text).saturating_sub(advance_count) as isize;
            ctx.execute_command = Some(TextCommand::ReplaceWithOffsetCursor {
                range: Range::collapsed(position),
                text,
                line_delta: 0,
                column_delta: -back,
            });
            OperationResult::Handled
        }
        ElectricAction::MatchOpenBracket { close } => {
            let Some(bracket_start) = position.column.checked_sub(utf16_len(&close)) else {
                return OperationResult::NotApplicable;
            };
            let Some(open) =
                model.find_matching_bracket_up(&close, Position::new(position.line, bracket_start))
            else {
                return OperationResult::NotApplicable;
            };
            if open.start_line == position.line {
                return OperationResult::NotApplicable;
            }

            let open_line = model.line_content(open.start_line);
            let indent = model.normalize_indentation(indentation::leading_whitespace(&open_line));
            let line = model.line_content(position.line);
            let first_non_blank = match model.line_first_non_whitespace_column(position.line) {
                0 => position.column,
                column => column,
            };
            let typed = text_between_columns(&line, first_non_blank, position.column);

            let range = Range::new(position.line, 1, position.line, position.column);
            let text = format!("{indent}{typed}");
            if model.value_in_range(range) == text {
                return OperationResult::NotApplicable;
            }
            ctx.should_push_stack_element_after = true;
            ctx.execute_command = Some(TextCommand::replace(range, text));
            OperationResult::Handled
        }
    }
}

pub(super) fn replace_previous_char(
    cursor: &OneCursor,
    text: &str,
    replace_char_count: usize,
    ctx: &mut OperationContext,
) -> OperationResult {
    let selection = cursor.selection();
    let range = if selection.is_empty() {
        let position = selection.active();
        let start = position.column.saturating_sub(replace_char_count).max(1);
        Range::new(position.line, start, position.line, position.column)
    } else {
        selection.to_range()
    };
    ctx.execute_command = Some(TextCommand::replace(range, text));
    OperationResult::Handled
}

pub(super) fn paste(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    text: &str,
    paste_on_new_line: bool,
    ctx: &mut OperationContext,
) -> OperationResult {
    ctx.cursor_change_reason = CursorChangeReason::Paste;
    let selection = cursor.selection();
    let model = host.model();

    let start = selection.start();
    let end = selection.end();
    let on_new_line = paste_on_new_line
        && text.ends_with('\n')
        && text.find('\n') == Some(text.len() - 1)
        && start.line == end.line
        && !(start.column == model.line_min_column(start.line) && end.column == model.line_max_column(end.line));

    let command = if on_new_line {
        let line = selection.active().line;
        TextCommand::ReplacePreservingSelection {
            range: Range::new(line, 1, line, 1),
            text: text.to_string(),
            selection,
        }
    } else {
        TextCommand::replace(selection.to_range(), text)
    };
    ctx.execute_command = Some(command);
    OperationResult::Handled
}

pub(super) fn line_insert_before(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let line = cursor.position().line;
    if line == 1 {
        ctx.should_push_stack_element_before = true;
        ctx.execute_command = Some(TextCommand::ReplaceKeepPosition {
            range: Range::new(1, 1, 1, 1),
            text: "\n".to_string(),
        });
        return OperationResult::Handled;
    }
    let column = host.model().line_max_column(line - 1);
    enter(host, false, Range::new(line - 1, column, line - 1, column), ctx)
}

pub(super) fn line_insert_after(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    let line = cursor.position().line;
    let column = host.model().line_max_column(line);
    enter(host, false, Range::new(line, column, line, column), ctx)
}

pub(super) fn line_break_insert(
    cursor: &OneCursor,
    host: &CursorHost<'_>,
    ctx: &mut OperationContext,
) -> OperationResult {
    enter(host, true, cursor.selection().to_range(), ctx)
}

#[cfg(test)]
mod tests {
    use crate::operations::CursorOperation;
    use crate::position::{Position, Selection};
    use crate::{EditorOptions, EditorSession};
    use editor_cursor_lang::{EnterAction, IndentAction, LanguageConfiguration, OnEnterRule};
    use pretty_assertions::assert_eq;

    fn c_like(text: &str) -> EditorSession {
        EditorSession::new(text, LanguageConfiguration::c_like(), EditorOptions::default()).unwrap()
    }

    fn at(line: usize, column: usize) -> Selection {
        Selection::collapsed(Position::new(line, column))
    }

    #[test]
    fn test_quote_after_word_character_auto_closes() {
        let mut s = c_like("a");
        s.set_selections(&[at(1, 2)]);
        s.type_text("\"").unwrap();
        assert_eq!(s.text(), "a\"\"");
        assert_eq!(s.primary_selection(), at(1, 3));
    }

    #[test]
    fn test_quote_inside_string_does_not_auto_close() {
        let mut s = c_like("x = \"ab");
        s.set_selections(&[at(1, 8)]);
        s.type_text("'").unwrap();
        assert_eq!(s.text(), "x = \"ab'");
    }

    #[test]
    fn test_outdent_rule_keeps_appended_text() {
        let rule = OnEnterRule::new(
            r"^\s*return\b.*$",
            None,
            EnterAction::new(IndentAction::Outdent).with_append_text("// "),
        )
        .unwrap();
        let language = LanguageConfiguration::plain().with_on_enter_rule(rule);

        let mut s = EditorSession::new("        return x;", language.clone(), EditorOptions::default()).unwrap();
        s.execute(CursorOperation::MoveToEndOfLine { select: false }).unwrap();
        s.execute(CursorOperation::Type { ch: '\n' }).unwrap();
        assert_eq!(s.text(), "        return x;\n    // ");
        assert_eq!(s.primary_selection(), at(2, 8));

        // Tab on the blank line below computes the same indentation.
        let mut s = EditorSession::new("        return x;\n", language, EditorOptions::default()).unwrap();
        s.set_selections(&[at(2, 1)]);
        s.execute(CursorOperation::Tab).unwrap();
        assert_eq!(s.text(), "        return x;\n    // ");
    }

    #[test]
    fn test_enter_between_braces_with_tab_size_two() {
        let options = EditorOptions {
            tab_size: 2,
            ..EditorOptions::default()
        };
        let mut s = EditorSession::new("if (x) ", LanguageConfiguration::c_like(), options).unwrap();
        s.set_selections(&[at(1, 8)]);
        s.type_text("{").unwrap();
        s.execute(CursorOperation::Type { ch: '\n' }).unwrap();
        assert_eq!(s.text(), "if (x) {\n  \n}");
        assert_eq!(s.primary_selection(), at(2, 3));
    }

    #[test]
    fn test_electric_close_brace_dedents_to_open_line() {
        let mut s = c_like("fn f() {\n    x;\n    ");
        s.set_selections(&[at(3, 5)]);
        s.type_text("}").unwrap();
        assert_eq!(s.text(), "fn f() {\n    x;\n}");
        assert_eq!(s.primary_selection(), at(3, 2));
    }

    #[test]
    fn test_doc_comment_open_appends_close() {
        let mut s = c_like("");
        s.type_text("/**").unwrap();
        assert_eq!(s.text(), "/** */");
        assert_eq!(s.primary_selection(), at(1, 4));
    }

    #[test]
    fn test_typing_open_bracket_surrounds_selection() {
        let mut s = c_like("let abc;");
        s.set_selections(&[Selection::new(1, 5, 1, 8)]);
        s.type_text("(").unwrap();
        assert_eq!(s.text(), "let (abc);");
        assert_eq!(s.primary_selection(), Selection::new(1, 6, 1, 9));

        // A whitespace-only selection is replaced, not surrounded.
        let mut s = c_like("a  b");
        s.set_selections(&[Selection::new(1, 2, 1, 4)]);
        s.type_text("(").unwrap();
        assert_eq!(s.text(), "a(b");
    }

    #[test]
    fn test_type_over_after_surrogate_pair() {
        let mut s = c_like("😀");
        s.execute(CursorOperation::MoveToEndOfLine { select: false }).unwrap();
        s.type_text("(").unwrap();
        assert_eq!(s.text(), "😀()");
        assert_eq!(s.primary_selection(), at(1, 4));
        s.type_text(")").unwrap();
        assert_eq!(s.text(), "😀()");
        assert_eq!(s.primary_selection(), at(1, 5));
    }
}
