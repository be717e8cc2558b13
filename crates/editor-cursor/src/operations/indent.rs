//! Tab, indent and outdent.

use super::typing::good_indent_for_line;
use super::{OperationContext, OperationResult};
use crate::commands::TextCommand;
use crate::cursor::{CursorHost, OneCursor};
use crate::indentation::is_whitespace_only;
use crate::movement;
use crate::position::{Range, Selection};

pub(super) fn tab(cursor: &mut OneCursor, host: &mut CursorHost<'_>, ctx: &mut OperationContext) -> OperationResult {
    let selection = cursor.selection();
    let model = host.model();

    if selection.is_empty() {
        let line = selection.start().line;
        let content = model.line_content(line);
        if is_whitespace_only(&content) {
            let indent = good_indent_for_line(host, line).unwrap_or_else(|| "\t".to_string());
            let indent = model.normalize_indentation(&indent);
            if !content.starts_with(&indent) {
                ctx.is_auto_whitespace_command = true;
                ctx.execute_command = Some(TextCommand::replace(
                    Range::new(line, 1, line, model.line_max_column(line)),
                    indent,
                ));
                return OperationResult::Handled;
            }
        }
        ctx.is_auto_whitespace_command = true;
        ctx.execute_command = Some(jump_to_next_indent(host, selection));
        return OperationResult::Handled;
    }

    let start = selection.start();
    let end = selection.end();
    if start.line == end.line && (start.column != 1 || end.column != model.line_max_column(start.line)) {
        // Part of a single line: replace it with indentation.
        ctx.execute_command = Some(jump_to_next_indent(host, selection));
        return OperationResult::Handled;
    }

    ctx.execute_command = Some(shift_command(cursor, host, selection, false));
    OperationResult::Handled
}

/// Replace the selection with whitespace up to the next tab stop.
fn jump_to_next_indent(host: &CursorHost<'_>, selection: Selection) -> TextCommand {
    let model = host.model();
    let text = if model.options().insert_spaces {
        let tab_size = host.tab_size();
        let visible = movement::visible_column_at(model, selection.start(), tab_size);
        " ".repeat(tab_size - visible % tab_size)
    } else {
        "\t".to_string()
    };
    TextCommand::replace(selection.to_range(), text)
}

fn shift_command(cursor: &OneCursor, host: &CursorHost<'_>, selection: Selection, is_unshift: bool) -> TextCommand {
    TextCommand::Shift {
        selection,
        is_unshift,
        tab_size: host.tab_size(),
        insert_spaces: host.model().options().insert_spaces,
        use_tab_stops: cursor.config().use_tab_stops,
    }
}

pub(super) fn indent(cursor: &mut OneCursor, host: &mut CursorHost<'_>, ctx: &mut OperationContext) -> OperationResult {
    ctx.should_push_stack_element_before = true;
    ctx.should_push_stack_element_after = true;
    ctx.execute_command = Some(shift_command(cursor, host, cursor.selection(), false));
    OperationResult::Handled
}

pub(super) fn outdent(cursor: &mut OneCursor, host: &mut CursorHost<'_>, ctx: &mut OperationContext) -> OperationResult {
    ctx.should_push_stack_element_before = true;
    ctx.should_push_stack_element_after = true;
    ctx.execute_command = Some(shift_command(cursor, host, cursor.selection(), true));
    OperationResult::Handled
}

#[cfg(test)]
mod tests {
    use crate::operations::CursorOperation;
    use crate::position::{Position, Selection};
    use crate::{EditorOptions, EditorSession};
    use editor_cursor_lang::LanguageConfiguration;
    use pretty_assertions::assert_eq;

    fn session(text: &str, options: EditorOptions) -> EditorSession {
        EditorSession::new(text, LanguageConfiguration::plain(), options).unwrap()
    }

    #[test]
    fn test_tab_on_blank_line_copies_previous_indentation() {
        let mut s = session("    a\n", EditorOptions::default());
        s.set_selections(&[Selection::collapsed(Position::new(2, 1))]);
        s.execute(CursorOperation::Tab).unwrap();
        assert_eq!(s.text(), "    a\n    ");
        assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(2, 5)));
    }

    #[test]
    fn test_tab_over_part_of_a_line_replaces_it_with_indentation() {
        let mut s = session("abcd", EditorOptions::default());
        s.set_selections(&[Selection::new(1, 2, 1, 3)]);
        s.execute(CursorOperation::Tab).unwrap();
        assert_eq!(s.text(), "a   cd");

        let options = EditorOptions {
            insert_spaces: false,
            ..EditorOptions::default()
        };
        let mut s = session("ab", options);
        s.set_selections(&[Selection::collapsed(Position::new(1, 2))]);
        s.execute(CursorOperation::Tab).unwrap();
        assert_eq!(s.text(), "a\tb");
    }

    #[test]
    fn test_tab_over_whole_lines_shifts_by_the_document_tab_size() {
        let options = EditorOptions {
            tab_size: 2,
            ..EditorOptions::default()
        };
        let mut s = session("a\nb", options);
        s.set_selections(&[Selection::new(1, 1, 2, 2)]);
        s.execute(CursorOperation::Tab).unwrap();
        assert_eq!(s.text(), "  a\n  b");

        s.execute(CursorOperation::Outdent).unwrap();
        assert_eq!(s.text(), "a\nb");
    }
}
