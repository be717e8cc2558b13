//! Edit commands produced by cursor operations.
//!
//! Operations never edit the document themselves. They describe the edit as a [`TextCommand`],
//! and the edit executor (see [`crate::session::EditorSession`]) applies it with
//! [`TextCommand::execute`], which also computes where the cursor ends up.

use crate::indentation::{self, first_non_whitespace_index, is_whitespace_only};
use crate::model::{AnchorId, EditableDocument};
use crate::position::{Position, Range, Selection, utf16_len};

/// An atomic document edit plus the rule for the resulting cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    /// Replace `range` with `text`; the cursor lands after the inserted text.
    Replace {
        /// Replaced range.
        range: Range,
        /// Inserted text.
        text: String,
    },
    /// Replace `range` with `text`; the cursor stays at the start of the range.
    ReplaceKeepPosition {
        /// Replaced range.
        range: Range,
        /// Inserted text.
        text: String,
    },
    /// Replace `range` with `text`; the cursor lands at the end of the inserted text moved by
    /// the given deltas.
    ReplaceWithOffsetCursor {
        /// Replaced range.
        range: Range,
        /// Inserted text.
        text: String,
        /// Line delta applied to the end of the inserted text.
        line_delta: isize,
        /// Column delta applied to the end of the inserted text.
        column_delta: isize,
    },
    /// Replace `range` with `text` and keep `selection` on the text it covered.
    ReplacePreservingSelection {
        /// Replaced range.
        range: Range,
        /// Inserted text.
        text: String,
        /// The selection to carry across the edit.
        selection: Selection,
    },
    /// Indent or outdent every line touched by `selection`.
    Shift {
        /// The selection whose lines are shifted.
        selection: Selection,
        /// Outdent instead of indent.
        is_unshift: bool,
        /// Width of a tab stop.
        tab_size: usize,
        /// Indent with spaces.
        insert_spaces: bool,
        /// Align to tab stops instead of adding or removing one indent unit.
        use_tab_stops: bool,
    },
    /// Wrap `range` in `open` and `close`, selecting the wrapped text.
    SurroundSelection {
        /// Wrapped range.
        range: Range,
        /// Inserted before the range.
        open: char,
        /// Inserted after the range.
        close: char,
    },
}

impl TextCommand {
    /// Plain replace.
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self::Replace {
            range,
            text: text.into(),
        }
    }

    /// Apply the command and return the resulting cursor selection.
    pub fn execute(&self, doc: &mut dyn EditableDocument) -> Selection {
        match self {
            Self::Replace { range, text } => {
                let inserted = doc.replace(*range, text);
                Selection::collapsed(inserted.end())
            }
            Self::ReplaceKeepPosition { range, text } => {
                let inserted = doc.replace(*range, text);
                Selection::collapsed(inserted.start())
            }
            Self::ReplaceWithOffsetCursor {
                range,
                text,
                line_delta,
                column_delta,
            } => {
                let inserted = doc.replace(*range, text);
                let end = inserted.end();
                let target = Position::new(
                    end.line.saturating_add_signed(*line_delta).max(1),
                    end.column.saturating_add_signed(*column_delta).max(1),
                );
                Selection::collapsed(doc.validate_position(target))
            }
            Self::ReplacePreservingSelection {
                range,
                text,
                selection,
            } => {
                let tracked = TrackedSelection::new(doc, *selection);
                doc.replace(*range, text);
                tracked.resolve(doc)
            }
            Self::Shift {
                selection,
                is_unshift,
                tab_size,
                insert_spaces,
                use_tab_stops,
            } => shift(
                doc,
                *selection,
                ShiftOptions {
                    is_unshift: *is_unshift,
                    tab_size: (*tab_size).max(1),
                    insert_spaces: *insert_spaces,
                    use_tab_stops: *use_tab_stops,
                },
            ),
            Self::SurroundSelection { range, open, close } => {
                // Close first so the start of the range does not move.
                doc.replace(Range::collapsed(range.end()), &close.to_string());
                doc.replace(Range::collapsed(range.start()), &open.to_string());
                let open_len = open.len_utf16();
                let end_column = if range.start_line == range.end_line {
                    range.end_column + open_len
                } else {
                    range.end_column
                };
                Selection::new(
                    range.start_line,
                    range.start_column + open_len,
                    range.end_line,
                    end_column,
                )
            }
        }
    }
}

/// A selection carried across edits by two temporary anchors.
///
/// A non-empty selection never grows when text is inserted at its edges. An empty one
/// follows inserted text unless it sits at the end of its line.
struct TrackedSelection {
    start: AnchorId,
    end: AnchorId,
    selection: Selection,
}

impl TrackedSelection {
    fn new(doc: &mut dyn EditableDocument, selection: Selection) -> Self {
        let (start_sticks, end_sticks) = if selection.is_empty() {
            let position = selection.start();
            let at_line_end = position.column == doc.line_max_column(position.line);
            (at_line_end, at_line_end)
        } else {
            (false, true)
        };
        let start = doc.create_anchor(selection.start(), start_sticks);
        let end = doc.create_anchor(selection.end(), end_sticks);
        Self { start, end, selection }
    }

    fn resolve(self, doc: &mut dyn EditableDocument) -> Selection {
        let start = doc.resolve_anchor(self.start);
        let end = doc.resolve_anchor(self.end);
        doc.remove_anchor(self.start);
        doc.remove_anchor(self.end);

        match (start, end) {
            (Some(start), Some(end)) => Selection::from_range(
                Range::from_positions(start, end),
                self.selection.direction(),
            ),
            _ => Selection::collapsed(doc.validate_position(self.selection.active())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ShiftOptions {
    is_unshift: bool,
    tab_size: usize,
    insert_spaces: bool,
    use_tab_stops: bool,
}

struct ShiftEdit {
    line: usize,
    range: Range,
    text: String,
}

fn shift(doc: &mut dyn EditableDocument, selection: Selection, options: ShiftOptions) -> Selection {
    let start_line = selection.start().line;
    let mut end_line = selection.end().line;
    if selection.end().column == 1 && start_line != end_line {
        end_line -= 1;
    }
    let indent_empty_lines = start_line == end_line;
    let one_indent = indentation::one_indent(options.tab_size, options.insert_spaces);

    let mut edits = Vec::new();
    let mut start_column_stays_put = false;
    let cursor_at_last_edit = options.use_tab_stops
        && selection.is_empty()
        && is_whitespace_only(&doc.line_content(start_line));

    for line in start_line..=end_line {
        let text = doc.line_content(line);
        let len = utf16_len(&text);
        let indentation_end = first_non_whitespace_index(&text);

        if options.is_unshift && (len == 0 || indentation_end == Some(0)) {
            continue;
        }
        if !indent_empty_lines && !options.is_unshift && len == 0 {
            continue;
        }
        let indentation_end = indentation_end.unwrap_or(len);

        let edit = if options.use_tab_stops {
            let count = if options.is_unshift {
                indentation::unshift_indent_count(&text, indentation_end + 1, options.tab_size)
            } else {
                indentation::shift_indent_count(&text, indentation_end + 1, options.tab_size)
            };
            ShiftEdit {
                line,
                range: Range::new(line, 1, line, indentation_end + 1),
                text: one_indent.repeat(count),
            }
        } else if options.is_unshift {
            let removed = if text.starts_with('\t') {
                1
            } else {
                text.chars()
                    .take(options.tab_size)
                    .take_while(|&ch| ch == ' ')
                    .count()
            };
            if removed == 0 {
                continue;
            }
            ShiftEdit {
                line,
                range: Range::new(line, 1, line, removed + 1),
                text: String::new(),
            }
        } else {
            ShiftEdit {
                line,
                range: Range::new(line, 1, line, 1),
                text: one_indent.clone(),
            }
        };

        if line == start_line && !selection.is_empty() {
            start_column_stays_put = selection.start().column <= indentation_end + 1;
        }
        edits.push(edit);
    }

    let tracked = TrackedSelection::new(doc, selection);
    let mut last_edit_end = None;
    for edit in edits.iter().rev() {
        let inserted = doc.replace(edit.range, &edit.text);
        if last_edit_end.is_none() {
            last_edit_end = Some((edit.line, inserted.end()));
        }
    }
    let result = tracked.resolve(doc);

    if cursor_at_last_edit && let Some((_, end)) = last_edit_end {
        return Selection::collapsed(end);
    }

    if start_column_stays_put {
        let initial = selection.start().column;
        let start = result.start();
        if start.column > initial {
            let end = result.end();
            let pinned = Position::new(start.line, initial);
            return Selection::from_range(Range::from_positions(pinned, end), result.direction());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineSource;
    use crate::text_model::TextModel;
    use editor_cursor_lang::LanguageConfiguration;

    fn model(text: &str) -> TextModel {
        TextModel::new(text, LanguageConfiguration::plain())
    }

    #[test]
    fn test_replace_variants_place_cursor() {
        let mut doc = model("hello world");
        let sel = TextCommand::replace(Range::new(1, 1, 1, 6), "bye").execute(&mut doc);
        assert_eq!(doc.line_content(1), "bye world");
        assert_eq!(sel, Selection::collapsed(Position::new(1, 4)));

        let sel = TextCommand::ReplaceKeepPosition {
            range: Range::new(1, 4, 1, 4),
            text: "!".to_string(),
        }
        .execute(&mut doc);
        assert_eq!(doc.line_content(1), "bye! world");
        assert_eq!(sel, Selection::collapsed(Position::new(1, 4)));

        let sel = TextCommand::ReplaceWithOffsetCursor {
            range: Range::new(1, 1, 1, 1),
            text: "()".to_string(),
            line_delta: 0,
            column_delta: -1,
        }
        .execute(&mut doc);
        assert_eq!(sel, Selection::collapsed(Position::new(1, 2)));
    }

    #[test]
    fn test_replace_preserving_selection_follows_text() {
        let mut doc = model("abc\ndef");
        let sel = TextCommand::ReplacePreservingSelection {
            range: Range::new(2, 1, 2, 1),
            text: "xyz\n".to_string(),
            selection: Selection::new(2, 1, 2, 3),
        }
        .execute(&mut doc);
        assert_eq!(doc.line_content(2), "xyz");
        assert_eq!(sel, Selection::new(3, 1, 3, 3));
    }

    #[test]
    fn test_shift_indents_touched_lines() {
        let mut doc = model("a\n\n  b\nc");
        let sel = TextCommand::Shift {
            selection: Selection::new(1, 1, 4, 1),
            is_unshift: false,
            tab_size: 4,
            insert_spaces: true,
            use_tab_stops: true,
        }
        .execute(&mut doc);
        assert_eq!(doc.line_content(1), "    a");
        assert_eq!(doc.line_content(2), "");
        assert_eq!(doc.line_content(3), "    b");
        assert_eq!(doc.line_content(4), "c");
        assert_eq!(sel, Selection::new(1, 1, 4, 1));
    }

    #[test]
    fn test_unshift_skips_unindented_lines() {
        let mut doc = model("\tfoo\nbar\n      baz");
        TextCommand::Shift {
            selection: Selection::new(1, 2, 3, 3),
            is_unshift: true,
            tab_size: 4,
            insert_spaces: true,
            use_tab_stops: true,
        }
        .execute(&mut doc);
        assert_eq!(doc.line_content(1), "foo");
        assert_eq!(doc.line_content(2), "bar");
        assert_eq!(doc.line_content(3), "    baz");
    }

    #[test]
    fn test_shift_whitespace_only_line_moves_cursor_to_indent_end() {
        let mut doc = model("  ");
        let sel = TextCommand::Shift {
            selection: Selection::collapsed(Position::new(1, 1)),
            is_unshift: false,
            tab_size: 4,
            insert_spaces: true,
            use_tab_stops: true,
        }
        .execute(&mut doc);
        assert_eq!(doc.line_content(1), "    ");
        assert_eq!(sel, Selection::collapsed(Position::new(1, 5)));
    }

    #[test]
    fn test_surround_selects_inner_text() {
        let mut doc = model("foo bar");
        let sel = TextCommand::SurroundSelection {
            range: Range::new(1, 5, 1, 8),
            open: '(',
            close: ')',
        }
        .execute(&mut doc);
        assert_eq!(doc.line_content(1), "foo (bar)");
        assert_eq!(sel, Selection::new(1, 6, 1, 9));
    }
}
