//! A rope-backed reference document.
//!
//! [`TextModel`] implements [`EditableDocument`] on top of `ropey::Rope`. Anchors,
//! decorations and the editable range are stored as character offsets and shifted on every
//! edit, so they keep pointing at the same text. Columns are converted to and from those
//! offsets through the rope's UTF-16 index.
//!
//! Edits are grouped for undo: everything replaced between two [`TextModel::push_stack_element`]
//! calls is undone together, and the cursor selections recorded when the group was opened are
//! handed back to the caller.

use crate::model::{
    AnchorId, DecorationId, DocumentModel, EditableDocument, LineSource, ModelDecoration, TextModelOptions,
};
use crate::position::{Position, Range, Selection};
use editor_cursor_lang::LanguageConfiguration;
use ropey::Rope;
use std::collections::BTreeMap;

/// Normalize every line break to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}' => out.push('\n'),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct AnchorEntry {
    offset: usize,
    stick_to_previous: bool,
}

#[derive(Debug, Clone, Copy)]
struct DecorationEntry {
    start: usize,
    end: usize,
    class_name: &'static str,
}

#[derive(Debug, Clone)]
struct EditOp {
    offset: usize,
    removed: String,
    inserted: String,
}

#[derive(Debug, Clone, Default)]
struct EditGroup {
    ops: Vec<EditOp>,
    cursors_before: Vec<Selection>,
}

/// Where a position ends up after `[start, end)` is replaced by `inserted` characters.
fn shift_offset(offset: usize, stick_to_previous: bool, start: usize, end: usize, inserted: usize) -> usize {
    if offset < start {
        offset
    } else if offset > end {
        offset - (end - start) + inserted
    } else if stick_to_previous {
        start
    } else {
        start + inserted
    }
}

/// A rope-backed document.
#[derive(Debug, Clone)]
pub struct TextModel {
    rope: Rope,
    options: TextModelOptions,
    language: LanguageConfiguration,
    anchors: BTreeMap<AnchorId, AnchorEntry>,
    next_anchor: u64,
    decorations: BTreeMap<DecorationId, DecorationEntry>,
    next_decoration: u64,
    editable: Option<(usize, usize)>,
    version_id: u64,
    open_group: Option<EditGroup>,
    undo_stack: Vec<EditGroup>,
    redo_stack: Vec<EditGroup>,
}

impl TextModel {
    /// Create a document from `text` with default options.
    pub fn new(text: &str, language: LanguageConfiguration) -> Self {
        Self::with_options(text, language, TextModelOptions::default())
    }

    /// Create a document with explicit indentation options.
    pub fn with_options(text: &str, language: LanguageConfiguration, options: TextModelOptions) -> Self {
        Self {
            rope: Rope::from_str(&normalize_line_endings(text)),
            options,
            language,
            anchors: BTreeMap::new(),
            next_anchor: 1,
            decorations: BTreeMap::new(),
            next_decoration: 1,
            editable: None,
            version_id: 1,
            open_group: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Incremented on every edit.
    pub fn version_id(&self) -> u64 {
        self.version_id
    }

    /// Replace the indentation options.
    pub fn set_options(&mut self, options: TextModelOptions) {
        self.options = options;
    }

    /// Replace the language configuration.
    pub fn set_language(&mut self, language: LanguageConfiguration) {
        self.language = language;
    }

    /// Constrain editing to `range`, or lift the constraint with `None`.
    ///
    /// The range grows when text is typed at its edges.
    pub fn set_editable_range(&mut self, range: Option<Range>) {
        self.editable = range.map(|range| {
            let range = self.validate_range(range);
            (self.offset_at(range.start()), self.offset_at(range.end()))
        });
    }

    /// Character offset of a position (clamped).
    pub fn offset_at(&self, position: Position) -> usize {
        let position = self.validate_position(position);
        let line_start = self.rope.char_to_utf16_cu(self.rope.line_to_char(position.line - 1));
        self.rope.utf16_cu_to_char(line_start + position.column - 1)
    }

    /// Position of a character offset (clamped).
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let line_start = self.rope.char_to_utf16_cu(self.rope.line_to_char(line));
        Position::new(line + 1, self.rope.char_to_utf16_cu(offset) - line_start + 1)
    }

    /// Open an undo group, remembering the cursor selections to restore on undo. No-op if a
    /// group is already open.
    pub fn begin_edit_group(&mut self, cursors_before: &[Selection]) {
        if self.open_group.is_none() {
            self.open_group = Some(EditGroup {
                ops: Vec::new(),
                cursors_before: cursors_before.to_vec(),
            });
        }
    }

    /// Close the open undo group.
    pub fn push_stack_element(&mut self) {
        if let Some(group) = self.open_group.take()
            && !group.ops.is_empty()
        {
            self.undo_stack.push(group);
        }
    }

    /// `true` if there is something to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.open_group.as_ref().is_some_and(|g| !g.ops.is_empty())
    }

    /// `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo the last group. Returns the selections recorded when it was opened.
    pub fn undo(&mut self) -> Option<Vec<Selection>> {
        self.push_stack_element();
        let group = self.undo_stack.pop()?;
        for op in group.ops.iter().rev() {
            let end = op.offset + op.inserted.chars().count();
            self.apply(op.offset, end, &op.removed);
        }
        let cursors = group.cursors_before.clone();
        self.redo_stack.push(group);
        Some(cursors)
    }

    /// Redo the last undone group. Returns a cursor at the end of its last edit.
    pub fn redo(&mut self) -> Option<Vec<Selection>> {
        self.push_stack_element();
        let group = self.redo_stack.pop()?;
        let mut last = 0;
        for op in &group.ops {
            let end = op.offset + op.removed.chars().count();
            self.apply(op.offset, end, &op.inserted);
            last = op.offset + op.inserted.chars().count();
        }
        self.undo_stack.push(group);
        Some(vec![Selection::collapsed(self.position_at(last))])
    }

    fn apply(&mut self, start: usize, end: usize, text: &str) -> usize {
        let inserted = text.chars().count();
        if end > start {
            self.rope.remove(start..end);
        }
        if inserted > 0 {
            self.rope.insert(start, text);
        }

        for anchor in self.anchors.values_mut() {
            anchor.offset = shift_offset(anchor.offset, anchor.stick_to_previous, start, end, inserted);
        }
        for decoration in self.decorations.values_mut() {
            decoration.start = shift_offset(decoration.start, false, start, end, inserted);
            decoration.end = shift_offset(decoration.end, true, start, end, inserted);
        }
        if let Some((a, b)) = self.editable {
            self.editable = Some((
                shift_offset(a, true, start, end, inserted),
                shift_offset(b, false, start, end, inserted),
            ));
        }
        self.version_id += 1;
        inserted
    }

    fn single_char_brackets(&self) -> Vec<(char, char)> {
        self.language
            .brackets()
            .iter()
            .filter_map(|b| {
                let mut open = b.open.chars();
                let mut close = b.close.chars();
                match (open.next(), open.next(), close.next(), close.next()) {
                    (Some(o), None, Some(c), None) => Some((o, c)),
                    _ => None,
                }
            })
            .collect()
    }

    fn char_range(&self, offset: usize) -> Range {
        Range::from_positions(self.position_at(offset), self.position_at(offset + 1))
    }

    /// Offset of the close bracket balancing an open bracket, scanning from `from`.
    fn find_close(&self, open: char, close: char, from: usize) -> Option<usize> {
        if from > self.rope.len_chars() {
            return None;
        }
        let mut depth = 1usize;
        for (i, ch) in self.rope.chars_at(from).enumerate() {
            if ch == open {
                depth += 1;
            } else if ch == close {
                depth -= 1;
                if depth == 0 {
                    return Some(from + i);
                }
            }
        }
        None
    }

    /// Offset of the open bracket balancing a close bracket at `before`.
    fn find_open(&self, open: char, close: char, before: usize) -> Option<usize> {
        if before > self.rope.len_chars() {
            return None;
        }
        let mut depth = 1usize;
        let mut chars = self.rope.chars_at(before);
        let mut offset = before;
        while let Some(ch) = chars.prev() {
            offset -= 1;
            if ch == close {
                depth += 1;
            } else if ch == open {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
        }
        None
    }

    fn match_bracket_at(&self, offset: usize, pairs: &[(char, char)]) -> Option<(Range, Range)> {
        let ch = self.rope.get_char(offset)?;
        pairs.iter().find_map(|&(open, close)| {
            if ch == open {
                let other = self.find_close(open, close, offset + 1)?;
                Some((self.char_range(offset), self.char_range(other)))
            } else if ch == close {
                let other = self.find_open(open, close, offset)?;
                Some((self.char_range(offset), self.char_range(other)))
            } else {
                None
            }
        })
    }
}

impl LineSource for TextModel {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_content(&self, line: usize) -> String {
        if line == 0 || line > self.rope.len_lines() {
            return String::new();
        }
        let mut text = self.rope.line(line - 1).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        text
    }

    fn line_max_column(&self, line: usize) -> usize {
        if line == 0 || line > self.rope.len_lines() {
            return 1;
        }
        let slice = self.rope.line(line - 1);
        let len = slice.len_chars();
        let newline = usize::from(len > 0 && slice.char(len - 1) == '\n');
        let start = self.rope.line_to_char(line - 1);
        let units = self.rope.char_to_utf16_cu(start + len - newline) - self.rope.char_to_utf16_cu(start);
        units + 1
    }
}

impl DocumentModel for TextModel {
    fn options(&self) -> TextModelOptions {
        self.options
    }

    fn language(&self) -> &LanguageConfiguration {
        &self.language
    }

    fn value_in_range(&self, range: Range) -> String {
        let range = self.validate_range(range);
        let start = self.offset_at(range.start());
        let end = self.offset_at(range.end());
        self.rope.slice(start..end).to_string()
    }

    fn create_anchor(&mut self, position: Position, stick_to_previous: bool) -> AnchorId {
        let id = AnchorId::new(self.next_anchor);
        self.next_anchor += 1;
        let offset = self.offset_at(position);
        self.anchors.insert(
            id,
            AnchorEntry {
                offset,
                stick_to_previous,
            },
        );
        id
    }

    fn change_anchor(&mut self, id: AnchorId, position: Position) {
        let offset = self.offset_at(position);
        if let Some(anchor) = self.anchors.get_mut(&id) {
            anchor.offset = offset;
        }
    }

    fn set_anchor_stickiness(&mut self, id: AnchorId, stick_to_previous: bool) {
        if let Some(anchor) = self.anchors.get_mut(&id) {
            anchor.stick_to_previous = stick_to_previous;
        }
    }

    fn resolve_anchor(&self, id: AnchorId) -> Option<Position> {
        self.anchors.get(&id).map(|a| self.position_at(a.offset))
    }

    fn remove_anchor(&mut self, id: AnchorId) {
        self.anchors.remove(&id);
    }

    fn match_bracket(&self, position: Position) -> Option<(Range, Range)> {
        let pairs = self.single_char_brackets();
        if pairs.is_empty() {
            return None;
        }
        let position = self.validate_position(position);
        let offset = self.offset_at(position);
        // Prefer the bracket before the cursor.
        let before = if position.column > 1 {
            self.match_bracket_at(offset - 1, &pairs)
        } else {
            None
        };
        before.or_else(|| {
            if position.column < self.line_max_column(position.line) {
                self.match_bracket_at(offset, &pairs)
            } else {
                None
            }
        })
    }

    fn find_matching_bracket_up(&self, bracket: &str, position: Position) -> Option<Range> {
        let (open, close) = self
            .single_char_brackets()
            .into_iter()
            .find(|&(_, close)| bracket.chars().eq(std::iter::once(close)))?;
        let offset = self.offset_at(position);
        self.find_open(open, close, offset).map(|o| self.char_range(o))
    }

    fn delta_decorations(&mut self, old: &[DecorationId], new: &[ModelDecoration]) -> Vec<DecorationId> {
        for id in old {
            self.decorations.remove(id);
        }
        new.iter()
            .map(|decoration| {
                let id = DecorationId::new(self.next_decoration);
                self.next_decoration += 1;
                let range = self.validate_range(decoration.range);
                let entry = DecorationEntry {
                    start: self.offset_at(range.start()),
                    end: self.offset_at(range.end()),
                    class_name: decoration.class_name,
                };
                self.decorations.insert(id, entry);
                id
            })
            .collect()
    }

    fn decoration_range(&self, id: DecorationId) -> Option<Range> {
        self.decorations
            .get(&id)
            .map(|d| Range::from_positions(self.position_at(d.start), self.position_at(d.end)))
    }

    fn editable_range(&self) -> Range {
        match self.editable {
            Some((start, end)) => Range::from_positions(self.position_at(start), self.position_at(end)),
            None => self.full_model_range(),
        }
    }

    fn has_editable_range(&self) -> bool {
        self.editable.is_some()
    }
}

impl TextModel {
    /// Decorations of the given class, in document order.
    pub fn decorations_with_class(&self, class_name: &str) -> Vec<Range> {
        let mut ranges: Vec<Range> = self
            .decorations
            .values()
            .filter(|d| d.class_name == class_name)
            .map(|d| Range::from_positions(self.position_at(d.start), self.position_at(d.end)))
            .collect();
        ranges.sort_by_key(|r| r.start());
        ranges
    }
}

impl EditableDocument for TextModel {
    fn replace(&mut self, range: Range, text: &str) -> Range {
        let range = self.validate_range(range);
        let start = self.offset_at(range.start());
        let end = self.offset_at(range.end());
        let text = normalize_line_endings(text);
        let removed = self.rope.slice(start..end).to_string();

        let inserted = self.apply(start, end, &text);

        let group = self.open_group.get_or_insert_with(EditGroup::default);
        group.ops.push(EditOp {
            offset: start,
            removed,
            inserted: text,
        });
        self.redo_stack.clear();

        Range::from_positions(self.position_at(start), self.position_at(start + inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lines_and_line_endings() {
        let model = TextModel::new("a\r\nbc\rd\n", LanguageConfiguration::plain());
        assert_eq!(model.line_count(), 4);
        assert_eq!(model.line_content(2), "bc");
        assert_eq!(model.line_content(4), "");
        assert_eq!(model.line_max_column(2), 3);
        assert_eq!(model.line_max_column(4), 1);
        assert_eq!(model.value_in_range(Range::new(1, 1, 2, 3)), "a\nbc");
    }

    #[test]
    fn test_columns_are_utf16_code_units() {
        let mut model = TextModel::new("😀x\nab", LanguageConfiguration::plain());
        assert_eq!(model.line_max_column(1), 4);
        assert_eq!(model.offset_at(Position::new(1, 3)), 1);
        assert_eq!(model.position_at(1), Position::new(1, 3));
        assert_eq!(model.position_at(3), Position::new(2, 1));
        // Inside the surrogate pair: snapped to its start.
        assert_eq!(model.validate_position(Position::new(1, 2)), Position::new(1, 1));

        let range = model.replace(Range::new(1, 3, 1, 4), "😀");
        assert_eq!(range, Range::new(1, 3, 1, 5));
        assert_eq!(model.line_content(1), "😀😀");
        assert_eq!(model.value_in_range(Range::new(1, 1, 1, 3)), "😀");
    }

    #[test]
    fn test_anchor_stickiness() {
        let mut model = TextModel::new("abc", LanguageConfiguration::plain());
        let sticky = model.create_anchor(Position::new(1, 2), true);
        let loose = model.create_anchor(Position::new(1, 2), false);
        let after = model.create_anchor(Position::new(1, 3), false);

        model.replace(Range::new(1, 2, 1, 2), "XY");
        assert_eq!(model.line_content(1), "aXYbc");
        assert_eq!(model.resolve_anchor(sticky), Some(Position::new(1, 2)));
        assert_eq!(model.resolve_anchor(loose), Some(Position::new(1, 4)));
        assert_eq!(model.resolve_anchor(after), Some(Position::new(1, 5)));

        model.replace(Range::new(1, 1, 1, 6), "");
        assert_eq!(model.resolve_anchor(after), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_match_bracket() {
        let model = TextModel::new("f(a[1]) {\n}", LanguageConfiguration::c_like());
        let (at, other) = model.match_bracket(Position::new(1, 3)).unwrap();
        assert_eq!(at, Range::new(1, 2, 1, 3));
        assert_eq!(other, Range::new(1, 7, 1, 8));

        let (_, other) = model.match_bracket(Position::new(2, 1)).unwrap();
        assert_eq!(other, Range::new(1, 9, 1, 10));

        assert_eq!(
            model.find_matching_bracket_up("}", Position::new(2, 1)),
            Some(Range::new(1, 9, 1, 10))
        );
    }

    #[test]
    fn test_undo_restores_text_and_cursors() {
        let mut model = TextModel::new("hello", LanguageConfiguration::plain());
        let before = vec![Selection::collapsed(Position::new(1, 6))];
        model.begin_edit_group(&before);
        model.replace(Range::new(1, 6, 1, 6), " world");
        model.replace(Range::new(1, 1, 1, 2), "H");
        model.push_stack_element();
        assert_eq!(model.text(), "Hello world");

        assert_eq!(model.undo(), Some(before));
        assert_eq!(model.text(), "hello");
        assert!(model.can_redo());
        model.redo();
        assert_eq!(model.text(), "Hello world");
    }

    #[test]
    fn test_editable_range_grows_at_edges() {
        let mut model = TextModel::new("a\nb\nc\nd", LanguageConfiguration::plain());
        model.set_editable_range(Some(Range::new(2, 1, 3, 2)));
        model.replace(Range::new(3, 2, 3, 2), "!");
        assert!(model.has_editable_range());
        assert_eq!(model.editable_range(), Range::new(2, 1, 3, 3));
    }
}
