//! Capabilities the cursor engine requires from its host document.
//!
//! - [`LineSource`]: read-only line access, implemented by both the document and view adapters,
//!   and consumed by the movement helper.
//! - [`DocumentModel`]: the full document surface: validation, indentation options, anchors,
//!   bracket matching, decorations, constrained editing and language lookups.
//! - [`EditableDocument`]: adds the single mutation primitive used by the edit executor.
//!
//! Cursor logic only ever holds opaque [`AnchorId`] / [`DecorationId`] handles, never raw
//! offsets, for state that must survive edits.

use crate::indentation::{self, leading_whitespace};
use crate::position::{
    Position, Range, byte_index_at_column, column_at_byte_index, text_before_column, text_from_column,
    utf16_len,
};
use editor_cursor_lang::{ElectricAction, IndentAction, LanguageConfiguration, StandardTokenType};

/// Opaque handle to a document anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(u64);

impl AnchorId {
    /// Wrap a host-allocated id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-allocated id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a document decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(u64);

impl DecorationId {
    /// Wrap a host-allocated id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-allocated id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A decoration to publish through [`DocumentModel::delta_decorations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDecoration {
    /// Decorated range.
    pub range: Range,
    /// Style class understood by the renderer.
    pub class_name: &'static str,
}

/// Indentation options of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextModelOptions {
    /// Width of a tab stop, in columns.
    pub tab_size: usize,
    /// Whether one indent unit is spaces rather than a tab.
    pub insert_spaces: bool,
}

impl Default for TextModelOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
        }
    }
}

/// The enter action of the language, resolved against a concrete line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnterAction {
    /// Indentation behaviour.
    pub indent_action: IndentAction,
    /// Text to append after the indentation (defaults already applied).
    pub append_text: String,
    /// Indentation of the line being split, capped at the split column.
    pub indentation: String,
}

/// Read-only line access in one coordinate space.
pub trait LineSource {
    /// Number of lines (at least 1).
    fn line_count(&self) -> usize;

    /// Content of `line`, without line terminator.
    fn line_content(&self, line: usize) -> String;

    /// Smallest valid column on `line`.
    fn line_min_column(&self, _line: usize) -> usize {
        1
    }

    /// Largest valid column on `line`.
    fn line_max_column(&self, line: usize) -> usize {
        utf16_len(&self.line_content(line)) + 1
    }

    /// Column of the first non-whitespace character, or `0` if the line is blank.
    fn line_first_non_whitespace_column(&self, line: usize) -> usize {
        indentation::first_non_whitespace_index(&self.line_content(line)).map_or(0, |i| i + 1)
    }

    /// Column after the last non-whitespace character, or `0` if the line is blank.
    fn line_last_non_whitespace_column(&self, line: usize) -> usize {
        indentation::last_non_whitespace_end(&self.line_content(line), None).map_or(0, |end| end + 1)
    }
}

/// The host document as seen by cursor logic.
pub trait DocumentModel: LineSource {
    /// Indentation options.
    fn options(&self) -> TextModelOptions;

    /// Language configuration of the document.
    fn language(&self) -> &LanguageConfiguration;

    /// Text covered by `range`, with `\n` between lines.
    fn value_in_range(&self, range: Range) -> String;

    /// Create an anchor at `position`. With `stick_to_previous`, text inserted exactly at the
    /// anchor ends up after it.
    fn create_anchor(&mut self, position: Position, stick_to_previous: bool) -> AnchorId;

    /// Move an anchor.
    fn change_anchor(&mut self, id: AnchorId, position: Position);

    /// Change an anchor's stickiness.
    fn set_anchor_stickiness(&mut self, id: AnchorId, stick_to_previous: bool);

    /// Current position of an anchor.
    fn resolve_anchor(&self, id: AnchorId) -> Option<Position>;

    /// Release an anchor.
    fn remove_anchor(&mut self, id: AnchorId);

    /// The bracket touching `position` and its counterpart.
    fn match_bracket(&self, position: Position) -> Option<(Range, Range)>;

    /// The opening bracket matching the closing `bracket` that starts at `position`.
    fn find_matching_bracket_up(&self, bracket: &str, position: Position) -> Option<Range>;

    /// Replace the decorations `old` with `new`, returning the ids of the new ones.
    fn delta_decorations(
        &mut self,
        old: &[DecorationId],
        new: &[ModelDecoration],
    ) -> Vec<DecorationId>;

    /// Current range of a decoration.
    fn decoration_range(&self, id: DecorationId) -> Option<Range>;

    /// Token context at `position`.
    fn token_type_at(&self, position: Position) -> StandardTokenType {
        let line = self.line_content(position.line);
        let offset = text_before_column(&line, position.column).chars().count();
        self.language().token_type_at(&line, offset)
    }

    /// The range the user may edit.
    fn editable_range(&self) -> Range {
        self.full_model_range()
    }

    /// `true` if editing is constrained to a sub-range.
    fn has_editable_range(&self) -> bool {
        false
    }

    /// Range covering the whole document.
    fn full_model_range(&self) -> Range {
        let last = self.line_count().max(1);
        Range::new(1, 1, last, self.line_max_column(last))
    }

    /// Clamp `position` to the document. A column between the halves of a surrogate pair moves
    /// to the start of the pair.
    fn validate_position(&self, position: Position) -> Position {
        let line = position.line.clamp(1, self.line_count().max(1));
        let column = position
            .column
            .clamp(self.line_min_column(line), self.line_max_column(line));
        let content = self.line_content(line);
        let column = column_at_byte_index(&content, byte_index_at_column(&content, column));
        Position::new(line, column.max(self.line_min_column(line)))
    }

    /// Clamp both ends of `range` to the document.
    fn validate_range(&self, range: Range) -> Range {
        Range::from_positions(
            self.validate_position(range.start()),
            self.validate_position(range.end()),
        )
    }

    /// One indent unit.
    fn one_indent(&self) -> String {
        let options = self.options();
        indentation::one_indent(options.tab_size, options.insert_spaces)
    }

    /// Rewrite the leading whitespace of `text` according to the options.
    fn normalize_indentation(&self, text: &str) -> String {
        let options = self.options();
        indentation::normalize_indentation(text, options.tab_size, options.insert_spaces)
    }

    /// The enter action for splitting the document at `range`.
    fn enter_action_at(&self, range: Range) -> ResolvedEnterAction {
        let line = self.line_content(range.start_line);
        let split = range.start_column.saturating_sub(1);

        let mut indentation: String = leading_whitespace(&line).chars().take(split).collect();
        let before = text_before_column(&line, range.start_column);
        let end_line = if range.end_line == range.start_line {
            line.clone()
        } else {
            self.line_content(range.end_line)
        };
        let after = text_from_column(&end_line, range.end_column);
        let above = if range.start_line > 1 {
            self.line_content(range.start_line - 1)
        } else {
            String::new()
        };

        let action = self.language().on_enter(&above, before, after);
        let (indent_action, append_text, remove_text) = match action {
            Some(action) => {
                let append = action.append_text.unwrap_or_else(|| match action.indent_action {
                    IndentAction::Indent | IndentAction::IndentOutdent => "\t".to_string(),
                    IndentAction::None | IndentAction::Outdent => String::new(),
                });
                (action.indent_action, append, action.remove_text)
            }
            None => (IndentAction::None, String::new(), 0),
        };

        if remove_text > 0 {
            let keep = indentation.chars().count().saturating_sub(remove_text);
            indentation = indentation.chars().take(keep).collect();
        }

        ResolvedEnterAction {
            indent_action,
            append_text,
            indentation,
        }
    }

    /// Whether typing `open` at `position` should auto-close.
    fn should_auto_close_pair(&self, open: char, position: Position) -> bool {
        self.language()
            .should_auto_close_pair(open, self.token_type_at(position))
    }

    /// The electric action for the character just typed before `position`.
    fn on_electric_character(&self, position: Position) -> Option<ElectricAction> {
        let line = self.line_content(position.line);
        let offset = text_before_column(&line, position.column).chars().count().checked_sub(1)?;
        self.language().on_electric_character(&line, offset)
    }
}

/// A document that accepts edits.
pub trait EditableDocument: DocumentModel {
    /// Replace `range` with `text` as one edit and return the range of the inserted text.
    fn replace(&mut self, range: Range, text: &str) -> Range;
}
