//! Cursor operations.
//!
//! Every operation takes one [`OneCursor`], the borrowed [`CursorHost`] and a fresh
//! [`OperationContext`]. Movement operations update the cursor directly. Editing operations
//! leave the cursor alone and describe the edit in [`OperationContext::execute_command`];
//! the edit executor applies it afterwards.
//!
//! The result tells the caller whether the operation applied:
//!
//! - [`OperationResult::Handled`] with no command: considered and deliberately a no-op (e.g.
//!   delete-left at the start of the document)
//! - [`OperationResult::NotApplicable`]: the operation does not apply; the caller may try
//!   something else
//!
//! # Example
//!
//! ```rust
//! use editor_cursor::operations::{self, CursorOperation, OperationContext};
//! use editor_cursor::{CursorHost, IdentityViewModel, OneCursor, Position, TextModel, WordNavigationType};
//! use editor_cursor_lang::LanguageConfiguration;
//! use std::sync::Arc;
//!
//! let mut model = TextModel::new("hello world", LanguageConfiguration::plain());
//! let view = IdentityViewModel::default();
//! let mut host = CursorHost::new(&mut model, &view);
//! let mut cursor = OneCursor::new(&mut host, Arc::default(), Arc::default());
//!
//! let mut ctx = OperationContext::new();
//! operations::execute(
//!     &mut cursor,
//!     &mut host,
//!     &CursorOperation::MoveWordRight { select: false, word_navigation: WordNavigationType::WordEnd },
//!     &mut ctx,
//! )
//! .unwrap();
//! assert_eq!(cursor.position(), Position::new(1, 6));
//! ```

mod column;
mod delete;
mod indent;
mod moves;
mod typing;

pub use typing::{TYPE_INTERCEPTORS, TypeInterceptor};

use crate::commands::TextCommand;
use crate::cursor::{CursorHost, OneCursor};
use crate::error::CursorError;
use crate::position::{Position, Selection};
use crate::words::WordNavigationType;
use serde::Deserialize;
use tracing::trace;

/// Whether an operation applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// The operation was considered; the context describes its outcome (possibly nothing).
    Handled,
    /// The operation does not apply here.
    NotApplicable,
}

impl OperationResult {
    /// `true` for [`OperationResult::Handled`].
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }
}

/// Why the cursor moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorChangeReason {
    /// Unknown or not set.
    #[default]
    NotSet,
    /// The document content was replaced wholesale.
    ContentFlush,
    /// The selection was rebuilt from document anchors after an edit.
    RecoverFromMarkers,
    /// A user gesture (mouse or explicit selection command).
    Explicit,
    /// A paste.
    Paste,
    /// An undo.
    Undo,
    /// A redo.
    Redo,
}

/// Corner of a column selection: a view line and a 0-based visible column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSelectTarget {
    /// View line.
    pub line: usize,
    /// Visible column.
    pub visual_column: usize,
}

/// Runs after the edit of an operation has been applied and the cursor recovered.
pub type PostEditHook = fn(&OneCursor, &CursorHost<'_>, &mut OperationContext) -> OperationResult;

/// The outcome of one operation on one cursor.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Why the cursor moved.
    pub cursor_change_reason: CursorChangeReason,
    /// Scroll the cursor into view vertically.
    pub should_reveal: bool,
    /// Scroll the cursor into view horizontally.
    pub should_reveal_horizontal: bool,
    /// Close the undo group before the edit.
    pub should_push_stack_element_before: bool,
    /// Close the undo group after the edit.
    pub should_push_stack_element_after: bool,
    /// The edit to apply.
    pub execute_command: Option<TextCommand>,
    /// The edit only inserts indentation that may be trimmed once the cursor leaves the line.
    pub is_auto_whitespace_command: bool,
    /// Follow-up that runs after the edit.
    pub post_edit: Option<PostEditHook>,
    /// Fixed corner of the column selection. Derived from the cursor when not set.
    pub column_select_from: Option<ColumnSelectTarget>,
    /// Moving corner of the column selection. Read as the current corner, written as the new one.
    pub column_select_to: Option<ColumnSelectTarget>,
    /// Column selection result in view coordinates. Replaces all cursors when set.
    pub view_selections: Option<Vec<Selection>>,
    /// The column selection was dragged upwards.
    pub reversed: bool,
}

impl Default for OperationContext {
    fn default() -> Self {
        Self {
            cursor_change_reason: CursorChangeReason::NotSet,
            should_reveal: true,
            should_reveal_horizontal: true,
            should_push_stack_element_before: false,
            should_push_stack_element_after: false,
            execute_command: None,
            is_auto_whitespace_command: false,
            post_edit: None,
            column_select_from: None,
            column_select_to: None,
            view_selections: None,
            reversed: false,
        }
    }
}

impl OperationContext {
    /// A fresh context.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Target of a [`CursorMoveArguments`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveTarget {
    /// Characters to the left.
    Left,
    /// Characters to the right.
    Right,
    /// Lines up.
    Up,
    /// Lines down.
    Down,
    /// Start of the wrapped line.
    WrappedLineStart,
    /// First non-whitespace character of the wrapped line.
    WrappedLineFirstNonWhitespaceCharacter,
    /// Middle of the wrapped line.
    WrappedLineColumnCenter,
    /// End of the wrapped line.
    WrappedLineEnd,
    /// After the last non-whitespace character of the wrapped line.
    WrappedLineLastNonWhitespaceCharacter,
    /// Top of the viewport.
    ViewPortTop,
    /// Middle of the viewport.
    ViewPortCenter,
    /// Bottom of the viewport.
    ViewPortBottom,
    /// Into the viewport, only if the cursor is outside of it.
    ViewPortIfOutside,
}

/// Unit of a [`CursorMoveArguments`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveUnit {
    /// Model lines.
    Line,
    /// View (wrapped) lines.
    WrappedLine,
    /// Characters.
    #[default]
    Character,
    /// Half of the current line.
    HalfLine,
}

/// The `cursorMove` argument bag, as decoded from a keybinding or an API call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CursorMoveArguments {
    /// Target. Required.
    pub to: Option<MoveTarget>,
    /// Unit.
    pub by: Option<MoveUnit>,
    /// Repeat count (defaults to 1).
    pub value: Option<usize>,
    /// Extend the selection.
    pub select: bool,
}

/// Validated [`CursorMoveArguments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedMove {
    /// Target.
    pub to: MoveTarget,
    /// Unit; `None` when not given.
    pub by: Option<MoveUnit>,
    /// Repeat count, at least 1.
    pub value: usize,
    /// Extend the selection.
    pub select: bool,
}

impl CursorMoveArguments {
    /// Check that a target was given and clamp the repeat count.
    pub fn parse(&self) -> Result<ParsedMove, CursorError> {
        let to = self
            .to
            .ok_or(CursorError::IllegalArgument("cursor move requires `to`"))?;
        Ok(ParsedMove {
            to,
            by: self.by,
            value: self.value.unwrap_or(1).max(1),
            select: self.select,
        })
    }
}

/// An abstract operation request for one cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorOperation {
    /// Place the cursor (mouse click or API).
    MoveTo {
        /// Extend the selection.
        select: bool,
        /// Model position.
        position: Position,
        /// View position hint, as reported by the renderer.
        view_position: Option<Position>,
    },
    /// Generic move request.
    Move(CursorMoveArguments),
    /// One character left.
    MoveLeft {
        /// Extend the selection.
        select: bool,
    },
    /// One character right.
    MoveRight {
        /// Extend the selection.
        select: bool,
    },
    /// One view line up.
    MoveUp {
        /// Extend the selection.
        select: bool,
    },
    /// One view line down.
    MoveDown {
        /// Extend the selection.
        select: bool,
    },
    /// One page up.
    PageUp {
        /// Extend the selection.
        select: bool,
    },
    /// One page down.
    PageDown {
        /// Extend the selection.
        select: bool,
    },
    /// Previous word boundary.
    MoveWordLeft {
        /// Extend the selection.
        select: bool,
        /// Stop at word starts or word ends.
        word_navigation: WordNavigationType,
    },
    /// Next word boundary.
    MoveWordRight {
        /// Extend the selection.
        select: bool,
        /// Stop at word starts or word ends.
        word_navigation: WordNavigationType,
    },
    /// Home.
    MoveToBeginningOfLine {
        /// Extend the selection.
        select: bool,
    },
    /// End.
    MoveToEndOfLine {
        /// Extend the selection.
        select: bool,
    },
    /// Start of the document.
    MoveToBeginningOfBuffer {
        /// Extend the selection.
        select: bool,
    },
    /// End of the document.
    MoveToEndOfBuffer {
        /// Extend the selection.
        select: bool,
    },
    /// Move both ends of the selection one line up.
    TranslateUp,
    /// Move both ends of the selection one line down.
    TranslateDown,
    /// Select whole lines, one more per invocation.
    ExpandLineSelection,
    /// Select the editable range, then everything.
    SelectAll,
    /// Line selection by click (triple click or gutter).
    Line {
        /// Continue an existing line selection.
        select: bool,
        /// Model position.
        position: Position,
        /// View position hint.
        view_position: Option<Position>,
    },
    /// Word selection by double click.
    Word {
        /// Continue an existing word selection.
        select: bool,
        /// Model position.
        position: Position,
    },
    /// Collapse the selection.
    CancelSelection,
    /// Jump to the matching bracket.
    JumpToBracket,
    /// Column selection by mouse drag.
    ColumnSelectMouse {
        /// Model position under the mouse.
        position: Position,
        /// View position hint.
        view_position: Option<Position>,
        /// Visible column under the mouse.
        to_visual_column: usize,
    },
    /// Grow the column selection one column left.
    ColumnSelectLeft,
    /// Grow the column selection one column right.
    ColumnSelectRight,
    /// Grow the column selection up.
    ColumnSelectUp {
        /// By a page instead of a line.
        page: bool,
    },
    /// Grow the column selection down.
    ColumnSelectDown {
        /// By a page instead of a line.
        page: bool,
    },
    /// Type one character through the interceptor chain.
    Type {
        /// The character.
        ch: char,
    },
    /// Insert text as is.
    TypeWithoutInterceptors {
        /// Inserted text.
        text: String,
    },
    /// Replace characters before the cursor (composition input).
    ReplacePreviousChar {
        /// Replacement text.
        text: String,
        /// Number of characters before the cursor to replace.
        replace_char_count: usize,
    },
    /// Paste.
    Paste {
        /// Pasted text.
        text: String,
        /// The text was copied from an empty selection (a whole line).
        paste_on_new_line: bool,
    },
    /// Tab key.
    Tab,
    /// Indent the selected lines.
    Indent,
    /// Outdent the selected lines.
    Outdent,
    /// Open a line above.
    LineInsertBefore,
    /// Open a line below.
    LineInsertAfter,
    /// Split the line without moving the cursor.
    LineBreakInsert,
    /// Backspace.
    DeleteLeft,
    /// Delete.
    DeleteRight,
    /// Delete to the previous word boundary.
    DeleteWordLeft {
        /// Delete a run of whitespace first.
        whitespace_heuristics: bool,
        /// Stop at word starts or word ends.
        word_navigation: WordNavigationType,
    },
    /// Delete to the next word boundary.
    DeleteWordRight {
        /// Delete a run of whitespace first.
        whitespace_heuristics: bool,
        /// Stop at word starts or word ends.
        word_navigation: WordNavigationType,
    },
    /// Delete to the start of the line.
    DeleteAllLeft,
    /// Delete to the end of the line.
    DeleteAllRight,
    /// Cut.
    Cut,
}

impl CursorOperation {
    /// `true` for column selection requests.
    pub fn is_column_select(&self) -> bool {
        matches!(
            self,
            Self::ColumnSelectMouse { .. }
                | Self::ColumnSelectLeft
                | Self::ColumnSelectRight
                | Self::ColumnSelectUp { .. }
                | Self::ColumnSelectDown { .. }
        )
    }
}

/// Run `op` on `cursor`.
pub fn execute(
    cursor: &mut OneCursor,
    host: &mut CursorHost<'_>,
    op: &CursorOperation,
    ctx: &mut OperationContext,
) -> Result<OperationResult, CursorError> {
    trace!(?op, position = %cursor.position(), "cursor operation");
    use CursorOperation as Op;

    let result = match op {
        Op::MoveTo {
            select,
            position,
            view_position,
        } => moves::move_to(cursor, host, *select, *position, *view_position, ctx),
        Op::Move(args) => moves::move_with_arguments(cursor, host, &args.parse()?, ctx),
        Op::MoveLeft { select } => moves::move_left(cursor, host, *select, 1, ctx),
        Op::MoveRight { select } => moves::move_right(cursor, host, *select, 1, ctx),
        Op::MoveUp { select } => moves::move_up_by_view_lines(cursor, host, *select, 1, ctx),
        Op::MoveDown { select } => moves::move_down_by_view_lines(cursor, host, *select, 1, ctx),
        Op::PageUp { select } => {
            let page = host.view.page_size();
            moves::move_up_by_view_lines(cursor, host, *select, page, ctx)
        }
        Op::PageDown { select } => {
            let page = host.view.page_size();
            moves::move_down_by_view_lines(cursor, host, *select, page, ctx)
        }
        Op::MoveWordLeft {
            select,
            word_navigation,
        } => moves::move_word_left(cursor, host, *select, *word_navigation, ctx),
        Op::MoveWordRight {
            select,
            word_navigation,
        } => moves::move_word_right(cursor, host, *select, *word_navigation, ctx),
        Op::MoveToBeginningOfLine { select } => moves::move_to_beginning_of_line(cursor, host, *select, ctx),
        Op::MoveToEndOfLine { select } => moves::move_to_end_of_line(cursor, host, *select, ctx),
        Op::MoveToBeginningOfBuffer { select } => moves::move_to_beginning_of_buffer(cursor, host, *select, ctx),
        Op::MoveToEndOfBuffer { select } => moves::move_to_end_of_buffer(cursor, host, *select, ctx),
        Op::TranslateUp => moves::translate_up(cursor, host, ctx),
        Op::TranslateDown => moves::translate_down(cursor, host, ctx),
        Op::ExpandLineSelection => moves::expand_line_selection(cursor, host, ctx),
        Op::SelectAll => moves::select_all(cursor, host, ctx),
        Op::Line {
            select,
            position,
            view_position,
        } => moves::line(cursor, host, *select, *position, *view_position, ctx),
        Op::Word { select, position } => moves::word(cursor, host, *select, *position, ctx),
        Op::CancelSelection => moves::cancel_selection(cursor, host, ctx),
        Op::JumpToBracket => moves::jump_to_bracket(cursor, host, ctx),
        Op::ColumnSelectMouse {
            position,
            view_position,
            to_visual_column,
        } => column::column_select_mouse(cursor, host, *position, *view_position, *to_visual_column, ctx),
        Op::ColumnSelectLeft => column::column_select_left(cursor, host, ctx),
        Op::ColumnSelectRight => column::column_select_right(cursor, host, ctx),
        Op::ColumnSelectUp { page } => column::column_select_up(cursor, host, *page, ctx),
        Op::ColumnSelectDown { page } => column::column_select_down(cursor, host, *page, ctx),
        Op::Type { ch } => typing::type_char(cursor, host, *ch, ctx),
        Op::TypeWithoutInterceptors { text } => typing::actual_type(cursor, text, false, ctx),
        Op::ReplacePreviousChar {
            text,
            replace_char_count,
        } => typing::replace_previous_char(cursor, text, *replace_char_count, ctx),
        Op::Paste {
            text,
            paste_on_new_line,
        } => typing::paste(cursor, host, text, *paste_on_new_line, ctx),
        Op::Tab => indent::tab(cursor, host, ctx),
        Op::Indent => indent::indent(cursor, host, ctx),
        Op::Outdent => indent::outdent(cursor, host, ctx),
        Op::LineInsertBefore => typing::line_insert_before(cursor, host, ctx),
        Op::LineInsertAfter => typing::line_insert_after(cursor, host, ctx),
        Op::LineBreakInsert => typing::line_break_insert(cursor, host, ctx),
        Op::DeleteLeft => delete::delete_left(cursor, host, ctx),
        Op::DeleteRight => delete::delete_right(cursor, host, ctx),
        Op::DeleteWordLeft {
            whitespace_heuristics,
            word_navigation,
        } => delete::delete_word_left(cursor, host, *whitespace_heuristics, *word_navigation, ctx),
        Op::DeleteWordRight {
            whitespace_heuristics,
            word_navigation,
        } => delete::delete_word_right(cursor, host, *whitespace_heuristics, *word_navigation, ctx),
        Op::DeleteAllLeft => delete::delete_all_left(cursor, host, ctx),
        Op::DeleteAllRight => delete::delete_all_right(cursor, host, ctx),
        Op::Cut => delete::cut(cursor, host, ctx),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_arguments_require_to() {
        let args: CursorMoveArguments = serde_json::from_str(r#"{ "by": "line" }"#).unwrap();
        assert_eq!(
            args.parse(),
            Err(CursorError::IllegalArgument("cursor move requires `to`"))
        );
    }

    #[test]
    fn test_move_arguments_decode() {
        let args: CursorMoveArguments =
            serde_json::from_str(r#"{ "to": "down", "by": "wrappedLine", "value": 3, "select": true }"#)
                .unwrap();
        assert_eq!(
            args.parse().unwrap(),
            ParsedMove {
                to: MoveTarget::Down,
                by: Some(MoveUnit::WrappedLine),
                value: 3,
                select: true,
            }
        );

    }

    #[test]
    fn test_move_arguments_reject_unknown_names() {
        let err = serde_json::from_str::<CursorMoveArguments>(r#"{ "to": "sideways" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown variant `sideways`"), "{err}");
        assert!(serde_json::from_str::<CursorMoveArguments>(r#"{ "to": "up", "by": "page" }"#).is_err());

        let args: CursorMoveArguments =
            serde_json::from_str(r#"{ "to": "wrappedLineFirstNonWhitespaceCharacter", "value": 0 }"#).unwrap();
        let parsed = args.parse().unwrap();
        assert_eq!(parsed.to, MoveTarget::WrappedLineFirstNonWhitespaceCharacter);
        assert_eq!(parsed.by, None);
        assert_eq!(parsed.value, 1);
    }

    #[test]
    fn test_default_context_reveals() {
        let ctx = OperationContext::new();
        assert!(ctx.should_reveal);
        assert!(ctx.execute_command.is_none());
        assert!(!OperationResult::NotApplicable.is_handled());
    }
}
