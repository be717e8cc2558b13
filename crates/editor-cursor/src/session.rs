//! Multi-cursor editing session.
//!
//! [`EditorSession`] is the reference edit executor: it owns a [`TextModel`], a
//! [`WrappedViewModel`] and the cursor list, and runs every [`CursorOperation`] over all
//! cursors.
//!
//! - Cursors run in document order. A cursor whose text was shifted by an earlier cursor's
//!   edit is re-anchored from its markers before it runs.
//! - Each produced [`TextCommand`] is applied immediately, the cursor takes the selection the
//!   command computes, and the post-edit hook (electric characters) runs afterwards.
//! - After the batch, overlapping cursors are merged, whitespace left behind by
//!   auto-indentation is trimmed from lines no cursor is on, and bracket-match decorations are
//!   republished.
//!
//! # Example
//!
//! ```rust
//! use editor_cursor::operations::CursorOperation;
//! use editor_cursor::{EditorOptions, EditorSession, Position, Selection};
//! use editor_cursor_lang::LanguageConfiguration;
//!
//! let mut session =
//!     EditorSession::new("fn main() ", LanguageConfiguration::c_like(), EditorOptions::default()).unwrap();
//! session.set_selections(&[Selection::collapsed(Position::new(1, 11))]);
//! session.type_text("{").unwrap();
//! assert_eq!(session.text(), "fn main() {}");
//!
//! session.execute(CursorOperation::Type { ch: '\n' }).unwrap();
//! assert_eq!(session.text(), "fn main() {\n    \n}");
//! assert_eq!(session.primary_selection(), Selection::collapsed(Position::new(2, 5)));
//! ```

use crate::commands::TextCommand;
use crate::config::{CursorConfiguration, EditorOptions, ModeConfiguration};
use crate::cursor::{BRACKET_MATCH_CLASS, CursorHost, OneCursor};
use crate::error::CursorError;
use crate::indentation::is_whitespace_only;
use crate::model::{AnchorId, DocumentModel, EditableDocument, LineSource};
use crate::operations::{
    self, ColumnSelectTarget, CursorChangeReason, CursorOperation, OperationContext, OperationResult,
};
use crate::position::{Position, Range, Selection, SelectionDirection};
use crate::text_model::TextModel;
use crate::view::{ViewModelHelper, Viewport};
use crate::wrapping::{WrapOptions, WrappedViewModel};
use editor_cursor_lang::LanguageConfiguration;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A document, its wrapped view and a set of cursors.
#[derive(Debug)]
pub struct EditorSession {
    model: TextModel,
    view: WrappedViewModel,
    options: EditorOptions,
    config: Arc<CursorConfiguration>,
    mode: Arc<ModeConfiguration>,
    cursors: Vec<OneCursor>,
    primary: usize,
    column_select: Option<(ColumnSelectTarget, ColumnSelectTarget)>,
    auto_whitespace: Vec<AnchorId>,
    last_reason: CursorChangeReason,
    reveal: bool,
}

impl EditorSession {
    /// Open a session on `text` with one cursor at the start of the document.
    pub fn new(text: &str, language: LanguageConfiguration, options: EditorOptions) -> Result<Self, CursorError> {
        let config = Arc::new(CursorConfiguration::new(&options)?);
        let mode = Arc::new(ModeConfiguration::from_language(&language));
        let mut model = TextModel::with_options(text, language, options.model_options());
        let view = WrappedViewModel::new(&model, WrapOptions::default(), options.tab_size);

        let cursor = {
            let mut host = CursorHost::new(&mut model, &view);
            OneCursor::new(&mut host, Arc::clone(&config), Arc::clone(&mode))
        };

        Ok(Self {
            model,
            view,
            options,
            config,
            mode,
            cursors: vec![cursor],
            primary: 0,
            column_select: None,
            auto_whitespace: Vec::new(),
            last_reason: CursorChangeReason::NotSet,
            reveal: false,
        })
    }

    /// The document.
    pub fn model(&self) -> &TextModel {
        &self.model
    }

    /// The wrapped view.
    pub fn view(&self) -> &WrappedViewModel {
        &self.view
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.model.text()
    }

    /// Current editor options.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// The cursors, in document order.
    pub fn cursors(&self) -> &[OneCursor] {
        &self.cursors
    }

    /// Selections of all cursors, in document order.
    pub fn selections(&self) -> Vec<Selection> {
        self.cursors.iter().map(OneCursor::selection).collect()
    }

    /// Selection of the primary cursor.
    pub fn primary_selection(&self) -> Selection {
        self.cursors[self.primary].selection()
    }

    /// Index of the primary cursor in [`Self::cursors`].
    pub fn primary_index(&self) -> usize {
        self.primary
    }

    /// Why the cursors last moved.
    pub fn last_change_reason(&self) -> CursorChangeReason {
        self.last_reason
    }

    /// `true` if the last operation asked to scroll the primary cursor into view.
    pub fn should_reveal(&self) -> bool {
        self.reveal
    }

    /// Ranges of the current bracket-match decorations.
    pub fn bracket_matches(&self) -> Vec<Range> {
        self.model.decorations_with_class(BRACKET_MATCH_CLASS)
    }

    /// Replace the editor options.
    pub fn set_options(&mut self, options: EditorOptions) -> Result<(), CursorError> {
        let config = Arc::new(CursorConfiguration::new(&options)?);
        self.model.set_options(options.model_options());
        self.view.set_tab_size(&self.model, options.tab_size);
        for cursor in &mut self.cursors {
            cursor.set_configuration(Arc::clone(&config), Arc::clone(&self.mode));
        }
        self.config = config;
        self.options = options;
        self.resync_cursors();
        Ok(())
    }

    /// Replace the language configuration.
    pub fn set_language(&mut self, language: LanguageConfiguration) {
        let mode = Arc::new(ModeConfiguration::from_language(&language));
        self.model.set_language(language);
        for cursor in &mut self.cursors {
            cursor.set_configuration(Arc::clone(&self.config), Arc::clone(&mode));
        }
        self.mode = mode;
    }

    /// Replace the wrapping options.
    pub fn set_wrap_options(&mut self, options: WrapOptions) {
        self.view.set_options(&self.model, options);
        self.resync_cursors();
    }

    /// Replace the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.view.set_viewport(viewport);
    }

    /// Constrain editing to `range`, or lift the constraint with `None`.
    pub fn set_editable_range(&mut self, range: Option<Range>) {
        self.model.set_editable_range(range);
    }

    /// Replace all cursors. The first selection becomes the primary cursor.
    pub fn set_selections(&mut self, selections: &[Selection]) {
        if selections.is_empty() {
            warn!("ignoring an empty cursor list");
            return;
        }
        self.column_select = None;
        self.last_reason = CursorChangeReason::Explicit;
        let pairs: Vec<(Selection, Option<Selection>)> = selections.iter().map(|&s| (s, None)).collect();
        self.replace_cursors(&pairs);
        self.primary = 0;
        self.normalize_cursors();
    }

    /// Add a secondary cursor.
    pub fn add_cursor(&mut self, selection: Selection) {
        let mut host = CursorHost::new(&mut self.model, &self.view);
        let mut cursor = OneCursor::new(&mut host, Arc::clone(&self.config), Arc::clone(&self.mode));
        cursor.set_selection(&mut host, selection, None);
        self.cursors.push(cursor);
        self.normalize_cursors();
    }

    /// Type `text` one character at a time.
    pub fn type_text(&mut self, text: &str) -> Result<OperationResult, CursorError> {
        let mut result = OperationResult::NotApplicable;
        for ch in text.chars() {
            if self.execute(CursorOperation::Type { ch })?.is_handled() {
                result = OperationResult::Handled;
            }
        }
        Ok(result)
    }

    /// Run `op` over all cursors.
    pub fn execute(&mut self, op: CursorOperation) -> Result<OperationResult, CursorError> {
        debug!(?op, cursors = self.cursors.len(), "executing cursor operation");

        if op.is_column_select() {
            return self.execute_column_select(&op);
        }
        self.column_select = None;

        let ops = match self.distribute_paste(&op) {
            Some(pieces) => pieces
                .into_iter()
                .map(|text| CursorOperation::Paste {
                    text,
                    paste_on_new_line: false,
                })
                .collect(),
            None => vec![op; self.cursors.len()],
        };
        let result = self.run_batch(&ops)?;

        self.trim_auto_whitespace();
        self.normalize_cursors();
        self.adjust_bracket_decorations();
        Ok(result)
    }

    /// Undo the last edit group and restore the cursors it recorded.
    pub fn undo(&mut self) -> bool {
        let Some(selections) = self.model.undo() else {
            return false;
        };
        self.after_history_step(&selections, CursorChangeReason::Undo);
        true
    }

    /// Redo the last undone edit group.
    pub fn redo(&mut self) -> bool {
        let Some(selections) = self.model.redo() else {
            return false;
        };
        self.after_history_step(&selections, CursorChangeReason::Redo);
        true
    }

    fn after_history_step(&mut self, selections: &[Selection], reason: CursorChangeReason) {
        self.view.sync(&self.model);
        self.auto_whitespace.clear();
        self.column_select = None;
        if !selections.is_empty() {
            let pairs: Vec<(Selection, Option<Selection>)> = selections.iter().map(|&s| (s, None)).collect();
            self.replace_cursors(&pairs);
            self.primary = 0;
        } else {
            self.resync_cursors();
        }
        self.normalize_cursors();
        self.adjust_bracket_decorations();
        self.last_reason = reason;
    }

    /// One line of the pasted text per cursor, when the line count matches the cursor count.
    fn distribute_paste(&self, op: &CursorOperation) -> Option<Vec<String>> {
        let CursorOperation::Paste {
            text,
            paste_on_new_line: false,
        } = op
        else {
            return None;
        };
        if self.cursors.len() < 2 {
            return None;
        }
        if self
            .cursors
            .iter()
            .any(|c| c.selection().start().line != c.selection().end().line)
        {
            return None;
        }
        let pieces: Vec<String> = text.split('\n').map(str::to_string).collect();
        (pieces.len() == self.cursors.len()).then_some(pieces)
    }

    fn run_batch(&mut self, ops: &[CursorOperation]) -> Result<OperationResult, CursorError> {
        let selections_before = self.selections();
        let mut synced_version = vec![self.model.version_id(); self.cursors.len()];
        let mut result = OperationResult::NotApplicable;
        let mut edited = false;
        self.reveal = false;
        self.last_reason = CursorChangeReason::NotSet;

        for index in self.document_order() {
            if synced_version[index] != self.model.version_id() {
                self.recover_cursor(index);
            }

            let mut ctx = OperationContext::new();
            {
                let mut host = CursorHost::new(&mut self.model, &self.view);
                if operations::execute(&mut self.cursors[index], &mut host, &ops[index], &mut ctx)?.is_handled() {
                    result = OperationResult::Handled;
                }
            }
            if index == self.primary {
                self.reveal = ctx.should_reveal;
            }
            if ctx.cursor_change_reason != CursorChangeReason::NotSet {
                self.last_reason = ctx.cursor_change_reason;
            }

            if let Some(command) = ctx.execute_command.take() {
                if ctx.should_push_stack_element_before {
                    self.model.push_stack_element();
                }
                self.apply_command(index, &command, &selections_before);
                edited = true;
                if ctx.is_auto_whitespace_command {
                    self.track_auto_whitespace(index);
                }

                if let Some(hook) = ctx.post_edit.take() {
                    let mut post = OperationContext::new();
                    let handled = {
                        let host = CursorHost::new(&mut self.model, &self.view);
                        hook(&self.cursors[index], &host, &mut post)
                    };
                    if handled.is_handled()
                        && let Some(command) = post.execute_command.take()
                    {
                        self.apply_command(index, &command, &selections_before);
                        if post.should_push_stack_element_after {
                            self.model.push_stack_element();
                        }
                    }
                }

                if ctx.should_push_stack_element_after {
                    self.model.push_stack_element();
                }
            }
            synced_version[index] = self.model.version_id();
        }

        if edited {
            for (index, version) in synced_version.iter().enumerate() {
                if *version != self.model.version_id() {
                    self.recover_cursor(index);
                }
            }
        } else if self.selections() != selections_before {
            // A pure cursor move closes the current typing group.
            self.model.push_stack_element();
        }
        Ok(result)
    }

    fn document_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.cursors.len()).collect();
        order.sort_by_key(|&i| self.cursors[i].selection().start());
        order
    }

    fn apply_command(&mut self, index: usize, command: &TextCommand, selections_before: &[Selection]) {
        self.model.begin_edit_group(selections_before);
        let selection = command.execute(&mut self.model);
        self.view.sync(&self.model);
        let mut host = CursorHost::new(&mut self.model, &self.view);
        self.cursors[index].set_selection(&mut host, selection, None);
        debug!(?command, %selection, "applied edit");
    }

    fn recover_cursor(&mut self, index: usize) {
        let mut scratch = OperationContext::new();
        let mut host = CursorHost::new(&mut self.model, &self.view);
        if !self.cursors[index].recover_selection_from_anchors(&mut host, &mut scratch) {
            warn!(index, "cursor anchors lost; keeping the stale selection");
            let selection = self.cursors[index].selection();
            self.cursors[index].set_selection(&mut host, selection, None);
        }
    }

    /// Recompute every cursor's view state after a layout change.
    fn resync_cursors(&mut self) {
        let mut host = CursorHost::new(&mut self.model, &self.view);
        for cursor in &mut self.cursors {
            let state = *cursor.model_state();
            cursor.set_model_state(&mut host, state);
        }
    }

    fn execute_column_select(&mut self, op: &CursorOperation) -> Result<OperationResult, CursorError> {
        let mut ctx = OperationContext::new();
        if let Some((from, to)) = self.column_select {
            ctx.column_select_from = Some(from);
            ctx.column_select_to = Some(to);
        }

        let result = {
            let mut host = CursorHost::new(&mut self.model, &self.view);
            operations::execute(&mut self.cursors[self.primary], &mut host, op, &mut ctx)?
        };

        if let (Some(view_selections), Some(from), Some(to)) =
            (ctx.view_selections.take(), ctx.column_select_from, ctx.column_select_to)
        {
            self.column_select = Some((from, to));
            trace!(?from, ?to, reversed = ctx.reversed, lines = view_selections.len(), "column select");
            if !view_selections.is_empty() {
                let pairs: Vec<(Selection, Option<Selection>)> = view_selections
                    .iter()
                    .map(|&view_selection| {
                        let selection = self
                            .view
                            .convert_view_selection_to_model_selection(&self.model, view_selection);
                        (selection, Some(view_selection))
                    })
                    .collect();
                self.replace_cursors(&pairs);
                self.primary = 0;
                self.normalize_cursors();
            }
        }
        self.last_reason = CursorChangeReason::Explicit;
        self.adjust_bracket_decorations();
        Ok(result)
    }

    fn replace_cursors(&mut self, selections: &[(Selection, Option<Selection>)]) {
        while self.cursors.len() > selections.len() {
            if let Some(cursor) = self.cursors.pop() {
                cursor.dispose(&mut self.model);
            }
        }
        let mut host = CursorHost::new(&mut self.model, &self.view);
        while self.cursors.len() < selections.len() {
            let cursor = OneCursor::new(&mut host, Arc::clone(&self.config), Arc::clone(&self.mode));
            self.cursors.push(cursor);
        }
        for (cursor, &(selection, view_selection)) in self.cursors.iter_mut().zip(selections) {
            cursor.set_selection(&mut host, selection, view_selection);
        }
        self.primary = self.primary.min(self.cursors.len() - 1);
    }

    /// Sort cursors into document order and merge the ones that overlap.
    fn normalize_cursors(&mut self) {
        let primary_active = self.cursors[self.primary].position();
        let mut cursors = std::mem::take(&mut self.cursors);
        cursors.sort_by(|a, b| {
            let (a, b) = (a.selection(), b.selection());
            a.start().cmp(&b.start()).then_with(|| a.end().cmp(&b.end()))
        });

        let mut merged: Vec<OneCursor> = Vec::with_capacity(cursors.len());
        for cursor in cursors {
            let Some(last) = merged.last_mut() else {
                merged.push(cursor);
                continue;
            };
            let (last_start, last_end) = (last.selection().start(), last.selection().end());
            let (start, end) = (cursor.selection().start(), cursor.selection().end());

            if start < last_end {
                let union = Range::from_positions(last_start, last_end.max(end));
                let mut host = CursorHost::new(&mut self.model, &self.view);
                last.set_selection(&mut host, Selection::from_range(union, SelectionDirection::Ltr), None);
                cursor.dispose(&mut self.model);
            } else if start == last_start && end == last_end {
                cursor.dispose(&mut self.model);
            } else {
                merged.push(cursor);
            }
        }

        self.primary = merged
            .iter()
            .position(|c| c.selection().to_range().contains_position(primary_active))
            .unwrap_or(merged.len().saturating_sub(1));
        self.cursors = merged;
    }

    fn adjust_bracket_decorations(&mut self) {
        for cursor in &mut self.cursors {
            cursor.adjust_bracket_decorations(&mut self.model);
        }
    }

    fn track_auto_whitespace(&mut self, index: usize) {
        if !self.config.trim_auto_whitespace {
            return;
        }
        let line = self.cursors[index].position().line;
        let anchor = self.model.create_anchor(Position::new(line, 1), true);
        self.auto_whitespace.push(anchor);
    }

    /// Empty whitespace-only lines left behind by auto-indentation once no cursor is on them.
    fn trim_auto_whitespace(&mut self) {
        if self.auto_whitespace.is_empty() {
            return;
        }
        let cursor_lines: Vec<usize> = self.cursors.iter().map(|c| c.position().line).collect();
        let mut keep = Vec::new();
        let mut trim_lines = Vec::new();

        for anchor in std::mem::take(&mut self.auto_whitespace) {
            let Some(position) = self.model.resolve_anchor(anchor) else {
                continue;
            };
            if cursor_lines.contains(&position.line) {
                keep.push(anchor);
                continue;
            }
            let content = self.model.line_content(position.line);
            if !content.is_empty() && is_whitespace_only(&content) {
                trim_lines.push(position.line);
            }
            self.model.remove_anchor(anchor);
        }

        trim_lines.sort_unstable();
        trim_lines.dedup();
        for &line in trim_lines.iter().rev() {
            let range = Range::new(line, 1, line, self.model.line_max_column(line));
            trace!(line, "trimming auto-inserted whitespace");
            self.model.replace(range, "");
        }
        self.auto_whitespace = keep;

        if !trim_lines.is_empty() {
            self.view.sync(&self.model);
            for index in 0..self.cursors.len() {
                self.recover_cursor(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(text: &str) -> EditorSession {
        EditorSession::new(text, LanguageConfiguration::plain(), EditorOptions::default()).unwrap()
    }

    #[test]
    fn test_overlapping_cursors_merge() {
        let mut s = session("hello world");
        s.set_selections(&[
            Selection::new(1, 1, 1, 6),
            Selection::new(1, 3, 1, 8),
            Selection::collapsed(Position::new(1, 11)),
            Selection::collapsed(Position::new(1, 11)),
        ]);
        assert_eq!(
            s.selections(),
            vec![Selection::new(1, 1, 1, 8), Selection::collapsed(Position::new(1, 11))]
        );
        assert_eq!(s.primary_index(), 0);
    }

    #[test]
    fn test_typing_with_two_cursors_keeps_later_cursor_in_place() {
        let mut s = session("ab\ncd");
        s.set_selections(&[
            Selection::collapsed(Position::new(1, 2)),
            Selection::collapsed(Position::new(2, 2)),
        ]);
        s.type_text("xy").unwrap();
        assert_eq!(s.text(), "axyb\ncxyd");
        assert_eq!(
            s.selections(),
            vec![
                Selection::collapsed(Position::new(1, 4)),
                Selection::collapsed(Position::new(2, 4)),
            ]
        );
    }

    #[test]
    fn test_same_line_cursors_recover_from_anchors() {
        let mut s = session("a b c");
        s.set_selections(&[
            Selection::collapsed(Position::new(1, 2)),
            Selection::collapsed(Position::new(1, 4)),
        ]);
        s.type_text("!").unwrap();
        assert_eq!(s.text(), "a! b! c");
        assert_eq!(
            s.selections(),
            vec![
                Selection::collapsed(Position::new(1, 3)),
                Selection::collapsed(Position::new(1, 6)),
            ]
        );
    }

    #[test]
    fn test_undo_restores_cursors() {
        let mut s = session("abc");
        s.set_selections(&[Selection::collapsed(Position::new(1, 4))]);
        s.type_text("de").unwrap();
        assert_eq!(s.text(), "abcde");
        assert!(s.undo());
        assert_eq!(s.text(), "abc");
        assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(1, 4)));
        assert_eq!(s.last_change_reason(), CursorChangeReason::Undo);
        assert!(s.redo());
        assert_eq!(s.text(), "abcde");
    }

    #[test]
    fn test_auto_whitespace_is_trimmed_when_cursor_leaves() {
        let mut s = session("    foo");
        s.set_selections(&[Selection::collapsed(Position::new(1, 8))]);
        s.execute(CursorOperation::Type { ch: '\n' }).unwrap();
        assert_eq!(s.text(), "    foo\n    ");
        s.execute(CursorOperation::Type { ch: '\n' }).unwrap();
        assert_eq!(s.text(), "    foo\n\n    ");
        assert_eq!(s.primary_selection(), Selection::collapsed(Position::new(3, 5)));
    }

    #[test]
    fn test_distributed_paste() {
        let mut s = session("a\nb");
        s.set_selections(&[
            Selection::collapsed(Position::new(1, 2)),
            Selection::collapsed(Position::new(2, 2)),
        ]);
        s.execute(CursorOperation::Paste {
            text: "1\n2".to_string(),
            paste_on_new_line: false,
        })
        .unwrap();
        assert_eq!(s.text(), "a1\nb2");
        assert_eq!(s.last_change_reason(), CursorChangeReason::Paste);
    }
}
