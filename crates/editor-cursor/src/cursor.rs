//! Single-cursor state.
//!
//! A [`OneCursor`] keeps two snapshots of the same cursor: one in model coordinates and one in
//! view coordinates. They are always replaced together through [`CursorState::transition`], so
//! there is never a moment where one space has moved and the other has not.
//!
//! The visual start and end of the model selection are mirrored into two document anchors. When
//! an edit made on behalf of another cursor shifts the text under this one, the selection is
//! rebuilt from the anchors instead of trusting stale coordinates.

use crate::config::{CursorConfiguration, ModeConfiguration};
use crate::model::{AnchorId, DecorationId, DocumentModel, ModelDecoration};
use crate::operations::{CursorChangeReason, OperationContext};
use crate::position::{Position, Range, Selection, SelectionDirection};
use crate::view::{ViewLines, ViewModelHelper};
use crate::words::{self, FindWordResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, trace};

/// Decoration class published for a matched bracket pair.
pub const BRACKET_MATCH_CLASS: &str = "bracket-match";

/// An immutable cursor snapshot in one coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorModelState {
    /// The range the selection grows from. Non-empty after word or line selection.
    pub selection_start: Range,
    /// Leftover visible columns of the selection start.
    pub selection_start_leftover_visible_columns: usize,
    /// The active end.
    pub position: Position,
    /// Leftover visible columns of the active end.
    pub leftover_visible_columns: usize,
    /// Derived from `selection_start` and `position`.
    pub selection: Selection,
}

impl CursorModelState {
    /// Build a state; the selection is derived.
    pub fn new(
        selection_start: Range,
        selection_start_leftover_visible_columns: usize,
        position: Position,
        leftover_visible_columns: usize,
    ) -> Self {
        Self {
            selection_start,
            selection_start_leftover_visible_columns,
            position,
            leftover_visible_columns,
            selection: compute_selection(selection_start, position),
        }
    }

    /// An empty cursor at `position`.
    pub fn collapsed(position: Position) -> Self {
        Self::new(Range::collapsed(position), 0, position, 0)
    }

    /// `true` if the selection or the selection start is non-empty.
    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty() || !self.selection_start.is_empty()
    }

    /// Move the active end. Outside selection mode the selection start follows it.
    pub fn moved(
        &self,
        in_selection_mode: bool,
        line: usize,
        column: usize,
        leftover_visible_columns: usize,
    ) -> Self {
        let position = Position::new(line, column);
        if in_selection_mode {
            Self::new(
                self.selection_start,
                self.selection_start_leftover_visible_columns,
                position,
                leftover_visible_columns,
            )
        } else {
            Self::new(
                Range::collapsed(position),
                leftover_visible_columns,
                position,
                leftover_visible_columns,
            )
        }
    }
}

fn compute_selection(selection_start: Range, position: Position) -> Selection {
    let anchor = if selection_start.is_empty() || !position.is_before_or_equal(&selection_start.start()) {
        selection_start.start()
    } else {
        selection_start.end()
    };
    Selection::from_positions(anchor, position)
}

/// The paired model and view snapshots of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    /// Model-space snapshot.
    pub model: CursorModelState,
    /// View-space snapshot.
    pub view: CursorModelState,
}

impl CursorState {
    /// Compute the next state from whichever snapshots the caller provides.
    ///
    /// A missing snapshot is derived from the provided one; a provided one is validated
    /// against current document and view bounds. With neither, `current` is returned.
    pub fn transition(
        model: &dyn DocumentModel,
        view: &dyn ViewModelHelper,
        current: CursorState,
        model_state: Option<CursorModelState>,
        view_state: Option<CursorModelState>,
    ) -> CursorState {
        match (model_state, view_state) {
            (None, None) => current,
            (None, Some(view_state)) => {
                let view_selection_start = clamp_view_range(model, view, view_state.selection_start);
                let view_position = clamp_view_position(model, view, view_state.position);
                let view_state = CursorModelState::new(
                    view_selection_start,
                    view_state.selection_start_leftover_visible_columns,
                    view_position,
                    view_state.leftover_visible_columns,
                );
                let model_state = CursorModelState::new(
                    view.convert_view_range_to_model_range(model, view_selection_start),
                    view_state.selection_start_leftover_visible_columns,
                    view.convert_view_position_to_model_position(model, view_position),
                    view_state.leftover_visible_columns,
                );
                CursorState {
                    model: model_state,
                    view: view_state,
                }
            }
            (Some(model_state), view_state) => {
                let selection_start = model.validate_range(model_state.selection_start);
                let position = model.validate_position(model_state.position);
                let model_state = CursorModelState::new(
                    selection_start,
                    model_state.selection_start_leftover_visible_columns,
                    position,
                    model_state.leftover_visible_columns,
                );

                let (view_selection_start, view_position) = match view_state {
                    Some(view_state) => (
                        view.validate_view_range(model, view_state.selection_start, selection_start),
                        view.validate_view_position(model, view_state.position, position),
                    ),
                    None => (
                        view.convert_model_range_to_view_range(model, selection_start),
                        view.convert_model_position_to_view_position(model, position),
                    ),
                };
                let view_state = CursorModelState::new(
                    view_selection_start,
                    model_state.selection_start_leftover_visible_columns,
                    view_position,
                    model_state.leftover_visible_columns,
                );
                CursorState {
                    model: model_state,
                    view: view_state,
                }
            }
        }
    }
}

fn clamp_view_position(model: &dyn DocumentModel, view: &dyn ViewModelHelper, position: Position) -> Position {
    let line = position.line.clamp(1, view.view_line_count(model).max(1));
    let column = position.column.clamp(
        view.view_line_min_column(model, line),
        view.view_line_max_column(model, line),
    );
    Position::new(line, column)
}

fn clamp_view_range(model: &dyn DocumentModel, view: &dyn ViewModelHelper, range: Range) -> Range {
    Range::from_positions(
        clamp_view_position(model, view, range.start()),
        clamp_view_position(model, view, range.end()),
    )
}

/// The persisted shape of a cursor, used for undo stops and duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCursorState {
    /// Model selection start.
    pub selection_start: Range,
    /// View selection start.
    pub view_selection_start: Range,
    /// Model position.
    pub position: Position,
    /// View position.
    pub view_position: Position,
    /// Leftover visible columns of the position.
    pub leftover_visible_columns: usize,
    /// Leftover visible columns of the selection start.
    pub selection_start_leftover_visible_columns: usize,
}

/// The document and its view, borrowed for the duration of one cursor operation.
pub struct CursorHost<'a> {
    /// The document. Mutable for anchors and decorations only.
    pub model: &'a mut dyn DocumentModel,
    /// The coordinate translator.
    pub view: &'a dyn ViewModelHelper,
}

impl<'a> CursorHost<'a> {
    /// Bundle a document and its translator.
    pub fn new(model: &'a mut dyn DocumentModel, view: &'a dyn ViewModelHelper) -> Self {
        Self { model, view }
    }

    /// Shared access to the document.
    pub fn model(&self) -> &dyn DocumentModel {
        &*self.model
    }

    /// View lines as a [`crate::model::LineSource`].
    pub fn view_lines(&self) -> ViewLines<'_> {
        ViewLines::new(self.view, &*self.model)
    }

    /// Tab stop width of the document.
    pub fn tab_size(&self) -> usize {
        self.model.options().tab_size
    }
}

/// One cursor: model and view state, selection anchors and bracket decorations.
#[derive(Debug, Clone)]
pub struct OneCursor {
    config: Arc<CursorConfiguration>,
    mode: Arc<ModeConfiguration>,
    state: CursorState,
    selection_start_anchor: Option<AnchorId>,
    selection_end_anchor: Option<AnchorId>,
    bracket_decorations: Vec<DecorationId>,
}

impl OneCursor {
    /// Create a cursor at the start of the document.
    pub fn new(
        host: &mut CursorHost<'_>,
        config: Arc<CursorConfiguration>,
        mode: Arc<ModeConfiguration>,
    ) -> Self {
        let start = CursorModelState::collapsed(Position::new(1, 1));
        let mut cursor = Self {
            config,
            mode,
            state: CursorState {
                model: start,
                view: start,
            },
            selection_start_anchor: None,
            selection_end_anchor: None,
            bracket_decorations: Vec::new(),
        };
        cursor.set_state(host, Some(start), None);
        cursor
    }

    /// Cursor settings.
    pub fn config(&self) -> &CursorConfiguration {
        &self.config
    }

    /// Shared handle to the cursor settings.
    pub fn config_handle(&self) -> Arc<CursorConfiguration> {
        Arc::clone(&self.config)
    }

    /// Language-derived typing tables.
    pub fn mode(&self) -> &ModeConfiguration {
        &self.mode
    }

    /// Replace the settings. Existing state is kept.
    pub fn set_configuration(&mut self, config: Arc<CursorConfiguration>, mode: Arc<ModeConfiguration>) {
        self.config = config;
        self.mode = mode;
    }

    /// Both snapshots.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Model-space snapshot.
    pub fn model_state(&self) -> &CursorModelState {
        &self.state.model
    }

    /// View-space snapshot.
    pub fn view_state(&self) -> &CursorModelState {
        &self.state.view
    }

    /// Model selection.
    pub fn selection(&self) -> Selection {
        self.state.model.selection
    }

    /// View selection.
    pub fn view_selection(&self) -> Selection {
        self.state.view.selection
    }

    /// Model position of the active end.
    pub fn position(&self) -> Position {
        self.state.model.position
    }

    /// View position of the active end.
    pub fn view_position(&self) -> Position {
        self.state.view.position
    }

    /// `true` if the cursor has a selection.
    pub fn has_selection(&self) -> bool {
        self.state.model.has_selection()
    }

    /// Ranges of the current bracket-match decorations.
    pub fn bracket_decoration_ranges(&self, model: &dyn DocumentModel) -> Vec<Range> {
        self.bracket_decorations
            .iter()
            .filter_map(|&id| model.decoration_range(id))
            .collect()
    }

    fn set_state(
        &mut self,
        host: &mut CursorHost<'_>,
        model_state: Option<CursorModelState>,
        view_state: Option<CursorModelState>,
    ) {
        self.state = CursorState::transition(host.model(), host.view, self.state, model_state, view_state);
        self.sync_anchors(&mut *host.model);
    }

    fn sync_anchors(&mut self, model: &mut dyn DocumentModel) {
        let selection = self.state.model.selection;
        let (start_sticks, end_sticks) = if selection.is_empty() {
            (false, false)
        } else {
            (true, false)
        };
        self.selection_start_anchor = Some(ensure_anchor(
            model,
            self.selection_start_anchor,
            selection.start(),
            start_sticks,
        ));
        self.selection_end_anchor = Some(ensure_anchor(
            model,
            self.selection_end_anchor,
            selection.end(),
            end_sticks,
        ));
    }

    /// Capture the state for later [`Self::restore_state`].
    pub fn save_state(&self) -> SavedCursorState {
        SavedCursorState {
            selection_start: self.state.model.selection_start,
            view_selection_start: self.state.view.selection_start,
            position: self.state.model.position,
            view_position: self.state.view.position,
            leftover_visible_columns: self.state.model.leftover_visible_columns,
            selection_start_leftover_visible_columns: self
                .state
                .model
                .selection_start_leftover_visible_columns,
        }
    }

    /// Restore a saved state, revalidating it against the current document and view.
    pub fn restore_state(&mut self, host: &mut CursorHost<'_>, saved: &SavedCursorState) {
        let model = host.model();
        let position = model.validate_position(saved.position);
        let selection_start = model.validate_range(saved.selection_start);
        let view_position = host.view.validate_view_position(model, saved.view_position, position);
        let view_selection_start =
            host.view
                .validate_view_range(model, saved.view_selection_start, selection_start);

        let model_state = CursorModelState::new(
            selection_start,
            saved.selection_start_leftover_visible_columns,
            position,
            saved.leftover_visible_columns,
        );
        let view_state = CursorModelState::new(
            view_selection_start,
            saved.selection_start_leftover_visible_columns,
            view_position,
            saved.leftover_visible_columns,
        );
        self.set_state(host, Some(model_state), Some(view_state));
    }

    /// A new cursor with the same state and settings, owning its own anchors.
    pub fn duplicate(&self, host: &mut CursorHost<'_>) -> OneCursor {
        let mut cursor = OneCursor {
            config: Arc::clone(&self.config),
            mode: Arc::clone(&self.mode),
            state: self.state,
            selection_start_anchor: None,
            selection_end_anchor: None,
            bracket_decorations: Vec::new(),
        };
        cursor.restore_state(host, &self.save_state());
        cursor
    }

    /// Release anchors and decorations.
    pub fn dispose(self, model: &mut dyn DocumentModel) {
        for id in [self.selection_start_anchor, self.selection_end_anchor]
            .into_iter()
            .flatten()
        {
            model.remove_anchor(id);
        }
        if !self.bracket_decorations.is_empty() {
            model.delta_decorations(&self.bracket_decorations, &[]);
        }
    }

    /// Republish the bracket-match decorations for the current position.
    pub fn adjust_bracket_decorations(&mut self, model: &mut dyn DocumentModel) {
        let mut decorations = Vec::new();
        if self.state.model.selection.is_empty()
            && let Some((open, close)) = model.match_bracket(self.state.model.position)
        {
            if model.validate_range(open) != open || model.validate_range(close) != close {
                error!(%open, %close, "bracket match outside of the document");
            } else {
                decorations.push(ModelDecoration {
                    range: open,
                    class_name: BRACKET_MATCH_CLASS,
                });
                decorations.push(ModelDecoration {
                    range: close,
                    class_name: BRACKET_MATCH_CLASS,
                });
            }
        }
        if decorations.is_empty() && self.bracket_decorations.is_empty() {
            return;
        }
        self.bracket_decorations = model.delta_decorations(&self.bracket_decorations, &decorations);
    }

    /// Set a model selection, with an optional view selection hint.
    pub fn set_selection(
        &mut self,
        host: &mut CursorHost<'_>,
        selection: Selection,
        view_selection: Option<Selection>,
    ) {
        let model = host.model();
        let position = model.validate_position(selection.active());
        let anchor = model.validate_position(selection.anchor());
        let (view_anchor, view_position) = match view_selection {
            Some(view_selection) => (
                host.view
                    .validate_view_position(model, view_selection.anchor(), anchor),
                host.view
                    .validate_view_position(model, view_selection.active(), position),
            ),
            None => (
                host.view.convert_model_position_to_view_position(model, anchor),
                host.view.convert_model_position_to_view_position(model, position),
            ),
        };

        self.set_state(
            host,
            Some(CursorModelState::new(Range::collapsed(anchor), 0, position, 0)),
            Some(CursorModelState::new(
                Range::collapsed(view_anchor),
                0,
                view_position,
                0,
            )),
        );
    }

    /// Replace the selection start (word and line selection) and move the active end.
    pub fn set_selection_start(
        &mut self,
        host: &mut CursorHost<'_>,
        selection_start: Range,
        position: Position,
    ) {
        let state = CursorModelState::new(selection_start, 0, position, 0);
        self.set_state(host, Some(state), None);
    }

    /// Replace the model state; the view state is derived.
    pub fn set_model_state(&mut self, host: &mut CursorHost<'_>, state: CursorModelState) {
        self.set_state(host, Some(state), None);
    }

    /// Replace the view state; the model state is derived.
    pub fn set_view_state(&mut self, host: &mut CursorHost<'_>, state: CursorModelState) {
        self.set_state(host, None, Some(state));
    }

    /// Move in model space.
    pub fn move_model_position(
        &mut self,
        host: &mut CursorHost<'_>,
        in_selection_mode: bool,
        line: usize,
        column: usize,
        leftover_visible_columns: usize,
        ensure_in_editable_range: bool,
    ) {
        let mut target = Position::new(line, column);
        if ensure_in_editable_range {
            target = clamp_to_editable_range(host.model(), target);
        }
        let state = self.state.model.moved(
            in_selection_mode,
            target.line,
            target.column,
            leftover_visible_columns,
        );
        self.set_state(host, Some(state), None);
    }

    /// Move in view space.
    pub fn move_view_position(
        &mut self,
        host: &mut CursorHost<'_>,
        in_selection_mode: bool,
        view_line: usize,
        view_column: usize,
        leftover_visible_columns: usize,
        ensure_in_editable_range: bool,
    ) {
        let mut view_target = Position::new(view_line, view_column);
        if ensure_in_editable_range {
            let model = host.model();
            let model_target = host
                .view
                .convert_view_position_to_model_position(model, view_target);
            let clamped = clamp_to_editable_range(model, model_target);
            if clamped != model_target {
                view_target = host.view.convert_model_position_to_view_position(model, clamped);
            }
        }
        let state = self.state.view.moved(
            in_selection_mode,
            view_target.line,
            view_target.column,
            leftover_visible_columns,
        );
        self.set_state(host, None, Some(state));
    }

    /// Collapse the selection to its active end.
    pub fn collapse_selection(&mut self, host: &mut CursorHost<'_>) {
        let position = self.state.model.position;
        let view_position = self.state.view.position;
        let leftover = self.state.model.leftover_visible_columns;
        self.set_state(
            host,
            Some(CursorModelState::new(Range::collapsed(position), leftover, position, leftover)),
            Some(CursorModelState::new(
                Range::collapsed(view_position),
                leftover,
                view_position,
                leftover,
            )),
        );
    }

    /// The selection described by the anchors, with the current direction.
    pub fn selection_from_anchors(&self, model: &dyn DocumentModel) -> Option<Selection> {
        let start = model.resolve_anchor(self.selection_start_anchor?)?;
        let end = model.resolve_anchor(self.selection_end_anchor?)?;
        let range = Range::from_positions(start, end);
        Some(Selection::from_range(range, self.state.model.selection.direction()))
    }

    /// Rebuild the selection from the anchors after an edit shifted the text under the cursor.
    ///
    /// Returns `false` if an anchor is gone; the state is left untouched then.
    pub fn recover_selection_from_anchors(
        &mut self,
        host: &mut CursorHost<'_>,
        ctx: &mut OperationContext,
    ) -> bool {
        let Some(recovered) = self.selection_from_anchors(host.model()) else {
            return false;
        };
        trace!(from = %self.state.model.selection, to = %recovered, "recovering selection from anchors");

        ctx.cursor_change_reason = CursorChangeReason::RecoverFromMarkers;
        ctx.should_push_stack_element_before = true;
        ctx.should_push_stack_element_after = true;
        ctx.should_reveal = false;
        ctx.should_reveal_horizontal = false;
        self.set_selection(host, recovered, None);
        true
    }

    /// The word ending at or before `position` on its model line.
    pub fn find_previous_word_on_line(
        &self,
        model: &dyn DocumentModel,
        position: Position,
    ) -> Option<FindWordResult> {
        words::find_previous_word_on_line(
            &model.line_content(position.line),
            &self.config.word_separators,
            position.column,
        )
    }

    /// The word starting at or after `position` on its model line.
    pub fn find_next_word_on_line(
        &self,
        model: &dyn DocumentModel,
        position: Position,
    ) -> Option<FindWordResult> {
        words::find_next_word_on_line(
            &model.line_content(position.line),
            &self.config.word_separators,
            position.column,
        )
    }

    /// Selection direction of the model selection.
    pub fn direction(&self) -> SelectionDirection {
        self.state.model.selection.direction()
    }
}

fn ensure_anchor(
    model: &mut dyn DocumentModel,
    anchor: Option<AnchorId>,
    position: Position,
    stick_to_previous: bool,
) -> AnchorId {
    match anchor {
        Some(id) => {
            model.change_anchor(id, position);
            model.set_anchor_stickiness(id, stick_to_previous);
            id
        }
        None => model.create_anchor(position, stick_to_previous),
    }
}

fn clamp_to_editable_range(model: &dyn DocumentModel, position: Position) -> Position {
    if !model.has_editable_range() {
        return position;
    }
    let range = model.editable_range();
    if position < range.start() {
        range.start()
    } else if position > range.end() {
        range.end()
    } else {
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditableDocument;
    use crate::text_model::TextModel;
    use crate::view::IdentityViewModel;
    use editor_cursor_lang::LanguageConfiguration;
    use pretty_assertions::assert_eq;

    fn cursor_with_selection(
        model: &mut TextModel,
        view: &IdentityViewModel,
        selection: Selection,
    ) -> OneCursor {
        let mut host = CursorHost::new(model, view);
        let mut cursor = OneCursor::new(&mut host, Arc::default(), Arc::default());
        cursor.set_selection(&mut host, selection, None);
        cursor
    }

    #[test]
    fn test_selection_grows_from_selection_start() {
        let word = Range::new(1, 5, 1, 9);
        let forward = CursorModelState::new(word, 0, Position::new(1, 12), 0);
        assert_eq!(forward.selection, Selection::new(1, 5, 1, 12));

        let backward = CursorModelState::new(word, 0, Position::new(1, 2), 0);
        assert_eq!(backward.selection, Selection::new(1, 9, 1, 2));

        let collapsed = CursorModelState::collapsed(Position::new(2, 3));
        assert!(!collapsed.has_selection());
        assert!(CursorModelState::new(word, 0, Position::new(1, 9), 0).has_selection());
    }

    #[test]
    fn test_moved_outside_selection_mode_collapses() {
        let state = CursorModelState::new(Range::collapsed(Position::new(1, 1)), 0, Position::new(1, 4), 0);
        let moved = state.moved(false, 2, 2, 3);
        assert_eq!(moved.selection, Selection::collapsed(Position::new(2, 2)));
        assert_eq!(moved.leftover_visible_columns, 3);

        let extended = state.moved(true, 2, 2, 0);
        assert_eq!(extended.selection, Selection::new(1, 1, 2, 2));
    }

    #[test]
    fn test_save_restore_and_duplicate() {
        let mut model = TextModel::new("hello world\nsecond", LanguageConfiguration::plain());
        let view = IdentityViewModel::default();
        let mut cursor = cursor_with_selection(&mut model, &view, Selection::new(1, 7, 1, 12));
        let mut host = CursorHost::new(&mut model, &view);

        let saved = cursor.save_state();
        cursor.move_model_position(&mut host, false, 2, 3, 0, false);
        assert_eq!(cursor.selection(), Selection::collapsed(Position::new(2, 3)));

        cursor.restore_state(&mut host, &saved);
        assert_eq!(cursor.selection(), Selection::new(1, 7, 1, 12));
        assert_eq!(cursor.save_state(), saved);

        let mut copy = cursor.duplicate(&mut host);
        assert_eq!(copy.state(), cursor.state());
        copy.move_model_position(&mut host, true, 2, 7, 0, false);
        assert_eq!(copy.selection(), Selection::new(1, 7, 2, 7));
        assert_eq!(cursor.selection(), Selection::new(1, 7, 1, 12));

        // The copy owns its anchors: releasing them leaves the original intact.
        copy.dispose(&mut *host.model);
        assert_eq!(
            cursor.selection_from_anchors(host.model()),
            Some(Selection::new(1, 7, 1, 12))
        );
    }

    #[test]
    fn test_restore_state_is_clamped_to_the_document() {
        let mut model = TextModel::new("ab", LanguageConfiguration::plain());
        let view = IdentityViewModel::default();
        let mut cursor = cursor_with_selection(&mut model, &view, Selection::collapsed(Position::new(1, 1)));
        let mut host = CursorHost::new(&mut model, &view);

        let saved: SavedCursorState = serde_json::from_str(
            r#"{
                "selectionStart": { "start_line": 1, "start_column": 9, "end_line": 1, "end_column": 9 },
                "viewSelectionStart": { "start_line": 1, "start_column": 9, "end_line": 1, "end_column": 9 },
                "position": { "line": 4, "column": 9 },
                "viewPosition": { "line": 4, "column": 9 },
                "leftoverVisibleColumns": 0,
                "selectionStartLeftoverVisibleColumns": 0
            }"#,
        )
        .unwrap();
        cursor.restore_state(&mut host, &saved);
        assert_eq!(cursor.selection(), Selection::collapsed(Position::new(1, 3)));
        assert_eq!(cursor.view_position(), Position::new(1, 3));
    }

    #[test]
    fn test_recover_selection_from_anchors_after_foreign_edit() {
        let mut model = TextModel::new("hello world", LanguageConfiguration::plain());
        let view = IdentityViewModel::default();
        let mut forward = cursor_with_selection(&mut model, &view, Selection::new(1, 7, 1, 12));
        let mut backward = cursor_with_selection(&mut model, &view, Selection::new(1, 6, 1, 2));

        model.replace(Range::new(1, 1, 1, 1), ">> ");

        let mut host = CursorHost::new(&mut model, &view);
        let mut ctx = OperationContext::new();
        assert!(forward.recover_selection_from_anchors(&mut host, &mut ctx));
        assert_eq!(forward.selection(), Selection::new(1, 10, 1, 15));
        assert_eq!(ctx.cursor_change_reason, CursorChangeReason::RecoverFromMarkers);
        assert!(!ctx.should_reveal);
        assert!(ctx.should_push_stack_element_before);

        let mut ctx = OperationContext::new();
        assert!(backward.recover_selection_from_anchors(&mut host, &mut ctx));
        assert_eq!(backward.selection(), Selection::new(1, 9, 1, 5));
        assert_eq!(backward.direction(), SelectionDirection::Rtl);
    }
}
