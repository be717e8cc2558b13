//! Model <-> view coordinate translation.
//!
//! The model is the raw document; the view is what the renderer lays out (one model line may
//! span several view lines when soft-wrapped). Cursor operations that should respect wrapping
//! run in view space and convert back through a [`ViewModelHelper`].
//!
//! Translators never own the document: every call receives it by reference so the host keeps
//! exclusive ownership.

use crate::indentation;
use crate::model::{DocumentModel, LineSource};
use crate::position::{Position, Range, Selection, text_from_column};

/// The visible window, in view lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First completely visible view line (1-based).
    pub first_line: usize,
    /// Number of completely visible view lines.
    pub height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            first_line: 1,
            height: 40,
        }
    }
}

/// Coordinate translation between a document and its view.
pub trait ViewModelHelper {
    /// Number of view lines.
    fn view_line_count(&self, model: &dyn DocumentModel) -> usize;

    /// Content of a view line.
    fn view_line_content(&self, model: &dyn DocumentModel, view_line: usize) -> String;

    /// Smallest valid column of a view line.
    fn view_line_min_column(&self, model: &dyn DocumentModel, view_line: usize) -> usize;

    /// Largest valid column of a view line.
    fn view_line_max_column(&self, model: &dyn DocumentModel, view_line: usize) -> usize;

    /// Model position -> view position.
    fn convert_model_position_to_view_position(
        &self,
        model: &dyn DocumentModel,
        position: Position,
    ) -> Position;

    /// View position -> model position.
    fn convert_view_position_to_model_position(
        &self,
        model: &dyn DocumentModel,
        view_position: Position,
    ) -> Position;

    /// The current viewport.
    fn viewport(&self) -> Viewport;

    /// Model range -> view range.
    fn convert_model_range_to_view_range(&self, model: &dyn DocumentModel, range: Range) -> Range {
        Range::from_positions(
            self.convert_model_position_to_view_position(model, range.start()),
            self.convert_model_position_to_view_position(model, range.end()),
        )
    }

    /// View range -> model range.
    fn convert_view_range_to_model_range(&self, model: &dyn DocumentModel, view_range: Range) -> Range {
        Range::from_positions(
            self.convert_view_position_to_model_position(model, view_range.start()),
            self.convert_view_position_to_model_position(model, view_range.end()),
        )
    }

    /// Model selection -> view selection (direction preserved).
    fn convert_model_selection_to_view_selection(
        &self,
        model: &dyn DocumentModel,
        selection: Selection,
    ) -> Selection {
        Selection::from_positions(
            self.convert_model_position_to_view_position(model, selection.anchor()),
            self.convert_model_position_to_view_position(model, selection.active()),
        )
    }

    /// View selection -> model selection (direction preserved).
    fn convert_view_selection_to_model_selection(
        &self,
        model: &dyn DocumentModel,
        view_selection: Selection,
    ) -> Selection {
        Selection::from_positions(
            self.convert_view_position_to_model_position(model, view_selection.anchor()),
            self.convert_view_position_to_model_position(model, view_selection.active()),
        )
    }

    /// Clamp a view position that may be stale after an edit.
    ///
    /// If it still denotes `model_position`, it is kept (preserving which side of a wrap point
    /// the cursor is on); otherwise the view position is recomputed from `model_position`.
    fn validate_view_position(
        &self,
        model: &dyn DocumentModel,
        view_position: Position,
        model_position: Position,
    ) -> Position {
        let line = view_position.line.clamp(1, self.view_line_count(model).max(1));
        let column = view_position.column.clamp(
            self.view_line_min_column(model, line),
            self.view_line_max_column(model, line),
        );
        let clamped = Position::new(line, column);

        if clamped == view_position
            && self.convert_view_position_to_model_position(model, clamped) == model_position
        {
            clamped
        } else {
            self.convert_model_position_to_view_position(model, model_position)
        }
    }

    /// [`Self::validate_view_position`] for both ends of a range.
    fn validate_view_range(&self, model: &dyn DocumentModel, view_range: Range, model_range: Range) -> Range {
        Range::from_positions(
            self.validate_view_position(model, view_range.start(), model_range.start()),
            self.validate_view_position(model, view_range.end(), model_range.end()),
        )
    }

    /// Lines scrolled by a page move.
    fn page_size(&self) -> usize {
        self.viewport().height.saturating_sub(2).max(1)
    }

    /// The completely visible view lines, as a range.
    fn completely_visible_view_lines(&self, model: &dyn DocumentModel) -> Range {
        let count = self.view_line_count(model).max(1);
        let viewport = self.viewport();
        let first = viewport.first_line.clamp(1, count);
        let last = (first + viewport.height.max(1) - 1).min(count);
        Range::new(first, 1, last, self.view_line_max_column(model, last))
    }

    /// The completely visible view lines, converted to model space.
    fn completely_visible_model_lines(&self, model: &dyn DocumentModel) -> Range {
        let view_range = self.completely_visible_view_lines(model);
        self.convert_view_range_to_model_range(model, view_range)
    }
}

/// Adapts a translator and its document into a [`LineSource`] over view lines.
pub struct ViewLines<'a> {
    view: &'a dyn ViewModelHelper,
    model: &'a dyn DocumentModel,
}

impl<'a> ViewLines<'a> {
    /// Create the adapter.
    pub fn new(view: &'a dyn ViewModelHelper, model: &'a dyn DocumentModel) -> Self {
        Self { view, model }
    }
}

impl LineSource for ViewLines<'_> {
    fn line_count(&self) -> usize {
        self.view.view_line_count(self.model)
    }

    fn line_content(&self, line: usize) -> String {
        self.view.view_line_content(self.model, line)
    }

    fn line_min_column(&self, line: usize) -> usize {
        self.view.view_line_min_column(self.model, line)
    }

    fn line_max_column(&self, line: usize) -> usize {
        self.view.view_line_max_column(self.model, line)
    }

    fn line_first_non_whitespace_column(&self, line: usize) -> usize {
        // Continuation lines start with wrap indentation; never report a column inside it.
        let content = self.line_content(line);
        let min = self.line_min_column(line);
        text_from_column(&content, min)
            .find(|ch: char| ch != ' ' && ch != '\t')
            .map_or(0, |i| min + i)
    }

    fn line_last_non_whitespace_column(&self, line: usize) -> usize {
        let column = indentation::last_non_whitespace_end(&self.line_content(line), None)
            .map_or(0, |end| end + 1);
        if column > self.line_min_column(line) {
            column
        } else {
            0
        }
    }
}

/// A translator without wrapping: view coordinates equal model coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityViewModel {
    viewport: Viewport,
}

impl IdentityViewModel {
    /// Create a translator with the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Replace the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

impl ViewModelHelper for IdentityViewModel {
    fn view_line_count(&self, model: &dyn DocumentModel) -> usize {
        model.line_count()
    }

    fn view_line_content(&self, model: &dyn DocumentModel, view_line: usize) -> String {
        model.line_content(view_line)
    }

    fn view_line_min_column(&self, model: &dyn DocumentModel, view_line: usize) -> usize {
        model.line_min_column(view_line)
    }

    fn view_line_max_column(&self, model: &dyn DocumentModel, view_line: usize) -> usize {
        model.line_max_column(view_line)
    }

    fn convert_model_position_to_view_position(
        &self,
        model: &dyn DocumentModel,
        position: Position,
    ) -> Position {
        model.validate_position(position)
    }

    fn convert_view_position_to_model_position(
        &self,
        model: &dyn DocumentModel,
        view_position: Position,
    ) -> Position {
        model.validate_position(view_position)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
