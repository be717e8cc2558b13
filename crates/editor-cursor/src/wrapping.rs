//! Soft wrapping view model.
//!
//! Wrap points are computed in character cells (UAX #11 widths, tabs expanded to tab stops)
//! against a viewport width. Each model line becomes one or more view lines; continuation
//! lines may carry a wrap indent, rendered as leading spaces in the view line content, which
//! is why their minimum view column is greater than 1.
//!
//! The layout is a cache over the document. Hosts call [`WrappedViewModel::sync`] after every
//! edit, before converting coordinates again.

use crate::model::{DocumentModel, LineSource};
use crate::position::{Position, text_between_columns, utf16_len};
use crate::view::{ViewModelHelper, Viewport};
use serde::Deserialize;
use unicode_width::UnicodeWidthChar;

/// Soft wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapMode {
    /// No soft wrapping.
    #[default]
    None,
    /// Wrap at character boundaries.
    Char,
    /// Prefer wrapping after whitespace, falling back to character wrap.
    Word,
}

/// Indentation of wrapped continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapIndent {
    /// No indentation.
    #[default]
    None,
    /// Same width as the model line's leading whitespace.
    SameAsLineIndent,
    /// A fixed number of cells.
    FixedCells(usize),
}

/// Wrapping settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WrapOptions {
    /// Viewport width in cells.
    pub viewport_width: usize,
    /// Wrapping mode.
    pub wrap_mode: WrapMode,
    /// Continuation indentation.
    pub wrap_indent: WrapIndent,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            viewport_width: 80,
            wrap_mode: WrapMode::None,
            wrap_indent: WrapIndent::None,
        }
    }
}

/// Width of `ch` in cells at `cell_offset` from the line start.
pub fn cell_width_at(ch: char, cell_offset: usize, tab_size: usize) -> usize {
    if ch == '\t' {
        let tab_size = tab_size.max(1);
        tab_size - cell_offset % tab_size
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(1)
    }
}

/// Width of `text` in cells, tabs expanded.
pub fn str_width(text: &str, tab_size: usize) -> usize {
    text.chars()
        .fold(0, |x, ch| x.saturating_add(cell_width_at(ch, x, tab_size)))
}

fn wrap_indent_cells(line: &str, wrap_indent: WrapIndent, viewport_width: usize, tab_size: usize) -> usize {
    if viewport_width <= 1 {
        return 0;
    }
    let raw = match wrap_indent {
        WrapIndent::None => 0,
        WrapIndent::FixedCells(n) => n,
        WrapIndent::SameAsLineIndent => str_width(crate::indentation::leading_whitespace(line), tab_size),
    };
    raw.min(viewport_width.saturating_sub(1))
}

/// UTF-16 offsets where `line` wraps. Each offset starts a new view line.
pub fn wrap_points(line: &str, options: &WrapOptions, tab_size: usize) -> Vec<usize> {
    if options.viewport_width == 0 {
        return Vec::new();
    }
    let indent = wrap_indent_cells(line, options.wrap_indent, options.viewport_width, tab_size);
    match options.wrap_mode {
        WrapMode::None => Vec::new(),
        WrapMode::Char => char_wrap_points(line, options.viewport_width, tab_size, indent),
        WrapMode::Word => word_wrap_points(line, options.viewport_width, tab_size, indent),
    }
}

fn char_wrap_points(line: &str, width: usize, tab_size: usize, indent: usize) -> Vec<usize> {
    let mut points = Vec::new();
    let mut x_in_segment = 0usize;
    let mut x_in_line = 0usize;
    let len = utf16_len(line);
    let mut offset = 0usize;

    for ch in line.chars() {
        let w = cell_width_at(ch, x_in_line, tab_size);
        // A wide character never straddles the edge.
        if x_in_segment > indent.min(x_in_segment) && x_in_segment + w > width {
            points.push(offset);
            x_in_segment = indent;
        }
        x_in_segment += w;
        x_in_line += w;
        offset += ch.len_utf16();

        if x_in_segment >= width && offset < len {
            points.push(offset);
            x_in_segment = indent;
        }
    }
    points
}

fn word_wrap_points(line: &str, width: usize, tab_size: usize, indent: usize) -> Vec<usize> {
    let mut points = Vec::new();
    let mut segment_start = 0usize;
    let mut segment_start_x = 0usize;
    // (offset after the whitespace, x in line at that offset)
    let mut last_break: Option<(usize, usize)> = None;
    let mut x_in_line = 0usize;
    let mut index = 0usize;

    for ch in line.chars() {
        let w = cell_width_at(ch, x_in_line, tab_size);

        loop {
            let segment_indent = if segment_start == 0 { 0 } else { indent };
            let x_in_segment = x_in_line - segment_start_x + segment_indent;
            if x_in_segment + w <= width || index == segment_start {
                break;
            }
            if let Some((break_index, break_x)) = last_break
                && break_index > segment_start
            {
                points.push(break_index);
                segment_start = break_index;
                segment_start_x = break_x;
                last_break = None;
                continue;
            }
            points.push(index);
            segment_start = index;
            segment_start_x = x_in_line;
            last_break = None;
            break;
        }

        x_in_line += w;
        index += ch.len_utf16();
        if ch.is_whitespace() {
            last_break = Some((index, x_in_line));
        }
    }
    points
}

#[derive(Debug, Clone, Default)]
struct LineLayout {
    wrap_points: Vec<usize>,
    indent: usize,
    len: usize,
}

impl LineLayout {
    fn segment_count(&self) -> usize {
        self.wrap_points.len() + 1
    }

    /// `(start, end)` UTF-16 offsets of segment `k`.
    fn segment(&self, k: usize) -> (usize, usize) {
        let start = if k == 0 { 0 } else { self.wrap_points[k - 1] };
        let end = self.wrap_points.get(k).copied().unwrap_or(self.len);
        (start, end)
    }

    fn segment_indent(&self, k: usize) -> usize {
        if k == 0 { 0 } else { self.indent }
    }
}

/// A soft-wrapping [`ViewModelHelper`].
#[derive(Debug, Clone, Default)]
pub struct WrappedViewModel {
    options: WrapOptions,
    tab_size: usize,
    viewport: Viewport,
    lines: Vec<LineLayout>,
    /// `first_view_line[i]` is the 0-based view line of model line `i + 1`.
    first_view_line: Vec<usize>,
    view_line_count: usize,
}

impl WrappedViewModel {
    /// Create a view model and lay out `model`.
    pub fn new(model: &dyn LineSource, options: WrapOptions, tab_size: usize) -> Self {
        let mut view = Self {
            options,
            tab_size: tab_size.max(1),
            viewport: Viewport::default(),
            ..Default::default()
        };
        view.sync(model);
        view
    }

    /// Wrapping settings.
    pub fn options(&self) -> WrapOptions {
        self.options
    }

    /// Change wrapping settings and re-layout.
    pub fn set_options(&mut self, model: &dyn LineSource, options: WrapOptions) {
        if self.options != options {
            self.options = options;
            self.sync(model);
        }
    }

    /// Change the tab size used for cell widths and re-layout.
    pub fn set_tab_size(&mut self, model: &dyn LineSource, tab_size: usize) {
        let tab_size = tab_size.max(1);
        if self.tab_size != tab_size {
            self.tab_size = tab_size;
            self.sync(model);
        }
    }

    /// Replace the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Recompute the layout of every model line.
    pub fn sync(&mut self, model: &dyn LineSource) {
        let count = model.line_count();
        self.lines.clear();
        self.first_view_line.clear();
        self.lines.reserve(count);
        self.first_view_line.reserve(count);

        let mut view_line = 0usize;
        for line in 1..=count {
            let content = model.line_content(line);
            let points = wrap_points(&content, &self.options, self.tab_size);
            let indent = if points.is_empty() {
                0
            } else {
                wrap_indent_cells(
                    &content,
                    self.options.wrap_indent,
                    self.options.viewport_width,
                    self.tab_size,
                )
            };
            let layout = LineLayout {
                wrap_points: points,
                indent,
                len: utf16_len(&content),
            };
            self.first_view_line.push(view_line);
            view_line += layout.segment_count();
            self.lines.push(layout);
        }
        self.view_line_count = view_line;
    }

    /// `(model line index, segment)` of a 1-based view line, clamped.
    fn locate(&self, view_line: usize) -> (usize, usize) {
        if self.lines.is_empty() {
            return (0, 0);
        }
        let target = view_line.clamp(1, self.view_line_count.max(1)) - 1;
        let index = self
            .first_view_line
            .partition_point(|&first| first <= target)
            .saturating_sub(1);
        (index, target - self.first_view_line[index])
    }

    fn layout(&self, index: usize) -> Option<&LineLayout> {
        self.lines.get(index)
    }
}

impl ViewModelHelper for WrappedViewModel {
    fn view_line_count(&self, model: &dyn DocumentModel) -> usize {
        if self.lines.is_empty() {
            model.line_count()
        } else {
            self.view_line_count
        }
    }

    fn view_line_content(&self, model: &dyn DocumentModel, view_line: usize) -> String {
        let (index, k) = self.locate(view_line);
        let content = model.line_content(index + 1);
        let Some(layout) = self.layout(index) else {
            return content;
        };
        let (start, end) = layout.segment(k);
        let mut out = " ".repeat(layout.segment_indent(k));
        out.push_str(text_between_columns(&content, start + 1, end + 1));
        out
    }

    fn view_line_min_column(&self, _model: &dyn DocumentModel, view_line: usize) -> usize {
        let (index, k) = self.locate(view_line);
        self.layout(index).map_or(1, |l| l.segment_indent(k) + 1)
    }

    fn view_line_max_column(&self, model: &dyn DocumentModel, view_line: usize) -> usize {
        let (index, k) = self.locate(view_line);
        match self.layout(index) {
            Some(layout) => {
                let (start, end) = layout.segment(k);
                layout.segment_indent(k) + (end - start) + 1
            }
            None => model.line_max_column(view_line),
        }
    }

    fn convert_model_position_to_view_position(
        &self,
        model: &dyn DocumentModel,
        position: Position,
    ) -> Position {
        let position = model.validate_position(position);
        let index = position.line - 1;
        let Some(layout) = self.layout(index) else {
            return position;
        };

        let offset = position.column - 1;
        let k = layout.wrap_points.iter().take_while(|&&p| p <= offset).count();
        let (start, _) = layout.segment(k);
        Position::new(
            self.first_view_line[index] + k + 1,
            layout.segment_indent(k) + (offset - start) + 1,
        )
    }

    fn convert_view_position_to_model_position(
        &self,
        model: &dyn DocumentModel,
        view_position: Position,
    ) -> Position {
        let (index, k) = self.locate(view_position.line);
        let Some(layout) = self.layout(index) else {
            return model.validate_position(view_position);
        };

        let (start, end) = layout.segment(k);
        let in_segment = view_position
            .column
            .saturating_sub(1)
            .saturating_sub(layout.segment_indent(k))
            .min(end - start);
        model.validate_position(Position::new(index + 1, start + in_segment + 1))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
