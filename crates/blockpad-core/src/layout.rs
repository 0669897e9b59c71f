//! Headless soft-wrap layout.
//!
//! Computes how logical lines break into visual rows for a viewport width, using UAX #11 cell
//! widths and tab stops. The editor uses it to move cursors one visual row up or down, which is
//! what vertical multi-cursor creation is built on.

use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells).
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Soft wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// No soft wrapping: each logical line is one visual row.
    None,
    /// Wrap at character boundaries.
    #[default]
    Char,
    /// Prefer wrapping after whitespace, falling back to character wrap.
    Word,
}

/// Visual width of a character (UAX #11): 0, 1 or 2 cells.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Width of `ch` when it starts at cell `x`; `'\t'` advances to the next tab stop.
pub fn cell_width_at(ch: char, x: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - x % tab_width
    } else {
        char_width(ch)
    }
}

/// Total width of `s`, expanding tabs.
pub fn str_width(s: &str, tab_width: usize) -> usize {
    s.chars()
        .fold(0usize, |x, ch| x.saturating_add(cell_width_at(ch, x, tab_width)))
}

/// Character indices where the line starts a new visual row.
pub fn wrap_points(text: &str, viewport_width: usize, tab_width: usize, mode: WrapMode) -> Vec<usize> {
    if viewport_width == 0 {
        return Vec::new();
    }
    match mode {
        WrapMode::None => Vec::new(),
        WrapMode::Char => char_wrap_points(text, viewport_width, tab_width),
        WrapMode::Word => word_wrap_points(text, viewport_width, tab_width),
    }
}

fn char_wrap_points(text: &str, viewport_width: usize, tab_width: usize) -> Vec<usize> {
    let mut points = Vec::new();
    let mut x_in_row = 0usize;
    let mut x_in_line = 0usize;
    let total = text.chars().count();

    for (index, ch) in text.chars().enumerate() {
        let width = cell_width_at(ch, x_in_line, tab_width);
        // A wide character that does not fit moves to the next row intact.
        if x_in_row + width > viewport_width && x_in_row > 0 {
            points.push(index);
            x_in_row = 0;
        }
        x_in_row += width;
        x_in_line += width;

        if x_in_row >= viewport_width && index + 1 < total {
            points.push(index + 1);
            x_in_row = 0;
        }
    }
    points
}

fn word_wrap_points(text: &str, viewport_width: usize, tab_width: usize) -> Vec<usize> {
    let mut points = Vec::new();
    let mut row_start = 0usize;
    let mut row_start_x = 0usize;
    // (char index after the whitespace, x at that index)
    let mut last_break: Option<(usize, usize)> = None;
    let mut x_in_line = 0usize;

    for (index, ch) in text.chars().enumerate() {
        let width = cell_width_at(ch, x_in_line, tab_width);

        if x_in_line - row_start_x + width > viewport_width && index > row_start {
            match last_break.take() {
                Some((at, x)) if at > row_start => {
                    points.push(at);
                    row_start = at;
                    row_start_x = x;
                }
                _ => {
                    points.push(index);
                    row_start = index;
                    row_start_x = x_in_line;
                }
            }
        }

        x_in_line += width;
        if ch.is_whitespace() {
            last_break = Some((index + 1, x_in_line));
        }
    }
    points
}

#[derive(Debug, Clone, Default)]
struct LineLayout {
    text: String,
    wrap_points: Vec<usize>,
}

impl LineLayout {
    fn rows(&self) -> usize {
        self.wrap_points.len() + 1
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// `(first column, end column)` of a row; the end is exclusive except on the last row.
    fn row_span(&self, row: usize) -> (usize, usize) {
        let start = if row == 0 {
            0
        } else {
            self.wrap_points.get(row - 1).copied().unwrap_or(0)
        };
        let end = self
            .wrap_points
            .get(row)
            .copied()
            .unwrap_or_else(|| self.char_len());
        (start, end)
    }

    fn row_of_column(&self, column: usize) -> usize {
        self.wrap_points.iter().take_while(|p| column >= **p).count()
    }
}

/// Soft-wrap state for a whole document.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    viewport_width: usize,
    tab_width: usize,
    wrap_mode: WrapMode,
    lines: Vec<LineLayout>,
}

impl LayoutEngine {
    /// Create an empty layout for `viewport_width` cells.
    pub fn new(viewport_width: usize) -> Self {
        Self {
            viewport_width,
            tab_width: DEFAULT_TAB_WIDTH,
            wrap_mode: WrapMode::default(),
            lines: Vec::new(),
        }
    }

    /// Viewport width in cells.
    pub fn viewport_width(&self) -> usize {
        self.viewport_width
    }

    /// Set the viewport width, re-wrapping every line when it changes.
    pub fn set_viewport_width(&mut self, width: usize) {
        if self.viewport_width != width {
            self.viewport_width = width;
            self.rewrap();
        }
    }

    /// Tab width in cells.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Set the tab width (at least 1), re-wrapping every line when it changes.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        let tab_width = tab_width.max(1);
        if self.tab_width != tab_width {
            self.tab_width = tab_width;
            self.rewrap();
        }
    }

    /// Wrap mode.
    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    /// Set the wrap mode, re-wrapping every line when it changes.
    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        if self.wrap_mode != wrap_mode {
            self.wrap_mode = wrap_mode;
            self.rewrap();
        }
    }

    /// Replace all lines (texts without line breaks).
    pub fn set_lines<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.lines = lines
            .into_iter()
            .map(|text| LineLayout {
                text: text.to_string(),
                wrap_points: Vec::new(),
            })
            .collect();
        self.rewrap();
    }

    fn rewrap(&mut self) {
        for line in &mut self.lines {
            line.wrap_points =
                wrap_points(&line.text, self.viewport_width, self.tab_width, self.wrap_mode);
        }
    }

    /// Number of logical lines.
    pub fn logical_line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of visual rows.
    pub fn visual_line_count(&self) -> usize {
        self.lines.iter().map(LineLayout::rows).sum()
    }

    /// Wrap points of a logical line.
    pub fn wrap_points(&self, logical_line: usize) -> Option<&[usize]> {
        self.lines.get(logical_line).map(|l| l.wrap_points.as_slice())
    }

    /// First visual row of a logical line.
    pub fn logical_to_visual_line(&self, logical_line: usize) -> usize {
        self.lines.iter().take(logical_line).map(LineLayout::rows).sum()
    }

    /// `(logical line, row within that line)` of a visual row, clamped to the last row.
    pub fn visual_to_logical_line(&self, visual_line: usize) -> (usize, usize) {
        let mut first_row = 0usize;
        for (index, line) in self.lines.iter().enumerate() {
            if visual_line < first_row + line.rows() {
                return (index, visual_line - first_row);
            }
            first_row += line.rows();
        }
        let last = self.lines.len().saturating_sub(1);
        let last_row = self.lines.last().map(|l| l.rows() - 1).unwrap_or(0);
        (last, last_row)
    }

    /// `(visual row, x cell offset)` of a logical position (column clamped to the line).
    pub fn logical_position_to_visual(
        &self,
        logical_line: usize,
        column: usize,
    ) -> Option<(usize, usize)> {
        let line = self.lines.get(logical_line)?;
        let column = column.min(line.char_len());
        let row = line.row_of_column(column);
        let (start, _) = line.row_span(row);

        let mut x_in_line = 0usize;
        let mut x_in_row = 0usize;
        for (index, ch) in line.text.chars().take(column).enumerate() {
            let width = cell_width_at(ch, x_in_line, self.tab_width);
            x_in_line += width;
            if index >= start {
                x_in_row += width;
            }
        }

        Some((self.logical_to_visual_line(logical_line) + row, x_in_row))
    }

    /// Column on a visual row of `logical_line` closest to cell offset `x` without passing it.
    ///
    /// On a row that is followed by a wrapped continuation the result stays in front of the
    /// wrap point, so it maps back to the same row.
    pub fn column_at_visual_x(&self, logical_line: usize, row: usize, x: usize) -> Option<usize> {
        let line = self.lines.get(logical_line)?;
        let row = row.min(line.rows() - 1);
        let (start, end) = line.row_span(row);
        let last_column = if row + 1 < line.rows() {
            end.saturating_sub(1).max(start)
        } else {
            end
        };

        let mut x_in_line = 0usize;
        let mut x_in_row = 0usize;
        let mut column = start;
        for (index, ch) in line.text.chars().enumerate().take(last_column) {
            let width = cell_width_at(ch, x_in_line, self.tab_width);
            x_in_line += width;
            if index < start {
                continue;
            }
            if x_in_row + width > x {
                break;
            }
            x_in_row += width;
            column = index + 1;
        }
        Some(column.min(last_column))
    }
}
