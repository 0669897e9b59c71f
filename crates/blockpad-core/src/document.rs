//! Document buffer interface.
//!
//! The block engine never owns text. It reads a document through [`DocumentBuffer`] and asks for
//! edits through a [`TransactionDispatcher`](crate::TransactionDispatcher). [`Document`] is a
//! rope-backed snapshot implementing the read side, used by [`BlockEditor`](crate::BlockEditor)
//! and handy for tests.

use crate::error::BlockError;
use crate::line_index::LineIndex;

/// A single logical line, expressed in character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Zero-based line number.
    pub number: usize,
    /// Character offset of the first character of the line.
    pub from: usize,
    /// Character offset of the end of the line (before the line break).
    pub to: usize,
    /// Line text without the line break.
    pub text: String,
}

impl Line {
    /// Length of the line in characters.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    /// Returns `true` if the line has no characters.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Returns `true` if the line holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        crate::text::is_blank_line(&self.text)
    }
}

/// Read access to the document the block engine operates on.
///
/// All offsets are character offsets.
pub trait DocumentBuffer {
    /// Total document length in characters.
    fn len_chars(&self) -> usize;

    /// Text in `[from, to)`.
    fn slice_text(&self, from: usize, to: usize) -> Result<String, BlockError>;

    /// The line containing `offset`.
    fn line_at(&self, offset: usize) -> Line;

    /// Whether text-changing commands must refuse to act.
    fn is_read_only(&self) -> bool {
        false
    }

    /// Complete document text.
    fn text(&self) -> Result<String, BlockError> {
        self.slice_text(0, self.len_chars())
    }
}

/// An owned document snapshot.
#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: LineIndex,
    read_only: bool,
}

impl Document {
    /// Create a writable document.
    pub fn new(text: &str) -> Self {
        Self {
            lines: LineIndex::new(text),
            read_only: false,
        }
    }

    /// Create a read-only document.
    pub fn read_only(text: &str) -> Self {
        Self {
            lines: LineIndex::new(text),
            read_only: true,
        }
    }

    /// Toggle the read-only flag.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Complete document text.
    pub fn text(&self) -> String {
        self.lines.text()
    }

    /// Underlying line index.
    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    pub(crate) fn line_index_mut(&mut self) -> &mut LineIndex {
        &mut self.lines
    }
}

impl DocumentBuffer for Document {
    fn len_chars(&self) -> usize {
        self.lines.len_chars()
    }

    fn slice_text(&self, from: usize, to: usize) -> Result<String, BlockError> {
        self.lines.slice(from, to)
    }

    fn line_at(&self, offset: usize) -> Line {
        self.lines.line_at(offset)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn text(&self) -> Result<String, BlockError> {
        Ok(self.lines.text())
    }
}
