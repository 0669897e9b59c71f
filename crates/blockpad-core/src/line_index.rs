//! Rope-backed line storage.
//!
//! [`LineIndex`] is the text store behind a [`Document`](crate::Document). Block parsing works on
//! the flat text, while paragraph navigation and vertical motion need fast line lookups; the rope
//! answers both in O(log N).

use ropey::Rope;

use crate::document::Line;
use crate::error::BlockError;

/// Characters that end a line, besides the two-character `"\r\n"`. The rope is built without
/// Unicode line breaks, so U+2028 and friends stay ordinary characters.
const LINE_BREAKS: [char; 2] = ['\n', '\r'];

/// Line lookups and edits over a rope, in character offsets.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Index `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Number of lines; an empty text and a text ending in a line break both count the final
    /// empty line.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// The line numbered `number`, without its line break.
    pub fn line(&self, number: usize) -> Option<Line> {
        let slice = self.rope.get_line(number)?;
        let from = self.rope.line_to_char(number);

        let mut text = slice.to_string();
        if text.ends_with("\r\n") {
            text.truncate(text.len() - 2);
        } else if text.ends_with(LINE_BREAKS) {
            text.pop();
        }
        let to = from + text.chars().count();

        Some(Line {
            number,
            from,
            to,
            text,
        })
    }

    /// The line holding `offset`, clamped to the end of the text.
    ///
    /// An offset on a line break belongs to the line that break ends.
    pub fn line_at(&self, offset: usize) -> Line {
        let offset = offset.min(self.rope.len_chars());
        let number = self.rope.char_to_line(offset);
        self.line(number).unwrap_or(Line {
            number,
            from: offset,
            to: offset,
            text: String::new(),
        })
    }

    /// `(line, column)` of `offset`, clamped to the end of the text.
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        (line, offset - self.rope.line_to_char(line))
    }

    /// Offset of `(line, column)`. The column is clamped to the line, a line past the end maps to
    /// the end of the text.
    pub fn position_to_offset(&self, line: usize, column: usize) -> usize {
        self.line(line)
            .map_or(self.rope.len_chars(), |line| line.from + column.min(line.len()))
    }

    /// Text in `[from, to)`.
    pub fn slice(&self, from: usize, to: usize) -> Result<String, BlockError> {
        if from > to || to > self.rope.len_chars() {
            return Err(BlockError::InvalidRange { from, to });
        }
        Ok(self.rope.slice(from..to).to_string())
    }

    /// Replace `[from, to)` with `insert`.
    pub fn replace(&mut self, from: usize, to: usize, insert: &str) -> Result<(), BlockError> {
        if from > to || to > self.rope.len_chars() {
            return Err(BlockError::InvalidRange { from, to });
        }
        if from < to {
            self.rope.remove(from..to);
        }
        if !insert.is_empty() {
            self.rope.insert(from, insert);
        }
        Ok(())
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Texts of all lines, without line breaks.
    pub fn line_texts(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.rope.len_lines()).filter_map(|number| self.line(number).map(|line| line.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NOTE: &str = "\n∞∞∞text\nfirst\n\n∞∞∞math-a\n1 + 2";

    #[test]
    fn test_delimiter_lines() {
        let index = LineIndex::new(NOTE);
        assert_eq!(index.len_lines(), 6);
        assert_eq!(index.len_chars(), NOTE.chars().count());

        let marker = index.line_at(3);
        assert_eq!((marker.number, marker.from, marker.to), (1, 1, 8));
        assert_eq!(marker.text, "∞∞∞text");

        // the leading line break opens an empty first line
        assert!(index.line_at(0).is_empty());
    }

    #[test]
    fn test_line_at_break_and_past_end() {
        let index = LineIndex::new(NOTE);
        // offset 14 is the break ending "first"
        assert_eq!(index.line_at(14).text, "first");
        let blank = index.line_at(15);
        assert_eq!((blank.from, blank.to), (15, 15));

        let last = index.line_at(1_000);
        assert_eq!(last.text, "1 + 2");
        assert_eq!(last.to, index.len_chars());
    }

    #[test]
    fn test_crlf_lines() {
        let index = LineIndex::new("ab\r\ncd\r\n");
        let first = index.line(0).unwrap();
        assert_eq!((first.from, first.to, first.text.as_str()), (0, 2, "ab"));
        assert_eq!(index.line(1).unwrap().from, 4);
        assert!(index.line(2).unwrap().is_empty());
        assert_eq!(index.line(3), None);
    }

    #[test]
    fn test_only_lf_and_cr_break_lines() {
        let index = LineIndex::new("a\u{2028}b\u{0085}c\u{000C}d\re");
        assert_eq!(index.len_lines(), 2);
        assert_eq!(index.line(0).unwrap().text, "a\u{2028}b\u{0085}c\u{000C}d");
        assert_eq!(index.line(1).unwrap().from, 8);
    }

    #[test]
    fn test_position_roundtrip() {
        let index = LineIndex::new(NOTE);
        assert_eq!(index.offset_to_position(11), (2, 2));
        assert_eq!(index.position_to_offset(2, 2), 11);
        assert_eq!(index.position_to_offset(2, 99), 14);
        assert_eq!(index.position_to_offset(42, 0), index.len_chars());
    }

    #[test]
    fn test_slice_and_replace() {
        let mut index = LineIndex::new(NOTE);
        assert_eq!(index.slice(9, 14).unwrap(), "first");
        assert_eq!(
            index.slice(9, 1_000),
            Err(BlockError::InvalidRange { from: 9, to: 1_000 })
        );

        index.replace(9, 14, "1st").unwrap();
        assert_eq!(index.line_texts().nth(2).as_deref(), Some("1st"));
        index.replace(0, 0, "lead").unwrap();
        assert!(index.text().starts_with("lead\n∞∞∞text\n1st"));
        assert!(index.replace(5, 2, "").is_err());
    }
}
