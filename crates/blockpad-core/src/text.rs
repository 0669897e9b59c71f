//! Small text helpers shared by the parser and the document types.

/// Converts byte offsets of one `&str` into char offsets.
///
/// Regex matches are reported in bytes while every public offset in this crate is a char offset.
/// Matches arrive in ascending order, so the cursor only counts the chars between the previous
/// and the requested offset.
#[derive(Debug)]
pub(crate) struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// Char offset of `byte_offset`, rounded down to a char boundary and clamped to the text.
    pub(crate) fn char_offset(&mut self, byte_offset: usize) -> usize {
        let mut target = byte_offset.min(self.text.len());
        while !self.text.is_char_boundary(target) {
            target -= 1;
        }
        if target < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..target].chars().count();
        self.byte = target;
        self.chars
    }
}

/// Returns `true` if the line holds nothing but whitespace.
pub fn is_blank_line(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}
