//! Block structure parsing.
//!
//! A document is partitioned into blocks by in-band delimiters of the form
//! `\n∞∞∞<language>[-a]\n`. Every block starts with its delimiter and runs until the next
//! delimiter (or the end of the document). Blocks are never stored: they are derived from the
//! text with [`parse_blocks`] whenever the structure matters.
//!
//! # Example
//!
//! ```rust
//! use blockpad_core::block::parse_blocks;
//! use blockpad_lang::{BlockDefaults, BlockLanguage};
//!
//! let blocks = parse_blocks("\n∞∞∞text\nhello\n∞∞∞python-a\nprint(1)", &BlockDefaults::default());
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(blocks[1].language, BlockLanguage::auto_detected("python"));
//! assert_eq!((blocks[0].content.from, blocks[0].content.to), (9, 14));
//! ```

use std::sync::LazyLock;

use blockpad_lang::{BlockDefaults, BlockLanguage};
use regex::Regex;

use crate::error::BlockError;
use crate::text::CharCursor;

/// The fixed marker that follows the leading line break of every delimiter.
pub const DELIMITER_MARKER: &str = "∞∞∞";

const DELIMITER_PATTERN: &str = "\\n∞∞∞([^\\n∞]+?)(-a)?\\n";

static DELIMITER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DELIMITER_PATTERN).expect("delimiter pattern compiles"));

static DELIMITER_EXACT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DELIMITER_PATTERN}$")).expect("delimiter pattern compiles")
});

/// A half-open `[from, to)` range of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    /// Inclusive start character offset.
    pub from: usize,
    /// Exclusive end character offset.
    pub to: usize,
}

impl TextRange {
    /// Create a range.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// Returns `true` if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }

    /// Returns `true` if `offset` lies in `[from, to]` (both ends included).
    pub fn touches(&self, offset: usize) -> bool {
        self.from <= offset && offset <= self.to
    }
}

/// One delimiter-bounded unit of the document.
///
/// Invariants: `delimiter.from == range.from`, `content.from == delimiter.to` and
/// `content.to == range.to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The whole block, delimiter included.
    pub range: TextRange,
    /// The opening delimiter.
    pub delimiter: TextRange,
    /// The text after the delimiter, up to the next delimiter or the document end.
    pub content: TextRange,
    /// Language tag parsed from the delimiter.
    pub language: BlockLanguage,
}

impl Block {
    fn new(delimiter: TextRange, content_to: usize, language: BlockLanguage) -> Self {
        Self {
            range: TextRange::new(delimiter.from, content_to),
            delimiter,
            content: TextRange::new(delimiter.to, content_to),
            language,
        }
    }

    /// Returns `true` if the block has a zero-length, implicit delimiter.
    ///
    /// This only happens for text that precedes the first delimiter of a document (including a
    /// document without any delimiter).
    pub fn has_implicit_delimiter(&self) -> bool {
        self.delimiter.is_empty()
    }
}

/// Build the delimiter text for a language: `\n∞∞∞<name>[-a]\n`.
pub fn delimiter_text(language: &BlockLanguage) -> String {
    format!("\n{DELIMITER_MARKER}{}\n", language.token())
}

/// Build a delimiter and check that it parses back as a single delimiter.
///
/// Fails with [`BlockError::InvalidDelimiter`] for language names that are empty or contain line
/// breaks or marker characters.
pub fn checked_delimiter_text(language: &BlockLanguage) -> Result<String, BlockError> {
    let text = delimiter_text(language);
    match parse_delimiter(&text) {
        Some(parsed) if parsed == *language => Ok(text),
        _ => Err(BlockError::InvalidDelimiter(text)),
    }
}

/// Returns `true` if `text` is exactly one well-formed delimiter.
pub fn is_valid_delimiter(text: &str) -> bool {
    DELIMITER_EXACT_REGEX.is_match(text)
}

/// Parse the language of a complete delimiter text.
pub fn parse_delimiter(text: &str) -> Option<BlockLanguage> {
    let caps = DELIMITER_EXACT_REGEX.captures(text)?;
    let name = caps.get(1)?.as_str();
    Some(BlockLanguage::new(name, caps.get(2).is_some()))
}

/// Derive the ordered block list from document text.
///
/// Delimiters are matched left to right and each match is consumed before searching for the
/// next, so a line break shared by two candidate delimiters is never counted twice. Text in
/// front of the first delimiter (or a document without delimiters) becomes a block with an
/// implicit zero-length delimiter and the default language. The result always holds at least
/// one block and the block ranges cover the whole document without gaps.
pub fn parse_blocks(text: &str, defaults: &BlockDefaults) -> Vec<Block> {
    let len = text.chars().count();
    let mut cursor = CharCursor::new(text);

    let delimiters: Vec<(TextRange, BlockLanguage)> = DELIMITER_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let from = cursor.char_offset(whole.start());
            let range = TextRange::new(from, cursor.char_offset(whole.end()));
            Some((range, BlockLanguage::new(name, caps.get(2).is_some())))
        })
        .collect();

    let mut blocks = Vec::with_capacity(delimiters.len() + 1);

    let first_from = delimiters.first().map(|(range, _)| range.from).unwrap_or(len);
    if delimiters.is_empty() || first_from > 0 {
        blocks.push(Block::new(
            TextRange::new(0, 0),
            first_from,
            defaults.language(),
        ));
    }

    for (i, (delimiter, language)) in delimiters.iter().enumerate() {
        let content_to = delimiters
            .get(i + 1)
            .map(|(next, _)| next.from)
            .unwrap_or(len);
        blocks.push(Block::new(*delimiter, content_to, language.clone()));
    }

    blocks
}

/// Compose document text from `(language, content)` pairs.
pub fn compose_blocks<'a, I>(blocks: I) -> String
where
    I: IntoIterator<Item = (&'a BlockLanguage, &'a str)>,
{
    let mut text = String::new();
    for (language, content) in blocks {
        text.push_str(&delimiter_text(language));
        text.push_str(content);
    }
    text
}
