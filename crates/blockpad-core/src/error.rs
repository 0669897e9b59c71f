use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by block parsing, block lookups and structural edits.
///
/// "Not handled" outcomes (read-only documents, selections that would not change, moving a
/// block past the first/last position) are not errors; operations report them as `Ok(None)` or
/// `Ok(false)`.
pub enum BlockError {
    #[error("invalid delimiter: {0:?}")]
    /// A block's stored delimiter text no longer matches the delimiter format.
    InvalidDelimiter(String),

    #[error("no block contains offset {0}")]
    /// A block lookup found nothing, which means the block list does not cover the document.
    NoBlockAt(usize),

    #[error("invalid range: {from}..{to}")]
    /// A change or slice reaches outside the document.
    InvalidRange {
        /// Inclusive start character offset.
        from: usize,
        /// Exclusive end character offset.
        to: usize,
    },

    #[error("invalid selection: {0}")]
    /// A selection is empty or its main index is out of bounds.
    InvalidSelection(&'static str),
}
