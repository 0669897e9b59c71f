//! Block lookups over a parsed block list.

use blockpad_lang::BlockDefaults;

use crate::block::{Block, parse_blocks};
use crate::document::DocumentBuffer;
use crate::error::BlockError;
use crate::selection::SelectionSet;

/// The block structure of one document version.
///
/// A `BlockIndex` is derived from text and is only valid for the exact version it was built
/// from. Commands rebuild it every time they run instead of caching it across edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIndex {
    blocks: Vec<Block>,
}

impl BlockIndex {
    /// Parse `text` into a block index.
    pub fn from_text(text: &str, defaults: &BlockDefaults) -> Self {
        Self {
            blocks: parse_blocks(text, defaults),
        }
    }

    /// Parse the current text of a document.
    pub fn from_document<D>(doc: &D, defaults: &BlockDefaults) -> Result<Self, BlockError>
    where
        D: DocumentBuffer + ?Sized,
    {
        Ok(Self::from_text(&doc.text()?, defaults))
    }

    /// All blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks (always at least 1 for a parsed document).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the index holds no block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at position `index` in document order.
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// First block of the document.
    pub fn first(&self) -> Result<&Block, BlockError> {
        self.blocks.first().ok_or(BlockError::NoBlockAt(0))
    }

    /// Last block of the document.
    pub fn last(&self) -> Result<&Block, BlockError> {
        self.blocks.last().ok_or(BlockError::NoBlockAt(0))
    }

    /// Index of the block containing `offset`.
    ///
    /// Block ranges are compared inclusively and the earlier block wins, so an offset sitting on
    /// the boundary between two blocks (the end of one block's content, which is also the start
    /// of the next delimiter) belongs to the block that ends there.
    pub fn index_at(&self, offset: usize) -> Result<usize, BlockError> {
        self.blocks
            .iter()
            .position(|block| block.range.touches(offset))
            .ok_or(BlockError::NoBlockAt(offset))
    }

    /// Block containing `offset` (see [`BlockIndex::index_at`] for boundary handling).
    pub fn block_at(&self, offset: usize) -> Result<&Block, BlockError> {
        let index = self.index_at(offset)?;
        Ok(&self.blocks[index])
    }

    /// Position of `block` in the index, matched by its range rather than its content.
    pub fn index_of(&self, block: &Block) -> Option<usize> {
        self.blocks.iter().position(|b| b.range == block.range)
    }

    /// The block holding the head of the selection's main range.
    pub fn active_block(&self, selection: &SelectionSet) -> Result<&Block, BlockError> {
        self.block_at(selection.main().head)
    }

    /// Index of the active block.
    pub fn active_index(&self, selection: &SelectionSet) -> Result<usize, BlockError> {
        self.index_at(selection.main().head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    const TWO_BLOCKS: &str = "\n∞∞∞text\nhello\n∞∞∞math\n1+1";

    fn index(text: &str) -> BlockIndex {
        BlockIndex::from_text(text, &BlockDefaults::default())
    }

    #[test]
    fn test_first_last() {
        let idx = index(TWO_BLOCKS);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.first().unwrap().delimiter.from, 0);
        assert_eq!(idx.last().unwrap().language.name, "math");
    }

    #[test]
    fn test_block_at_boundary_prefers_earlier_block() {
        let idx = index(TWO_BLOCKS);
        // 14 is both the end of block 0's content and the start of block 1's delimiter.
        assert_eq!(idx.index_at(14).unwrap(), 0);
        assert_eq!(idx.index_at(15).unwrap(), 1);
        assert_eq!(idx.index_at(0).unwrap(), 0);
        assert_eq!(idx.index_at(26).unwrap(), 1);
    }

    #[test]
    fn test_block_at_out_of_range_is_an_error() {
        let idx = index(TWO_BLOCKS);
        assert_eq!(idx.block_at(500), Err(BlockError::NoBlockAt(500)));
    }

    #[test]
    fn test_index_of_uses_position() {
        let idx = index("\n∞∞∞text\nsame\n∞∞∞text\nsame");
        let second = idx.get(1).cloned().unwrap();
        assert_eq!(idx.index_of(&second), Some(1));
    }

    struct Unreadable;

    impl DocumentBuffer for Unreadable {
        fn len_chars(&self) -> usize {
            4
        }

        fn slice_text(&self, from: usize, to: usize) -> Result<String, BlockError> {
            Err(BlockError::InvalidRange { from, to })
        }

        fn line_at(&self, offset: usize) -> crate::document::Line {
            crate::document::Line {
                number: 0,
                from: offset,
                to: offset,
                text: String::new(),
            }
        }
    }

    #[test]
    fn test_from_document_propagates_read_errors() {
        assert_eq!(
            BlockIndex::from_document(&Unreadable, &BlockDefaults::default()),
            Err(BlockError::InvalidRange { from: 0, to: 4 })
        );
    }

    #[test]
    fn test_active_block() {
        let doc = Document::new(TWO_BLOCKS);
        let idx = BlockIndex::from_document(&doc, &BlockDefaults::default()).unwrap();
        let sel = SelectionSet::cursor(20);
        assert_eq!(idx.active_index(&sel).unwrap(), 1);
        assert_eq!(idx.active_block(&sel).unwrap().language.name, "math");
    }
}
