//! Structural block edits.
//!
//! Each operation reads the document and selection, and returns the single [`Transaction`] that
//! carries out the edit together with its resulting selection. `Ok(None)` means "not handled"
//! (read-only document, or a move past the first or last block). Errors are reserved for
//! delimiter corruption and internal inconsistencies.

use blockpad_lang::{BlockDefaults, BlockLanguage};
use tracing::{debug, trace, warn};

use crate::block::{Block, checked_delimiter_text, delimiter_text, is_valid_delimiter};
use crate::block_index::BlockIndex;
use crate::document::DocumentBuffer;
use crate::error::BlockError;
use crate::selection::{SelectionRange, SelectionSet};
use crate::transaction::{EditKind, TextChange, Transaction, UserEvent};

/// Where [`add_new_block`] puts the new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockPlacement {
    /// In front of the active block.
    BeforeCurrent,
    /// Behind the active block.
    AfterCurrent,
    /// In front of the first block.
    BeforeFirst,
    /// Behind the last block.
    AfterLast,
}

/// Where the cursor lands after [`delete_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteCursor {
    /// At the content start of the following block, or the end of the previous block when the
    /// deleted block was the last one.
    NextBlock,
    /// At the end of the previous block.
    PreviousBlock,
}

fn refuse_read_only<D>(doc: &D, command: &'static str) -> bool
where
    D: DocumentBuffer + ?Sized,
{
    if doc.is_read_only() {
        trace!(command, "document is read-only, not handled");
        return true;
    }
    false
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Insert a delimiter at every selection range, replacing the selected text.
///
/// The new delimiter inherits the language of the active block. This is ordinary input: no
/// structural tag is attached. Each range becomes a cursor right after its delimiter.
pub fn insert_new_block_at_cursor<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    if refuse_read_only(doc, "insert_new_block_at_cursor") {
        return Ok(None);
    }

    let language = match blocks.active_block(selection) {
        Ok(block) => block.language.clone(),
        Err(_) => defaults.language(),
    };
    let delimiter = delimiter_text(&language);
    let delimiter_len = char_len(&delimiter);

    let selection = selection.normalized();
    let mut changes = Vec::with_capacity(selection.len());
    let mut cursors = Vec::with_capacity(selection.len());
    let mut shift: isize = 0;
    for range in selection.ranges() {
        changes.push(TextChange::replace(range.from(), range.to(), delimiter.clone()));
        let after = range.from().saturating_add_signed(shift) + delimiter_len;
        cursors.push(SelectionRange::cursor(after));
        shift += delimiter_len as isize - range.len() as isize;
    }
    let selection = SelectionSet::from_ranges(cursors, selection.main_index())?;

    debug!(language = %language, ranges = changes.len(), "insert block at cursor");
    Ok(Some(
        Transaction::with_changes(changes)
            .selection(selection)
            .user_event(UserEvent::Input)
            .scroll_into_view(),
    ))
}

/// Add an empty block with the default language at `placement`.
///
/// The cursor lands right after the new delimiter.
pub fn add_new_block<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
    placement: BlockPlacement,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    if refuse_read_only(doc, "add_new_block") {
        return Ok(None);
    }

    let block = match placement {
        BlockPlacement::BeforeCurrent | BlockPlacement::AfterCurrent => {
            blocks.active_block(selection)?
        }
        BlockPlacement::BeforeFirst => blocks.first()?,
        BlockPlacement::AfterLast => blocks.last()?,
    };

    let delimiter = delimiter_text(&defaults.language());
    let cursor_offset = char_len(&delimiter);
    let (at, insert) = match placement {
        BlockPlacement::BeforeCurrent | BlockPlacement::BeforeFirst => {
            let mut insert = delimiter;
            if block.has_implicit_delimiter() {
                // Text without a delimiter would otherwise become the new block's content.
                insert.push_str(&delimiter_text(&block.language));
            }
            (block.delimiter.from, insert)
        }
        BlockPlacement::AfterCurrent | BlockPlacement::AfterLast => (block.content.to, delimiter),
    };

    debug!(kind = %EditKind::AddNewBlock, ?placement, at, "add block");
    Ok(Some(
        Transaction::with_changes(vec![TextChange::insert(at, insert)])
            .selection(SelectionRange::cursor(at + cursor_offset))
            .annotate(EditKind::AddNewBlock)
            .user_event(UserEvent::Input)
            .scroll_into_view(),
    ))
}

/// Add an empty block in front of the active block.
pub fn add_new_block_before_current<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    add_new_block(doc, blocks, selection, defaults, BlockPlacement::BeforeCurrent)
}

/// Add an empty block behind the active block.
pub fn add_new_block_after_current<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    add_new_block(doc, blocks, selection, defaults, BlockPlacement::AfterCurrent)
}

/// Add an empty block at the very start of the document.
pub fn add_new_block_before_first<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    add_new_block(doc, blocks, selection, defaults, BlockPlacement::BeforeFirst)
}

/// Add an empty block at the very end of the document.
pub fn add_new_block_after_last<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    add_new_block(doc, blocks, selection, defaults, BlockPlacement::AfterLast)
}

/// Rewrite `block`'s delimiter for language `name` with the auto-detect flag `auto`.
///
/// The block's current delimiter must still be a well-formed delimiter: anything else means the
/// block boundaries are corrupt and the edit fails with [`BlockError::InvalidDelimiter`]. The
/// implicit delimiter of leading text is replaced by a real one. The selection is mapped through
/// the change.
pub fn change_language_to<D>(
    doc: &D,
    block: &Block,
    name: &str,
    auto: bool,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    if refuse_read_only(doc, "change_language_to") {
        return Ok(None);
    }

    if !block.has_implicit_delimiter() {
        let current = doc.slice_text(block.delimiter.from, block.delimiter.to)?;
        if !is_valid_delimiter(&current) {
            warn!(
                from = block.delimiter.from,
                to = block.delimiter.to,
                delimiter = ?current,
                "corrupt block delimiter"
            );
            return Err(BlockError::InvalidDelimiter(current));
        }
    }

    let language = BlockLanguage::new(name, auto);
    let insert = checked_delimiter_text(&language)?;

    debug!(
        kind = %EditKind::LanguageChange,
        language = %language,
        at = block.delimiter.from,
        "change block language"
    );
    Ok(Some(
        Transaction::with_changes(vec![TextChange::replace(
            block.delimiter.from,
            block.delimiter.to,
            insert,
        )])
        .annotate(EditKind::LanguageChange),
    ))
}

/// Change the language of the active block.
///
/// `name == None` keeps the current language name and only changes the auto-detect flag.
pub fn change_current_block_language<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    name: Option<&str>,
    auto: bool,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    let block = blocks.active_block(selection)?;
    let name = name.unwrap_or(&block.language.name);
    change_language_to(doc, block, name, auto)
}

/// Swap the active block with its neighbour above (`up`) or below.
///
/// Both blocks are rewritten with one replacement of their combined span. Only the main range
/// survives, shifted by exactly the distance its block moved. Not handled at the first block
/// (up), at the last block (down), or when either block is leading text without a delimiter.
pub fn move_current_block<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    up: bool,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    if refuse_read_only(doc, "move_current_block") {
        return Ok(None);
    }

    let index = blocks.active_index(selection)?;
    let neighbor_index = if up {
        index.checked_sub(1)
    } else {
        Some(index + 1).filter(|i| *i < blocks.len())
    };
    let Some(neighbor_index) = neighbor_index else {
        trace!(up, index, "no neighbour block, not handled");
        return Ok(None);
    };

    let current = blocks.get(index).ok_or(BlockError::NoBlockAt(selection.main().head))?;
    let neighbor = blocks.get(neighbor_index).ok_or(BlockError::NoBlockAt(selection.main().head))?;
    if current.has_implicit_delimiter() || neighbor.has_implicit_delimiter() {
        trace!(up, index, "block without delimiter cannot move, not handled");
        return Ok(None);
    }

    let current_text = doc.slice_text(current.delimiter.from, current.content.to)?;
    let neighbor_text = doc.slice_text(neighbor.delimiter.from, neighbor.content.to)?;

    let (from, to, insert, delta) = if up {
        (
            neighbor.delimiter.from,
            current.content.to,
            current_text + &neighbor_text,
            neighbor.delimiter.from as isize - current.delimiter.from as isize,
        )
    } else {
        (
            current.delimiter.from,
            neighbor.content.to,
            neighbor_text + &current_text,
            neighbor.content.to as isize - neighbor.delimiter.from as isize,
        )
    };

    let range = selection.main().shifted(delta);
    debug!(kind = %EditKind::MoveBlock, up, from, to, delta, "move block");
    Ok(Some(
        Transaction::with_changes(vec![TextChange::replace(from, to, insert)])
            .selection(range)
            .annotate(EditKind::MoveBlock)
            .user_event(UserEvent::Input)
            .scroll_into_view(),
    ))
}

/// Remove the block holding the main head.
///
/// A document never loses its last block: deleting the only block replaces it with an empty
/// block of the default language and puts the cursor after its delimiter.
pub fn delete_block<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
    cursor: DeleteCursor,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    if refuse_read_only(doc, "delete_block") {
        return Ok(None);
    }

    let index = blocks.active_index(selection)?;
    let block = blocks.get(index).ok_or(BlockError::NoBlockAt(selection.main().head))?;

    let (insert, new_cursor) = if blocks.len() == 1 {
        let delimiter = delimiter_text(&defaults.language());
        let len = char_len(&delimiter);
        (delimiter, len)
    } else {
        let next = blocks.get(index + 1);
        let offset = match (cursor, next) {
            (DeleteCursor::NextBlock, Some(next)) => {
                block.delimiter.from + next.delimiter.len()
            }
            _ => block.delimiter.from,
        };
        (String::new(), offset)
    };

    debug!(
        kind = %EditKind::DeleteBlock,
        from = block.range.from,
        to = block.range.to,
        ?cursor,
        "delete block"
    );
    Ok(Some(
        Transaction::with_changes(vec![TextChange::replace(
            block.range.from,
            block.range.to,
            insert,
        )])
        .selection(SelectionRange::cursor(new_cursor))
        .annotate(EditKind::DeleteBlock),
    ))
}

/// Delete the active block and put the cursor at the end of the previous block.
pub fn delete_block_set_cursor_previous_block<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    defaults: &BlockDefaults,
) -> Result<Option<Transaction>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    delete_block(doc, blocks, selection, defaults, DeleteCursor::PreviousBlock)
}

/// A no-op change tagged [`EditKind::CurrenciesLoaded`], kept out of the undo history.
///
/// Dispatching it makes content-aware renderers recompute without touching the text.
pub fn currencies_loaded_transaction() -> Transaction {
    Transaction::with_changes(vec![TextChange::insert(0, "")])
        .annotate(EditKind::CurrenciesLoaded)
        .without_history()
}
