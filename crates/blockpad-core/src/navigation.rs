//! Block and paragraph navigation, block-aware select all and vertical multi-cursor creation.
//!
//! Every command here is a pure function of the document, its block index and the current
//! selection. `Ok(None)` means the selection would not change and nothing should be dispatched.

use tracing::trace;

use crate::block_index::BlockIndex;
use crate::document::{DocumentBuffer, Line};
use crate::error::BlockError;
use crate::selection::{Motion, SelectionRange, SelectionSet, transform_selection};
use crate::transaction::VerticalMotion;

/// Direction of a navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the document end.
    Forward,
    /// Towards the document start.
    Backward,
}

/// Target head for "next block".
///
/// A head that is not yet at the end of its block's content goes there. A head already at the
/// end goes to the end of the following block's content, and stays put in the last block.
pub fn next_block_head(blocks: &BlockIndex, head: usize) -> Result<usize, BlockError> {
    let index = blocks.index_at(head)?;
    let block = blocks.get(index).ok_or(BlockError::NoBlockAt(head))?;
    if head != block.content.to {
        return Ok(block.content.to);
    }
    let next = blocks.get(index + 1).unwrap_or(block);
    Ok(next.content.to)
}

/// Target head for "previous block", the mirror of [`next_block_head`] using content starts.
pub fn previous_block_head(blocks: &BlockIndex, head: usize) -> Result<usize, BlockError> {
    let index = blocks.index_at(head)?;
    let block = blocks.get(index).ok_or(BlockError::NoBlockAt(head))?;
    if head != block.content.from {
        return Ok(block.content.from);
    }
    let previous = blocks.get(index.saturating_sub(1)).unwrap_or(block);
    Ok(previous.content.from)
}

/// The line following `line`, or `None` on the last line.
fn line_after<D>(doc: &D, line: &Line) -> Option<Line>
where
    D: DocumentBuffer + ?Sized,
{
    // A "\r\n" break is two characters wide.
    (line.to + 1..=line.to + 2)
        .map(|offset| doc.line_at(offset))
        .find(|next| next.number > line.number)
}

/// Target head for "next paragraph".
///
/// Lines are scanned from the head's line towards the end of its block. The first blank line
/// that follows a non-blank one is the target. The end of a block acts like a paragraph break:
/// once content has been seen, the scan stops at the start of the next block's content. Without
/// any content seen the scan carries on into the next block. The end of the last block is the
/// final fallback.
pub fn next_paragraph_head<D>(doc: &D, blocks: &BlockIndex, head: usize) -> Result<usize, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    let mut index = blocks.index_at(head)?;
    let mut pos = head;
    let mut seen_content = false;

    loop {
        let block = blocks.get(index).ok_or(BlockError::NoBlockAt(pos))?;
        let mut line = doc.line_at(pos);
        loop {
            if line.is_blank() {
                if seen_content {
                    return Ok(line.from);
                }
            } else {
                seen_content = true;
            }
            if line.to >= block.content.to {
                break;
            }
            match line_after(doc, &line) {
                Some(next) => line = next,
                None => break,
            }
        }

        match blocks.get(index + 1) {
            None => return Ok(block.content.to),
            Some(next) if seen_content => return Ok(next.content.from),
            Some(next) => {
                index += 1;
                pos = next.content.from;
            }
        }
    }
}

/// Target head for "previous paragraph".
///
/// From the first line of a block that is not the first block, the scan starts on the last line
/// of the previous block. Otherwise it starts on the head's own line. Scanning backwards, the
/// first blank line that precedes an already seen non-blank line is the target. Reaching the
/// block's content start ends the scan there.
pub fn previous_paragraph_head<D>(
    doc: &D,
    blocks: &BlockIndex,
    head: usize,
) -> Result<usize, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    let mut index = blocks.index_at(head)?;
    let head_line = doc.line_at(head);

    let mut pos = head_line.from;
    if index > 0
        && blocks
            .get(index)
            .is_some_and(|block| head_line.from == block.content.from)
    {
        index -= 1;
        let previous = blocks.get(index).ok_or(BlockError::NoBlockAt(head))?;
        pos = doc.line_at(previous.content.to).from;
    }
    let block = blocks.get(index).ok_or(BlockError::NoBlockAt(head))?;

    let mut seen_content = false;
    while pos > block.content.from {
        let line = doc.line_at(pos);
        if line.is_blank() {
            if seen_content {
                return Ok(line.from);
            }
        } else {
            seen_content = true;
        }
        if line.from == 0 {
            break;
        }
        pos = doc.line_at(line.from - 1).from;
    }
    Ok(block.content.from)
}

fn navigate<F>(
    selection: &SelectionSet,
    motion: Motion,
    command: &'static str,
    mut target: F,
) -> Result<Option<SelectionSet>, BlockError>
where
    F: FnMut(usize) -> Result<usize, BlockError>,
{
    let next = transform_selection(selection, motion, |range| target(range.head))?;
    match &next {
        Some(sel) => trace!(command, ?motion, head = sel.main().head, "navigate"),
        None => trace!(command, ?motion, "selection unchanged, not handled"),
    }
    Ok(next)
}

/// Move or extend every range by one block in `direction`.
pub fn block_motion(
    blocks: &BlockIndex,
    selection: &SelectionSet,
    direction: Direction,
    motion: Motion,
) -> Result<Option<SelectionSet>, BlockError> {
    match direction {
        Direction::Forward => navigate(selection, motion, "next_block", |head| {
            next_block_head(blocks, head)
        }),
        Direction::Backward => navigate(selection, motion, "previous_block", |head| {
            previous_block_head(blocks, head)
        }),
    }
}

/// Move or extend every range by one paragraph in `direction`.
pub fn paragraph_motion<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
    direction: Direction,
    motion: Motion,
) -> Result<Option<SelectionSet>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    match direction {
        Direction::Forward => navigate(selection, motion, "next_paragraph", |head| {
            next_paragraph_head(doc, blocks, head)
        }),
        Direction::Backward => navigate(selection, motion, "previous_paragraph", |head| {
            previous_paragraph_head(doc, blocks, head)
        }),
    }
}

/// Collapse every range to a cursor at its next block boundary.
pub fn goto_next_block(
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError> {
    block_motion(blocks, selection, Direction::Forward, Motion::Move)
}

/// Extend every range to its next block boundary.
pub fn select_next_block(
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError> {
    block_motion(blocks, selection, Direction::Forward, Motion::Extend)
}

/// Collapse every range to a cursor at its previous block boundary.
pub fn goto_previous_block(
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError> {
    block_motion(blocks, selection, Direction::Backward, Motion::Move)
}

/// Extend every range to its previous block boundary.
pub fn select_previous_block(
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError> {
    block_motion(blocks, selection, Direction::Backward, Motion::Extend)
}

/// Collapse every range to a cursor at the next paragraph stop.
pub fn goto_next_paragraph<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    paragraph_motion(doc, blocks, selection, Direction::Forward, Motion::Move)
}

/// Extend every range to the next paragraph stop.
pub fn select_next_paragraph<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    paragraph_motion(doc, blocks, selection, Direction::Forward, Motion::Extend)
}

/// Collapse every range to a cursor at the previous paragraph stop.
pub fn goto_previous_paragraph<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    paragraph_motion(doc, blocks, selection, Direction::Backward, Motion::Move)
}

/// Extend every range to the previous paragraph stop.
pub fn select_previous_paragraph<D>(
    doc: &D,
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError>
where
    D: DocumentBuffer + ?Sized,
{
    paragraph_motion(doc, blocks, selection, Direction::Backward, Motion::Extend)
}

/// Block-aware select all.
///
/// Selects the content of the active block first. When that content is already selected, or the
/// block is empty, the whole document is selected instead.
pub fn select_all(
    doc_len: usize,
    blocks: &BlockIndex,
    selection: &SelectionSet,
) -> Result<Option<SelectionSet>, BlockError> {
    let block = blocks.active_block(selection)?;
    let main = selection.main();
    let content = block.content;

    let already_selected = main.from() == content.from && main.to() == content.to;
    let next = if content.is_empty() || already_selected {
        SelectionSet::single(SelectionRange::new(0, doc_len))
    } else {
        SelectionSet::single(SelectionRange::new(content.from, content.to))
    };

    if next == *selection {
        trace!("select_all: selection unchanged, not handled");
        return Ok(None);
    }
    trace!(from = next.main().from(), to = next.main().to(), "select_all");
    Ok(Some(next))
}

/// Add one cursor above or below every existing range.
///
/// Each candidate is the head moved one visual row by `motion`, collapsed to a cursor. The
/// candidates are appended after the existing ranges, then repeated ranges are dropped keeping
/// the first copy, so the result never holds the same range twice even when the starting
/// selection did. The main range stays the same. Returns `None` when the selection is unchanged.
pub fn add_cursors_vertically<M>(
    selection: &SelectionSet,
    motion: &M,
    down: bool,
) -> Option<SelectionSet>
where
    M: VerticalMotion + ?Sized,
{
    let candidates: Vec<SelectionRange> = selection
        .ranges()
        .iter()
        .map(|range| SelectionRange::cursor(motion.move_vertically(range, down).head))
        .collect();
    let next = selection.with_ranges_appended(candidates).deduplicated();

    if next == *selection {
        trace!(down, "no new cursor position, not handled");
        return None;
    }
    trace!(down, ranges = next.len(), "add cursors");
    Some(next)
}
