//! Reference host for the block engine.
//!
//! [`BlockEditor`] owns a document, its selection and the collaborators the block commands need:
//! it applies transactions atomically, keeps an undo history, provides wrap-aware vertical
//! motion and notifies subscribers about every applied transaction.
//!
//! # Example
//!
//! ```rust
//! use blockpad_core::{BlockCommand, BlockEditor, SelectionSet};
//!
//! let mut editor = BlockEditor::new("\n∞∞∞text\nhello\n∞∞∞text\nworld", 80);
//! editor.set_selection(SelectionSet::cursor(11)).unwrap();
//!
//! assert!(editor.execute(BlockCommand::DeleteBlock).unwrap());
//! assert_eq!(editor.text(), "\n∞∞∞text\nworld");
//! assert_eq!(editor.selection().main().head, 9);
//!
//! assert!(editor.execute(BlockCommand::Undo).unwrap());
//! assert_eq!(editor.text(), "\n∞∞∞text\nhello\n∞∞∞text\nworld");
//! ```

use blockpad_lang::BlockDefaults;
use tracing::{debug, trace};

use crate::block::Block;
use crate::block_index::BlockIndex;
use crate::document::{Document, DocumentBuffer, Line};
use crate::error::BlockError;
use crate::layout::{LayoutEngine, WrapMode};
use crate::navigation::{self, Direction};
use crate::selection::{Motion, SelectionRange, SelectionSet};
use crate::structure::{self, BlockPlacement, DeleteCursor};
use crate::transaction::{
    EditKind, TextChange, Transaction, TransactionDispatcher, UserEvent, VerticalMotion,
};

const DEFAULT_MAX_UNDO: usize = 1000;

/// Every operation [`BlockEditor::execute`] understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockCommand {
    /// Insert a delimiter at every range, inheriting the active block's language.
    InsertNewBlockAtCursor,
    /// Add an empty default block in front of the active block.
    AddNewBlockBeforeCurrent,
    /// Add an empty default block behind the active block.
    AddNewBlockAfterCurrent,
    /// Add an empty default block at the document start.
    AddNewBlockBeforeFirst,
    /// Add an empty default block at the document end.
    AddNewBlockAfterLast,
    /// Change the language of the block containing `at`.
    ChangeBlockLanguage {
        /// Any offset inside the target block.
        at: usize,
        /// New language name.
        language: String,
        /// New auto-detect flag.
        auto: bool,
    },
    /// Change the language of the active block; `None` keeps the current name.
    ChangeCurrentBlockLanguage {
        /// New language name, or `None` to only change the auto-detect flag.
        language: Option<String>,
        /// New auto-detect flag.
        auto: bool,
    },
    /// Swap the active block with the block above it.
    MoveCurrentBlockUp,
    /// Swap the active block with the block below it.
    MoveCurrentBlockDown,
    /// Delete the active block, cursor to the next block's content.
    DeleteBlock,
    /// Delete the active block, cursor to the end of the previous block.
    DeleteBlockSetCursorPreviousBlock,
    /// Move every range to its next block boundary.
    GotoNextBlock,
    /// Extend every range to its next block boundary.
    SelectNextBlock,
    /// Move every range to its previous block boundary.
    GotoPreviousBlock,
    /// Extend every range to its previous block boundary.
    SelectPreviousBlock,
    /// Move every range to the next paragraph stop.
    GotoNextParagraph,
    /// Extend every range to the next paragraph stop.
    SelectNextParagraph,
    /// Move every range to the previous paragraph stop.
    GotoPreviousParagraph,
    /// Extend every range to the previous paragraph stop.
    SelectPreviousParagraph,
    /// Add a cursor one visual row below every range.
    NewCursorBelow,
    /// Add a cursor one visual row above every range.
    NewCursorAbove,
    /// Select the active block's content, then the whole document.
    SelectAll,
    /// Dispatch the untracked currencies-loaded notification.
    TriggerCurrenciesLoaded,
    /// Undo the last recorded transaction.
    Undo,
    /// Redo the last undone transaction.
    Redo,
}

/// Where an applied change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// A dispatched transaction.
    Transaction,
    /// An undo step.
    Undo,
    /// A redo step.
    Redo,
}

/// Notification sent to subscribers after every applied update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    /// Where the update came from.
    pub origin: ChangeOrigin,
    /// Version before the update.
    pub old_version: u64,
    /// Version after the update.
    pub new_version: u64,
    /// Edit classification tags of the transaction.
    pub annotations: Vec<EditKind>,
    /// User event of the transaction.
    pub user_event: Option<UserEvent>,
    /// Applied changes, offsets relative to the document before the update.
    pub changes: Vec<TextChange>,
    /// Whether the document text changed.
    pub text_changed: bool,
    /// Selection after the update.
    pub selection: SelectionSet,
}

/// Subscriber callback type.
pub type TransactionCallback = Box<dyn FnMut(&TransactionEvent) + Send>;

#[derive(Debug, Clone)]
struct RecordedEdit {
    start_before: usize,
    start_after: usize,
    deleted_text: String,
    inserted_text: String,
}

impl RecordedEdit {
    fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }
}

#[derive(Debug, Clone)]
struct UndoStep {
    edits: Vec<RecordedEdit>,
    annotations: Vec<EditKind>,
    before_selection: SelectionSet,
    after_selection: SelectionSet,
}

#[derive(Debug)]
struct History {
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    max_undo: usize,
}

impl History {
    fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo,
        }
    }

    fn push(&mut self, step: UndoStep) {
        self.redo_stack.clear();
        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(step);
    }
}

/// A document with selection, history and layout that executes block commands.
pub struct BlockEditor {
    document: Document,
    selection: SelectionSet,
    defaults: BlockDefaults,
    layout: LayoutEngine,
    history: History,
    version: u64,
    callbacks: Vec<TransactionCallback>,
}

impl BlockEditor {
    /// Create an editor over `text` with a cursor at the document start.
    pub fn new(text: &str, viewport_width: usize) -> Self {
        let mut editor = Self {
            document: Document::new(text),
            selection: SelectionSet::default(),
            defaults: BlockDefaults::default(),
            layout: LayoutEngine::new(viewport_width),
            history: History::new(DEFAULT_MAX_UNDO),
            version: 0,
            callbacks: Vec::new(),
        };
        editor.rebuild_layout();
        editor
    }

    /// Create an editor holding a single empty block of the default language.
    pub fn empty(viewport_width: usize) -> Self {
        let defaults = BlockDefaults::default();
        let text = crate::block::delimiter_text(&defaults.language());
        let mut editor = Self::new(&text, viewport_width);
        editor.selection = SelectionSet::cursor(editor.document.len_chars());
        editor
    }

    /// Complete document text.
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Replace the selection without recording history.
    pub fn set_selection(&mut self, selection: SelectionSet) -> Result<(), BlockError> {
        self.check_selection(&selection, self.document.len_chars())?;
        self.selection = selection;
        Ok(())
    }

    /// Current version; bumped by every applied update.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` if the document changed after `version`.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Defaults used for new blocks.
    pub fn block_defaults(&self) -> &BlockDefaults {
        &self.defaults
    }

    /// Set the defaults used for new blocks.
    pub fn set_block_defaults(&mut self, defaults: BlockDefaults) {
        self.defaults = defaults;
    }

    /// Make structural commands refuse (or allow) text changes.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.document.set_read_only(read_only);
    }

    /// Layout engine.
    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    /// Set the viewport width used for soft wrapping.
    pub fn set_viewport_width(&mut self, width: usize) {
        self.layout.set_viewport_width(width);
    }

    /// Set the tab width used for soft wrapping.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.layout.set_tab_width(tab_width);
    }

    /// Set the soft wrapping mode.
    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.layout.set_wrap_mode(wrap_mode);
    }

    /// Block structure of the current text.
    pub fn blocks(&self) -> BlockIndex {
        BlockIndex::from_text(&self.document.text(), &self.defaults)
    }

    /// The block holding the main selection head.
    pub fn active_block(&self) -> Result<Block, BlockError> {
        self.blocks().active_block(&self.selection).cloned()
    }

    /// Subscribe to applied updates.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&TransactionEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Can undo.
    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty()
    }

    /// Can redo.
    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    /// Undo stack depth.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_stack.len()
    }

    /// Redo stack depth.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_stack.len()
    }

    /// Execute a command. `Ok(false)` means the command was not handled.
    pub fn execute(&mut self, command: BlockCommand) -> Result<bool, BlockError> {
        match command {
            BlockCommand::Undo => return self.undo(),
            BlockCommand::Redo => return self.redo(),
            _ => {}
        }

        let Some(transaction) = self.transaction_for(&command)? else {
            trace!(?command, "not handled");
            return Ok(false);
        };
        self.dispatch(transaction)?;
        Ok(true)
    }

    fn transaction_for(&self, command: &BlockCommand) -> Result<Option<Transaction>, BlockError> {
        let doc = &self.document;
        let sel = &self.selection;
        let defaults = &self.defaults;
        let blocks = BlockIndex::from_document(doc, defaults)?;

        let select = |next: Option<SelectionSet>| next.map(Transaction::select);

        Ok(match command {
            BlockCommand::InsertNewBlockAtCursor => {
                structure::insert_new_block_at_cursor(doc, &blocks, sel, defaults)?
            }
            BlockCommand::AddNewBlockBeforeCurrent => {
                structure::add_new_block(doc, &blocks, sel, defaults, BlockPlacement::BeforeCurrent)?
            }
            BlockCommand::AddNewBlockAfterCurrent => {
                structure::add_new_block(doc, &blocks, sel, defaults, BlockPlacement::AfterCurrent)?
            }
            BlockCommand::AddNewBlockBeforeFirst => {
                structure::add_new_block(doc, &blocks, sel, defaults, BlockPlacement::BeforeFirst)?
            }
            BlockCommand::AddNewBlockAfterLast => {
                structure::add_new_block(doc, &blocks, sel, defaults, BlockPlacement::AfterLast)?
            }
            BlockCommand::ChangeBlockLanguage { at, language, auto } => {
                let block = blocks.block_at(*at)?;
                structure::change_language_to(doc, block, language, *auto)?
            }
            BlockCommand::ChangeCurrentBlockLanguage { language, auto } => {
                structure::change_current_block_language(
                    doc,
                    &blocks,
                    sel,
                    language.as_deref(),
                    *auto,
                )?
            }
            BlockCommand::MoveCurrentBlockUp => {
                structure::move_current_block(doc, &blocks, sel, true)?
            }
            BlockCommand::MoveCurrentBlockDown => {
                structure::move_current_block(doc, &blocks, sel, false)?
            }
            BlockCommand::DeleteBlock => {
                structure::delete_block(doc, &blocks, sel, defaults, DeleteCursor::NextBlock)?
            }
            BlockCommand::DeleteBlockSetCursorPreviousBlock => {
                structure::delete_block(doc, &blocks, sel, defaults, DeleteCursor::PreviousBlock)?
            }
            BlockCommand::GotoNextBlock => select(navigation::block_motion(
                &blocks,
                sel,
                Direction::Forward,
                Motion::Move,
            )?),
            BlockCommand::SelectNextBlock => select(navigation::block_motion(
                &blocks,
                sel,
                Direction::Forward,
                Motion::Extend,
            )?),
            BlockCommand::GotoPreviousBlock => select(navigation::block_motion(
                &blocks,
                sel,
                Direction::Backward,
                Motion::Move,
            )?),
            BlockCommand::SelectPreviousBlock => select(navigation::block_motion(
                &blocks,
                sel,
                Direction::Backward,
                Motion::Extend,
            )?),
            BlockCommand::GotoNextParagraph => select(navigation::paragraph_motion(
                doc,
                &blocks,
                sel,
                Direction::Forward,
                Motion::Move,
            )?),
            BlockCommand::SelectNextParagraph => select(navigation::paragraph_motion(
                doc,
                &blocks,
                sel,
                Direction::Forward,
                Motion::Extend,
            )?),
            BlockCommand::GotoPreviousParagraph => select(navigation::paragraph_motion(
                doc,
                &blocks,
                sel,
                Direction::Backward,
                Motion::Move,
            )?),
            BlockCommand::SelectPreviousParagraph => select(navigation::paragraph_motion(
                doc,
                &blocks,
                sel,
                Direction::Backward,
                Motion::Extend,
            )?),
            BlockCommand::NewCursorBelow => navigation::add_cursors_vertically(sel, self, true)
                .map(|next| Transaction::default().selection(next)),
            BlockCommand::NewCursorAbove => navigation::add_cursors_vertically(sel, self, false)
                .map(|next| Transaction::default().selection(next)),
            BlockCommand::SelectAll => select(navigation::select_all(
                doc.len_chars(),
                &blocks,
                sel,
            )?),
            BlockCommand::TriggerCurrenciesLoaded => {
                Some(structure::currencies_loaded_transaction())
            }
            BlockCommand::Undo | BlockCommand::Redo => None,
        })
    }

    /// Undo the last recorded transaction. `Ok(false)` if there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, BlockError> {
        if self.document.is_read_only() {
            trace!("document is read-only, undo not handled");
            return Ok(false);
        }
        let Some(step) = self.history.undo_stack.pop() else {
            return Ok(false);
        };

        let ops: Vec<(usize, usize, &str)> = step
            .edits
            .iter()
            .map(|e| (e.start_after, e.inserted_len(), e.deleted_text.as_str()))
            .collect();
        let changes = self.apply_text_ops(ops)?;
        self.selection = step.before_selection.clone();
        debug!(annotations = ?step.annotations, "undo");
        self.history.redo_stack.push(step);
        self.notify(ChangeOrigin::Undo, Vec::new(), None, changes, true);
        Ok(true)
    }

    /// Redo the last undone transaction. `Ok(false)` if there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, BlockError> {
        if self.document.is_read_only() {
            trace!("document is read-only, redo not handled");
            return Ok(false);
        }
        let Some(step) = self.history.redo_stack.pop() else {
            return Ok(false);
        };

        let ops: Vec<(usize, usize, &str)> = step
            .edits
            .iter()
            .map(|e| (e.start_before, e.deleted_len(), e.inserted_text.as_str()))
            .collect();
        let changes = self.apply_text_ops(ops)?;
        self.selection = step.after_selection.clone();
        debug!(annotations = ?step.annotations, "redo");
        self.history.undo_stack.push(step);
        self.notify(ChangeOrigin::Redo, Vec::new(), None, changes, true);
        Ok(true)
    }

    /// Apply `(start, delete_len, insert)` operations given in pre-update offsets.
    ///
    /// Operations are applied from the highest offset down so earlier offsets stay valid. Among
    /// operations starting at the same offset the later one is applied first, which keeps
    /// insertions in their given order.
    fn apply_text_ops(
        &mut self,
        ops: Vec<(usize, usize, &str)>,
    ) -> Result<Vec<TextChange>, BlockError> {
        let mut ops: Vec<(usize, (usize, usize, &str))> = ops.into_iter().enumerate().collect();
        ops.sort_by(|(ia, a), (ib, b)| (b.0, b.1, ib).cmp(&(a.0, a.1, ia)));

        let mut applied = Vec::with_capacity(ops.len());
        for (_, (start, delete_len, insert)) in ops {
            self.document
                .line_index_mut()
                .replace(start, start + delete_len, insert)?;
            applied.push(TextChange::replace(start, start + delete_len, insert));
        }

        applied.reverse();
        self.rebuild_layout();
        Ok(applied)
    }

    fn rebuild_layout(&mut self) {
        let texts: Vec<String> = self.document.line_index().line_texts().collect();
        self.layout.set_lines(texts.iter().map(String::as_str));
    }

    fn check_selection(&self, selection: &SelectionSet, doc_len: usize) -> Result<(), BlockError> {
        match selection.ranges().iter().find(|r| r.to() > doc_len) {
            Some(range) => Err(BlockError::InvalidRange {
                from: range.from(),
                to: range.to(),
            }),
            None => Ok(()),
        }
    }

    fn notify(
        &mut self,
        origin: ChangeOrigin,
        annotations: Vec<EditKind>,
        user_event: Option<UserEvent>,
        changes: Vec<TextChange>,
        text_changed: bool,
    ) {
        let old_version = self.version;
        self.version += 1;
        let event = TransactionEvent {
            origin,
            old_version,
            new_version: self.version,
            annotations,
            user_event,
            changes,
            text_changed,
            selection: self.selection.clone(),
        };
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }
}

impl TransactionDispatcher for BlockEditor {
    fn dispatch(&mut self, transaction: Transaction) -> Result<(), BlockError> {
        let before_len = self.document.len_chars();
        let changes = transaction.sorted_changes(before_len)?;
        let selection = transaction.resulting_selection(&self.selection, before_len)?;

        let after_len = changes.iter().fold(before_len as isize, |len, c| {
            len + c.inserted_len() as isize - c.removed_len() as isize
        });
        self.check_selection(&selection, after_len.max(0) as usize)?;

        let mut edits = Vec::with_capacity(changes.len());
        let mut shift: isize = 0;
        for change in changes.iter().filter(|c| !c.is_noop()) {
            edits.push(RecordedEdit {
                start_before: change.from,
                start_after: change.from.saturating_add_signed(shift),
                deleted_text: self.document.slice_text(change.from, change.to)?,
                inserted_text: change.insert.clone(),
            });
            shift += change.inserted_len() as isize - change.removed_len() as isize;
        }
        let text_changed = !edits.is_empty();

        if text_changed {
            let ops = edits
                .iter()
                .map(|e| (e.start_before, e.deleted_len(), e.inserted_text.as_str()))
                .collect();
            self.apply_text_ops(ops)?;
        }

        let before_selection = std::mem::replace(&mut self.selection, selection);

        if text_changed && transaction.add_to_history {
            self.history.push(UndoStep {
                edits,
                annotations: transaction.annotations.clone(),
                before_selection,
                after_selection: self.selection.clone(),
            });
        }

        debug!(
            annotations = ?transaction.annotations,
            user_event = ?transaction.user_event,
            changes = changes.len(),
            text_changed,
            version = self.version + 1,
            "dispatch"
        );
        self.notify(
            ChangeOrigin::Transaction,
            transaction.annotations,
            transaction.user_event,
            changes,
            text_changed,
        );
        Ok(())
    }
}

impl DocumentBuffer for BlockEditor {
    fn len_chars(&self) -> usize {
        self.document.len_chars()
    }

    fn slice_text(&self, from: usize, to: usize) -> Result<String, BlockError> {
        self.document.slice_text(from, to)
    }

    fn line_at(&self, offset: usize) -> Line {
        self.document.line_at(offset)
    }

    fn is_read_only(&self) -> bool {
        self.document.is_read_only()
    }

    fn text(&self) -> Result<String, BlockError> {
        Ok(self.document.text())
    }
}

impl VerticalMotion for BlockEditor {
    fn move_vertically(&self, range: &SelectionRange, down: bool) -> SelectionRange {
        let lines = self.document.line_index();
        let (line, column) = lines.offset_to_position(range.head);
        let Some((row, x)) = self.layout.logical_position_to_visual(line, column) else {
            return SelectionRange::cursor(range.head);
        };

        let target_row = if down {
            if row + 1 >= self.layout.visual_line_count() {
                return SelectionRange::cursor(lines.len_chars());
            }
            row + 1
        } else {
            if row == 0 {
                return SelectionRange::cursor(0);
            }
            row - 1
        };

        let (target_line, sub_row) = self.layout.visual_to_logical_line(target_row);
        let target_column = self
            .layout
            .column_at_visual_x(target_line, sub_row, x)
            .unwrap_or(0);
        SelectionRange::cursor(lines.position_to_offset(target_line, target_column))
    }
}
