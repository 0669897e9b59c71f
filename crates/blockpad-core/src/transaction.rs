//! Edit transactions and the host-side traits the block engine dispatches through.
//!
//! Commands never write text themselves. Each command computes a [`Transaction`] (the complete
//! change set, the resulting selection and its classification) and hands it to a
//! [`TransactionDispatcher`] exactly once.
//!
//! All change offsets refer to the document *before* the transaction, the same convention as
//! the edits recorded by the undo history.

use std::fmt;

use crate::error::BlockError;
use crate::selection::{SelectionRange, SelectionSet};

/// Classification tag carried by a transaction so listeners can tell edit kinds apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// A new empty block was added next to an existing one.
    AddNewBlock,
    /// A block swapped places with its neighbour.
    MoveBlock,
    /// A block was removed.
    DeleteBlock,
    /// A block's delimiter was rewritten with a new language.
    LanguageChange,
    /// External data (currency rates) became available; content-aware blocks should re-render.
    CurrenciesLoaded,
}

impl EditKind {
    /// Stable wire name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditKind::AddNewBlock => "ADD_NEW_BLOCK",
            EditKind::MoveBlock => "MOVE_BLOCK",
            EditKind::DeleteBlock => "DELETE_BLOCK",
            EditKind::LanguageChange => "LANGUAGE_CHANGE",
            EditKind::CurrenciesLoaded => "CURRENCIES_LOADED",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of user interaction a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEvent {
    /// Text input (typing, pasting, structural block edits).
    Input,
    /// Selection-only change.
    Select,
}

/// Replace `[from, to)` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Start character offset.
    pub from: usize,
    /// Exclusive end character offset.
    pub to: usize,
    /// Replacement text.
    pub insert: String,
}

impl TextChange {
    /// A replacement of `[from, to)`.
    pub fn replace(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    /// An insertion at `at`.
    pub fn insert(at: usize, insert: impl Into<String>) -> Self {
        Self::replace(at, at, insert)
    }

    /// Number of inserted characters.
    pub fn inserted_len(&self) -> usize {
        self.insert.chars().count()
    }

    /// Number of removed characters.
    pub fn removed_len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// Returns `true` if applying the change cannot alter the document.
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.insert.is_empty()
    }
}

/// One atomic document update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Non-overlapping changes, offsets relative to the document before the transaction.
    pub changes: Vec<TextChange>,
    /// Resulting selection. `None` maps the current selection through the changes.
    pub selection: Option<SelectionSet>,
    /// Edit classification tags.
    pub annotations: Vec<EditKind>,
    /// The user interaction that produced the transaction, if any.
    pub user_event: Option<UserEvent>,
    /// Whether the host should scroll the main selection into view.
    pub scroll_into_view: bool,
    /// Whether the host records the transaction as an undoable step.
    pub add_to_history: bool,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
            selection: None,
            annotations: Vec::new(),
            user_event: None,
            scroll_into_view: false,
            add_to_history: true,
        }
    }
}

impl Transaction {
    /// A transaction applying `changes`.
    pub fn with_changes(changes: Vec<TextChange>) -> Self {
        Self {
            changes,
            ..Self::default()
        }
    }

    /// A selection-only transaction.
    pub fn select(selection: SelectionSet) -> Self {
        Self {
            selection: Some(selection),
            user_event: Some(UserEvent::Select),
            scroll_into_view: true,
            ..Self::default()
        }
    }

    /// Set the resulting selection.
    pub fn selection(mut self, selection: impl Into<SelectionSet>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    /// Add an edit classification tag.
    pub fn annotate(mut self, kind: EditKind) -> Self {
        self.annotations.push(kind);
        self
    }

    /// Set the user event.
    pub fn user_event(mut self, event: UserEvent) -> Self {
        self.user_event = Some(event);
        self
    }

    /// Ask the host to scroll the selection into view.
    pub fn scroll_into_view(mut self) -> Self {
        self.scroll_into_view = true;
        self
    }

    /// Keep the transaction out of the undo history.
    pub fn without_history(mut self) -> Self {
        self.add_to_history = false;
        self
    }

    /// Returns `true` if the transaction carries `kind`.
    pub fn has_annotation(&self, kind: EditKind) -> bool {
        self.annotations.contains(&kind)
    }

    /// Returns `true` if at least one change alters text.
    pub fn changes_text(&self) -> bool {
        self.changes.iter().any(|c| !c.is_noop())
    }

    /// Changes sorted by position, checked against a document of `doc_len` characters.
    ///
    /// Fails with [`BlockError::InvalidRange`] for a reversed or out-of-bounds change, or for two
    /// changes that overlap.
    pub fn sorted_changes(&self, doc_len: usize) -> Result<Vec<TextChange>, BlockError> {
        let mut changes = self.changes.clone();
        changes.sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.to.cmp(&b.to)));

        let mut prev_to = 0usize;
        for change in &changes {
            if change.from > change.to || change.to > doc_len || change.from < prev_to {
                return Err(BlockError::InvalidRange {
                    from: change.from,
                    to: change.to,
                });
            }
            prev_to = change.to;
        }
        Ok(changes)
    }

    /// The selection after the transaction: the explicit one, or `current` mapped through the
    /// changes.
    pub fn resulting_selection(
        &self,
        current: &SelectionSet,
        doc_len: usize,
    ) -> Result<SelectionSet, BlockError> {
        if let Some(selection) = &self.selection {
            return Ok(selection.clone());
        }
        let changes = self.sorted_changes(doc_len)?;
        Ok(map_selection(current, &changes))
    }
}

/// Map a pre-change offset to the post-change document.
///
/// `changes` must be sorted and non-overlapping. An offset on a pure insertion point stays in
/// front of the inserted text. An offset inside a replaced range moves to its start, while one at
/// the end of a replaced range follows the replacement.
pub fn map_position(changes: &[TextChange], pos: usize) -> usize {
    let mut delta: isize = 0;
    for change in changes {
        if pos < change.from {
            break;
        }
        if change.from == change.to {
            if pos == change.from {
                break;
            }
            delta += change.inserted_len() as isize;
            continue;
        }
        if pos < change.to {
            return change.from.saturating_add_signed(delta);
        }
        delta += change.inserted_len() as isize - change.removed_len() as isize;
    }
    pos.saturating_add_signed(delta)
}

/// Map every range of `selection` through sorted `changes` and normalize the result.
pub fn map_selection(selection: &SelectionSet, changes: &[TextChange]) -> SelectionSet {
    let ranges: Vec<SelectionRange> = selection
        .ranges()
        .iter()
        .map(|r| {
            SelectionRange::new(
                map_position(changes, r.anchor),
                map_position(changes, r.head),
            )
        })
        .collect();

    SelectionSet::from_ranges(ranges, selection.main_index())
        .map(|s| s.normalized())
        .unwrap_or_default()
}

/// Applies transactions to the document, atomically and at most once per command.
pub trait TransactionDispatcher {
    /// Apply `transaction` as one step.
    fn dispatch(&mut self, transaction: Transaction) -> Result<(), BlockError>;
}

/// Line-wrap aware vertical cursor motion, provided by whatever knows the geometry.
pub trait VerticalMotion {
    /// The cursor one visual row below (`down == true`) or above `range`'s head.
    fn move_vertically(&self, range: &SelectionRange, down: bool) -> SelectionRange;
}
