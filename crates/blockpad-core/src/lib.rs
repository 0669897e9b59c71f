#![warn(missing_docs)]
//! Blockpad Core - Headless Engine for Block-Partitioned Notes
//!
//! # Overview
//!
//! `blockpad-core` manages a single text document split into an ordered list of **blocks**. Each
//! block starts with an in-band delimiter line, `\n∞∞∞<language>[-a]\n`, that carries the block's
//! language and an auto-detect flag. The block list is never stored: it is derived from the text
//! whenever a command needs it, so it always matches the exact document version being edited.
//!
//! # Core Features
//!
//! - **Block Parsing**: delimiter scanning into contiguous, gap-free block ranges
//! - **Block Navigation**: two-phase next/previous block motion and paragraph motion across blocks
//! - **Structural Edits**: add, move, delete and retag blocks as single atomic transactions
//! - **Multi-Cursor**: add cursors one visual row above or below, soft-wrap aware
//! - **Reference Host**: [`BlockEditor`] with undo/redo, versioning and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  BlockEditor (commands, history, notify)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Structural Edits / Navigation              │  ← Command Logic
//! ├─────────────────────────────────────────────┤
//! │  Transactions / Selection Transforms        │  ← Edit Intents
//! ├─────────────────────────────────────────────┤
//! │  Block Index (Block Parser)                 │  ← Derived Structure
//! ├─────────────────────────────────────────────┤
//! │  Layout Engine (Soft Wrapping)              │  ← Vertical Motion
//! ├─────────────────────────────────────────────┤
//! │  Document / Line Index (Rope-based)         │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Using the command interface
//!
//! ```rust
//! use blockpad_core::{BlockCommand, BlockEditor, EditKind, SelectionSet};
//!
//! let mut editor = BlockEditor::new("\n∞∞∞text\nhello\n∞∞∞math\n1 + 2", 80);
//! editor.subscribe(|event| {
//!     if event.annotations.contains(&EditKind::MoveBlock) {
//!         println!("block moved, version {}", event.new_version);
//!     }
//! });
//!
//! editor.set_selection(SelectionSet::cursor(25)).unwrap();
//! editor.execute(BlockCommand::MoveCurrentBlockUp).unwrap();
//! assert_eq!(editor.text(), "\n∞∞∞math\n1 + 2\n∞∞∞text\nhello");
//! ```
//!
//! ## Using the pure functions
//!
//! ```rust
//! use blockpad_core::{BlockIndex, Document, SelectionSet, structure};
//! use blockpad_lang::BlockDefaults;
//!
//! let defaults = BlockDefaults::default();
//! let doc = Document::new("\n∞∞∞text\nhello");
//! let blocks = BlockIndex::from_document(&doc, &defaults).unwrap();
//!
//! let tx = structure::add_new_block_after_last(&doc, &blocks, &SelectionSet::cursor(0), &defaults)
//!     .unwrap()
//!     .expect("writable document");
//! assert_eq!(tx.changes[0].insert, "\n∞∞∞text-a\n");
//! ```
//!
//! # Module Description
//!
//! - [`block`] - Delimiter format and block parsing
//! - [`block_index`] - Block lookups (block at offset, first/last, active block)
//! - [`selection`] - Selection values and transform utilities
//! - [`navigation`] - Block/paragraph navigation, select all, multi-cursor creation
//! - [`structure`] - Structural block edits
//! - [`transaction`] - Edit transactions and host-side traits
//! - [`layout`] - Soft wrapping layout engine
//! - [`editor`] - Reference host executing [`BlockCommand`]s
//!
//! # Offsets
//!
//! Every offset is a character offset (Unicode scalar values), never a byte offset.

pub mod block;
pub mod block_index;
pub mod document;
pub mod editor;
pub mod error;
pub mod layout;
pub mod line_index;
pub mod navigation;
pub mod selection;
pub mod structure;
mod text;
pub mod transaction;

pub use block::{Block, DELIMITER_MARKER, TextRange, compose_blocks, delimiter_text, parse_blocks};
pub use block_index::BlockIndex;
pub use document::{Document, DocumentBuffer, Line};
pub use editor::{BlockCommand, BlockEditor, ChangeOrigin, TransactionCallback, TransactionEvent};
pub use error::BlockError;
pub use layout::{LayoutEngine, WrapMode};
pub use line_index::LineIndex;
pub use navigation::Direction;
pub use selection::{Motion, SelectionRange, SelectionSet, transform_selection};
pub use structure::{BlockPlacement, DeleteCursor};
pub use transaction::{
    EditKind, TextChange, Transaction, TransactionDispatcher, UserEvent, VerticalMotion,
};
