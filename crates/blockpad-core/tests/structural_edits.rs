use std::sync::{Arc, Mutex};

use blockpad_core::{
    BlockCommand, BlockEditor, BlockError, EditKind, SelectionRange, SelectionSet, UserEvent,
};
use blockpad_lang::{BlockDefaults, BlockLanguage};
use pretty_assertions::assert_eq;

const TWO: &str = "\n∞∞∞text\nhello\n∞∞∞text\nworld";

fn editor_at(text: &str, cursor: usize) -> BlockEditor {
    let mut editor = BlockEditor::new(text, 80);
    editor.set_selection(SelectionSet::cursor(cursor)).unwrap();
    editor
}

fn content_of(editor: &BlockEditor, index: usize) -> String {
    let blocks = editor.blocks();
    let block = blocks.get(index).unwrap();
    editor
        .text()
        .chars()
        .skip(block.content.from)
        .take(block.content.len())
        .collect()
}

#[test]
fn test_delete_first_block_moves_cursor_to_next_content() {
    let mut editor = editor_at(TWO, 11);
    assert!(editor.execute(BlockCommand::DeleteBlock).unwrap());
    assert_eq!(editor.text(), "\n∞∞∞text\nworld");
    assert_eq!(editor.selection(), &SelectionSet::cursor(9));
}

#[test]
fn test_delete_middle_block() {
    let text = "\n∞∞∞text\na\n∞∞∞python-a\nb\n∞∞∞math\nc";
    let mut editor = editor_at(text, 22);
    assert_eq!(editor.active_block().unwrap().language.name, "python");

    assert!(editor.execute(BlockCommand::DeleteBlock).unwrap());
    assert_eq!(editor.text(), "\n∞∞∞text\na\n∞∞∞math\nc");
    // cursor at the content start of the block that moved into place
    let blocks = editor.blocks();
    assert_eq!(editor.selection().main().head, blocks.get(1).unwrap().content.from);
}

#[test]
fn test_delete_sole_block_leaves_one_empty_default_block() {
    let mut editor = editor_at("\n∞∞∞math\n1 + 2", 12);
    assert!(editor.execute(BlockCommand::DeleteBlock).unwrap());

    let blocks = editor.blocks();
    assert_eq!(blocks.len(), 1);
    let block = blocks.first().unwrap();
    assert_eq!(block.language, BlockLanguage::auto_detected("text"));
    assert!(block.content.is_empty());
    assert_eq!(editor.selection().main().head, block.content.from);
}

#[test]
fn test_delete_variant_puts_cursor_at_end_of_previous_block() {
    let mut editor = editor_at(TWO, 25);
    assert!(editor
        .execute(BlockCommand::DeleteBlockSetCursorPreviousBlock)
        .unwrap());
    assert_eq!(editor.text(), "\n∞∞∞text\nhello");
    assert_eq!(editor.selection().main().head, 14);
}

#[test]
fn test_add_blocks_use_configured_defaults() {
    let mut editor = editor_at(TWO, 25);
    editor.set_block_defaults(BlockDefaults::new("markdown", false));

    assert!(editor.execute(BlockCommand::AddNewBlockAfterLast).unwrap());
    assert_eq!(editor.text(), format!("{TWO}\n∞∞∞markdown\n"));
    assert_eq!(editor.selection().main().head, editor.text().chars().count());
    assert_eq!(editor.blocks().len(), 3);

    assert!(editor.execute(BlockCommand::AddNewBlockBeforeFirst).unwrap());
    assert!(editor.text().starts_with("\n∞∞∞markdown\n\n∞∞∞text\nhello"));
    assert_eq!(editor.selection().main().head, 13);
    assert_eq!(editor.blocks().len(), 4);
}

#[test]
fn test_insert_new_block_at_cursor_splits_block() {
    let mut editor = editor_at("\n∞∞∞python\nabc\ndef", 15);
    assert!(editor.execute(BlockCommand::InsertNewBlockAtCursor).unwrap());
    assert_eq!(editor.text(), "\n∞∞∞python\nabc\n\n∞∞∞python\ndef");

    let blocks = editor.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks.get(1).unwrap().language, BlockLanguage::fixed("python"));
    assert_eq!(editor.selection().main().head, 26);
}

#[test]
fn test_change_language_keeps_content_identical() {
    let mut editor = editor_at(TWO, 25);
    let before = content_of(&editor, 1);

    assert!(editor
        .execute(BlockCommand::ChangeCurrentBlockLanguage {
            language: Some("python".to_string()),
            auto: true,
        })
        .unwrap());

    assert_eq!(editor.text(), "\n∞∞∞text\nhello\n∞∞∞python-a\nworld");
    assert_eq!(content_of(&editor, 1), before);
    // the cursor follows its text through the longer delimiter
    assert_eq!(editor.selection().main().head, 29);
}

#[test]
fn test_change_language_auto_flag_only() {
    let mut editor = editor_at("\n∞∞∞rust-a\nfn main() {}", 14);
    assert!(editor
        .execute(BlockCommand::ChangeCurrentBlockLanguage {
            language: None,
            auto: false,
        })
        .unwrap());
    assert_eq!(editor.text(), "\n∞∞∞rust\nfn main() {}");
}

#[test]
fn test_change_language_of_other_block() {
    let mut editor = editor_at(TWO, 25);
    assert!(editor
        .execute(BlockCommand::ChangeBlockLanguage {
            at: 10,
            language: "math".to_string(),
            auto: false,
        })
        .unwrap());
    assert_eq!(editor.text(), "\n∞∞∞math\nhello\n∞∞∞text\nworld");
}

#[test]
fn test_change_language_rejects_names_that_break_the_delimiter() {
    let mut editor = editor_at(TWO, 25);
    let err = editor
        .execute(BlockCommand::ChangeCurrentBlockLanguage {
            language: Some("bad\nname".to_string()),
            auto: false,
        })
        .unwrap_err();
    assert!(matches!(err, BlockError::InvalidDelimiter(_)));
    assert_eq!(editor.text(), TWO);
    assert_eq!(editor.version(), 0);
}

#[test]
fn test_move_block_up_then_down_restores_text_and_cursor() {
    let text = "\n∞∞∞text\nfirst\n∞∞∞math\n1 + 2\n∞∞∞python-a\nprint(3)";
    let mut editor = editor_at(text, 22);

    assert!(editor.execute(BlockCommand::MoveCurrentBlockUp).unwrap());
    assert_eq!(
        editor.text(),
        "\n∞∞∞math\n1 + 2\n∞∞∞text\nfirst\n∞∞∞python-a\nprint(3)"
    );
    assert_eq!(editor.active_block().unwrap().language.name, "math");

    assert!(editor.execute(BlockCommand::MoveCurrentBlockDown).unwrap());
    assert_eq!(editor.text(), text);
    assert_eq!(editor.selection(), &SelectionSet::cursor(22));
}

#[test]
fn test_move_block_keeps_selection_extent() {
    let mut editor = BlockEditor::new(TWO, 80);
    editor
        .set_selection(SelectionSet::single(SelectionRange::new(24, 27)))
        .unwrap();
    assert!(editor.execute(BlockCommand::MoveCurrentBlockUp).unwrap());
    assert_eq!(editor.selection().main(), &SelectionRange::new(10, 13));
    assert_eq!(editor.text().chars().skip(10).take(3).collect::<String>(), "orl");
}

#[test]
fn test_move_block_past_edges_is_not_handled() {
    let mut editor = editor_at(TWO, 10);
    assert!(!editor.execute(BlockCommand::MoveCurrentBlockUp).unwrap());

    editor.set_selection(SelectionSet::cursor(26)).unwrap();
    assert!(!editor.execute(BlockCommand::MoveCurrentBlockDown).unwrap());
    assert_eq!(editor.text(), TWO);
    assert_eq!(editor.version(), 0);
}

#[test]
fn test_read_only_refuses_every_structural_edit() {
    let mut editor = editor_at(TWO, 10);
    editor.set_read_only(true);

    for command in [
        BlockCommand::InsertNewBlockAtCursor,
        BlockCommand::AddNewBlockBeforeCurrent,
        BlockCommand::AddNewBlockAfterCurrent,
        BlockCommand::AddNewBlockBeforeFirst,
        BlockCommand::AddNewBlockAfterLast,
        BlockCommand::ChangeCurrentBlockLanguage {
            language: Some("rust".to_string()),
            auto: false,
        },
        BlockCommand::MoveCurrentBlockDown,
        BlockCommand::DeleteBlock,
        BlockCommand::DeleteBlockSetCursorPreviousBlock,
    ] {
        assert!(!editor.execute(command).unwrap());
    }
    assert_eq!(editor.text(), TWO);
}

#[test]
fn test_structural_edits_are_tagged() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let mut editor = editor_at(TWO, 25);
    editor.subscribe(move |event| {
        sink.lock()
            .unwrap()
            .push((event.annotations.clone(), event.user_event));
    });

    editor.execute(BlockCommand::AddNewBlockAfterCurrent).unwrap();
    editor.execute(BlockCommand::MoveCurrentBlockUp).unwrap();
    editor
        .execute(BlockCommand::ChangeCurrentBlockLanguage {
            language: Some("sql".to_string()),
            auto: false,
        })
        .unwrap();
    editor.execute(BlockCommand::DeleteBlock).unwrap();
    editor.execute(BlockCommand::InsertNewBlockAtCursor).unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (vec![EditKind::AddNewBlock], Some(UserEvent::Input)),
            (vec![EditKind::MoveBlock], Some(UserEvent::Input)),
            (vec![EditKind::LanguageChange], None),
            (vec![EditKind::DeleteBlock], None),
            (Vec::new(), Some(UserEvent::Input)),
        ]
    );
}
