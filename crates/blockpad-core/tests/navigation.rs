use blockpad_core::{BlockCommand, BlockEditor, SelectionRange, SelectionSet};
use pretty_assertions::assert_eq;

const TWO: &str = "\n∞∞∞text\nhello\n∞∞∞text\nworld";

// block 0: "first line\nsecond" [9, 26), block 1: "next block\n\nmore" [35, 51)
const PARAGRAPHS: &str = "\n∞∞∞text\nfirst line\nsecond\n∞∞∞text\nnext block\n\nmore";

fn editor_at(text: &str, cursor: usize) -> BlockEditor {
    let mut editor = BlockEditor::new(text, 80);
    editor.set_selection(SelectionSet::cursor(cursor)).unwrap();
    editor
}

fn heads_after(editor: &mut BlockEditor, command: BlockCommand) -> Vec<usize> {
    let mut heads = Vec::new();
    while editor.execute(command.clone()).unwrap() {
        heads.push(editor.selection().main().head);
    }
    heads
}

#[test]
fn test_next_block_stops_at_content_end_then_next_block_end() {
    let mut editor = editor_at(TWO, 11);
    assert_eq!(heads_after(&mut editor, BlockCommand::GotoNextBlock), vec![14, 28]);
}

#[test]
fn test_previous_block_stops_at_content_start_then_previous_block_start() {
    let mut editor = editor_at(TWO, 25);
    assert_eq!(
        heads_after(&mut editor, BlockCommand::GotoPreviousBlock),
        vec![23, 9]
    );
}

#[test]
fn test_select_next_block_keeps_anchor() {
    let mut editor = editor_at(TWO, 11);
    assert!(editor.execute(BlockCommand::SelectNextBlock).unwrap());
    assert!(editor.execute(BlockCommand::SelectNextBlock).unwrap());
    assert_eq!(editor.selection().main(), &SelectionRange::new(11, 28));
}

#[test]
fn test_block_navigation_moves_every_range() {
    let mut editor = BlockEditor::new(TWO, 80);
    editor
        .set_selection(
            SelectionSet::from_ranges(
                vec![SelectionRange::cursor(10), SelectionRange::cursor(24)],
                1,
            )
            .unwrap(),
        )
        .unwrap();

    assert!(editor.execute(BlockCommand::GotoNextBlock).unwrap());
    assert_eq!(
        editor.selection().ranges(),
        &[SelectionRange::cursor(14), SelectionRange::cursor(28)]
    );
    assert_eq!(editor.selection().main_index(), 1);
}

#[test]
fn test_next_paragraph_crosses_into_next_block() {
    let mut editor = editor_at(PARAGRAPHS, 22);
    assert_eq!(
        heads_after(&mut editor, BlockCommand::GotoNextParagraph),
        vec![35, 46, 51]
    );
}

#[test]
fn test_previous_paragraph_crosses_into_previous_block() {
    let mut editor = editor_at(PARAGRAPHS, 51);
    assert_eq!(
        heads_after(&mut editor, BlockCommand::GotoPreviousParagraph),
        vec![46, 35, 9]
    );
}

#[test]
fn test_select_next_paragraph_extends() {
    let mut editor = editor_at(PARAGRAPHS, 22);
    assert!(editor.execute(BlockCommand::SelectNextParagraph).unwrap());
    assert_eq!(editor.selection().main(), &SelectionRange::new(22, 35));
}

#[test]
fn test_select_all_selects_block_then_document() {
    let mut editor = editor_at(TWO, 25);
    assert!(editor.execute(BlockCommand::SelectAll).unwrap());
    assert_eq!(editor.selection().main(), &SelectionRange::new(23, 28));

    assert!(editor.execute(BlockCommand::SelectAll).unwrap());
    assert_eq!(editor.selection().main(), &SelectionRange::new(0, 28));
}

#[test]
fn test_navigation_does_not_touch_text_or_history() {
    let mut editor = editor_at(PARAGRAPHS, 22);
    editor.execute(BlockCommand::GotoNextBlock).unwrap();
    editor.execute(BlockCommand::GotoNextParagraph).unwrap();
    editor.execute(BlockCommand::SelectAll).unwrap();

    assert_eq!(editor.text(), PARAGRAPHS);
    assert!(!editor.can_undo());
    assert_eq!(editor.version(), 3);
}

#[test]
fn test_navigation_allowed_when_read_only() {
    let mut editor = editor_at(TWO, 25);
    editor.set_read_only(true);
    assert!(editor.execute(BlockCommand::GotoPreviousBlock).unwrap());
    assert_eq!(editor.selection().main().head, 23);
    assert!(editor.execute(BlockCommand::SelectAll).unwrap());
}
