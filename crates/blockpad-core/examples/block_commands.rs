//! Block command example
//!
//! Demonstrates how to drive a block document through `BlockEditor`.

use blockpad_core::{BlockCommand, BlockEditor, EditKind, SelectionSet};

fn print_blocks(editor: &BlockEditor) {
    let text: Vec<char> = editor.text().chars().collect();
    for (i, block) in editor.blocks().blocks().iter().enumerate() {
        let content: String = text[block.content.from..block.content.to].iter().collect();
        println!("  [{i}] {:<12} {:?}", block.language.token(), content);
    }
}

fn main() {
    println!("=== Block command example ===\n");

    let mut editor = BlockEditor::new(
        "\n∞∞∞text-a\nShopping list\n\n∞∞∞math\n12 EUR in USD\n∞∞∞markdown\n# Notes",
        80,
    );
    editor.subscribe(|event| {
        if !event.annotations.is_empty() {
            let tags: Vec<&str> = event.annotations.iter().map(EditKind::as_str).collect();
            println!("  -> v{} {}", event.new_version, tags.join(","));
        }
    });
    println!("Initial blocks:");
    print_blocks(&editor);

    // 1. Navigation
    println!("\n1. Navigation:");
    editor.set_selection(SelectionSet::cursor(0)).unwrap();
    while editor.execute(BlockCommand::GotoNextBlock).unwrap() {
        println!("  next block -> {}", editor.selection().main().head);
    }

    // 2. Structural edits
    println!("\n2. Structural edits:");
    editor.execute(BlockCommand::MoveCurrentBlockUp).unwrap();
    editor.execute(BlockCommand::AddNewBlockAfterCurrent).unwrap();
    editor
        .execute(BlockCommand::ChangeCurrentBlockLanguage {
            language: Some("python".to_string()),
            auto: false,
        })
        .unwrap();
    print_blocks(&editor);

    // 3. Delete and undo
    println!("\n3. Delete and undo:");
    editor.execute(BlockCommand::DeleteBlock).unwrap();
    println!("  after delete: {} blocks", editor.blocks().len());
    editor.execute(BlockCommand::Undo).unwrap();
    println!("  after undo:   {} blocks", editor.blocks().len());

    // 4. Read-only
    println!("\n4. Read-only:");
    editor.set_read_only(true);
    let handled = editor.execute(BlockCommand::DeleteBlock).unwrap();
    println!("  delete handled: {handled}");
}
