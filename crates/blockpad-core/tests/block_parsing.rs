use blockpad_core::{
    BlockCommand, BlockEditor, BlockIndex, SelectionSet, compose_blocks, parse_blocks,
};
use blockpad_lang::{BlockDefaults, BlockLanguage};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn arb_language() -> impl Strategy<Value = BlockLanguage> {
    ("[a-z]{1,8}", any::<bool>()).prop_map(|(name, auto)| BlockLanguage::new(name, auto))
}

fn arb_blocks(min: usize) -> impl Strategy<Value = Vec<(BlockLanguage, String)>> {
    prop::collection::vec((arb_language(), "[a-z0-9 \n]{0,16}"), min..6)
}

fn compose(blocks: &[(BlockLanguage, String)]) -> String {
    compose_blocks(blocks.iter().map(|(lang, content)| (lang, content.as_str())))
}

fn slice(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to - from).collect()
}

#[test]
fn test_parse_mixed_languages() {
    let text = "\n∞∞∞markdown\n# Notes\n∞∞∞math-a\n1 + 1\n∞∞∞text\n";
    let blocks = parse_blocks(text, &BlockDefaults::default());

    let languages: Vec<String> = blocks.iter().map(|b| b.language.token()).collect();
    assert_eq!(languages, vec!["markdown", "math-a", "text"]);
    assert_eq!(slice(text, blocks[0].content.from, blocks[0].content.to), "# Notes");
    assert!(blocks[2].content.is_empty());
}

#[test]
fn test_leading_text_becomes_its_own_block() {
    let text = "scratch\n∞∞∞rust\nfn main() {}";
    let blocks = parse_blocks(text, &BlockDefaults::new("markdown", true));

    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].has_implicit_delimiter());
    assert_eq!(blocks[0].language, BlockLanguage::auto_detected("markdown"));
    assert_eq!(slice(text, blocks[0].content.from, blocks[0].content.to), "scratch");
    assert_eq!(blocks[1].language, BlockLanguage::fixed("rust"));
}

#[test]
fn test_marker_without_line_breaks_is_content() {
    let text = "\n∞∞∞text\nprice ∞∞∞ tag\n∞∞∞ not a delimiter";
    let blocks = parse_blocks(text, &BlockDefaults::default());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].content.to, text.chars().count());
}

#[test]
fn test_block_lookup_prefers_earlier_block_on_boundary() {
    let index = BlockIndex::from_text("\n∞∞∞text\nhello\n∞∞∞text\nworld", &BlockDefaults::default());
    assert_eq!(index.index_at(14).unwrap(), 0);
    assert_eq!(index.index_at(15).unwrap(), 1);
    assert!(index.index_at(29).is_err());
}

proptest! {
    #[test]
    fn prop_blocks_cover_document_without_gaps(text in "(\n|∞|a|-| |x){0,40}") {
        let len = text.chars().count();
        let blocks = parse_blocks(&text, &BlockDefaults::default());

        prop_assert!(!blocks.is_empty());
        prop_assert_eq!(blocks[0].range.from, 0);
        prop_assert_eq!(blocks[blocks.len() - 1].range.to, len);
        for block in &blocks {
            prop_assert_eq!(block.range.from, block.delimiter.from);
            prop_assert_eq!(block.delimiter.to, block.content.from);
            prop_assert_eq!(block.content.to, block.range.to);
        }
        for pair in blocks.windows(2) {
            prop_assert_eq!(pair[0].range.to, pair[1].range.from);
        }
    }

    #[test]
    fn prop_compose_then_parse_preserves_blocks(input in arb_blocks(1)) {
        let text = compose(&input);
        let blocks = parse_blocks(&text, &BlockDefaults::default());

        prop_assert_eq!(blocks.len(), input.len());
        for (block, (language, content)) in blocks.iter().zip(&input) {
            prop_assert_eq!(&block.language, language);
            prop_assert_eq!(&slice(&text, block.content.from, block.content.to), content);
        }
    }

    #[test]
    fn prop_move_up_then_down_restores_document(
        input in arb_blocks(2),
        pick in any::<usize>(),
        offset in any::<usize>(),
    ) {
        let text = compose(&input);
        let mut editor = BlockEditor::new(&text, 80);

        let blocks = editor.blocks();
        let index = 1 + pick % (blocks.len() - 1);
        let content = blocks.get(index).unwrap().content;
        let cursor = content.from + offset % (content.len() + 1);
        editor.set_selection(SelectionSet::cursor(cursor)).unwrap();

        prop_assert!(editor.execute(BlockCommand::MoveCurrentBlockUp).unwrap());
        prop_assert_eq!(editor.blocks().len(), input.len());
        prop_assert!(editor.execute(BlockCommand::MoveCurrentBlockDown).unwrap());

        prop_assert_eq!(editor.text(), text);
        prop_assert_eq!(editor.selection(), &SelectionSet::cursor(cursor));
    }
}
