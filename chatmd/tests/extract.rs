use chatmd::lines::split_lines;
use chatmd::{ExtractError, Parser, extract};

const TWO_MESSAGES: &str = "## A\n\n> first\n> reply\n\n## B\n\n> second";

#[test]
fn extract_before_and_through_a_message() {
    let lines = split_lines(TWO_MESSAGES);
    let doc = Parser::new(TWO_MESSAGES.to_string(), 0).parse();
    assert_eq!(lines.len(), 8);
    assert_eq!(doc.messages[0].speaker_line, 0);
    assert_eq!(doc.messages[1].speaker_line, 5);

    let before = extract(&lines, &doc.messages, 1, false).unwrap();
    assert_eq!(before, "## A\n\n> first\n> reply\n");

    let through = extract(&lines, &doc.messages, 1, true).unwrap();
    assert_eq!(through, "## A\n\n> first\n> reply\n\n## B\n\n> second\n");

    let through_first = extract(&lines, &doc.messages, 0, true).unwrap();
    assert_eq!(through_first, before);
}

#[test]
fn out_of_range_index_is_rejected() {
    let lines = split_lines(TWO_MESSAGES);
    let doc = Parser::new(TWO_MESSAGES.to_string(), 0).parse();

    assert_eq!(
        extract(&lines, &doc.messages, 2, false),
        Err(ExtractError::InvalidIndex { index: 2, len: 2 })
    );
}

#[test]
fn empty_prefix_is_a_single_newline() {
    let lines = split_lines(TWO_MESSAGES);
    let doc = Parser::new(TWO_MESSAGES.to_string(), 0).parse();

    assert_eq!(extract(&lines, &doc.messages, 0, false).unwrap(), "\n");
}

#[test]
fn preamble_is_kept() {
    let src = "# Session\n\nnotes\n\n## A\n\n> hi\n";
    let lines = split_lines(src);
    let doc = Parser::new(src.to_string(), 0).parse();

    assert_eq!(
        extract(&lines, &doc.messages, 0, false).unwrap(),
        "# Session\n\nnotes\n"
    );
}

#[test]
fn inputs_are_not_modified() {
    let owned: Vec<String> = split_lines(TWO_MESSAGES).into_iter().map(String::from).collect();
    let snapshot = owned.clone();
    let doc = Parser::new(TWO_MESSAGES.to_string(), 0).parse();
    let messages = doc.messages.clone();

    let _ = extract(&owned, &doc.messages, 1, true).unwrap();

    assert_eq!(owned, snapshot);
    assert_eq!(doc.messages, messages);
}

#[test]
fn cut_line_is_clamped_to_the_document() {
    let src = "## A\n\n> hi\n\n## B\n";
    let doc = Parser::new(src.to_string(), 0).parse();
    assert_eq!(doc.messages[1].speaker_line, 4);
    // Fewer lines than the parse saw: the cut must not run past them.
    let short = ["## A", "", "> hi"];

    assert_eq!(extract(&short, &doc.messages, 0, true).unwrap(), "## A\n\n> hi\n");
}
