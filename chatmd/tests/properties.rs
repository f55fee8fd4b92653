//! Structural properties of parsed chat documents, checked over generated sessions.

use chatmd::lines::split_lines;
use chatmd::{ChatDocument, Parser, extract};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Body {
    Quote(Vec<String>),
    Paragraph(String),
    MetadataOnly,
    MetadataAndQuote(Vec<String>),
    QuotedCode(String),
    /// A quoted paragraph followed by a tight list.
    QuotedList(Vec<String>),
    Empty,
}

fn text_line() -> impl Strategy<Value = String> {
    "[a-z][a-z ]{0,12}"
}

fn body() -> impl Strategy<Value = Body> {
    prop_oneof![
        prop::collection::vec(text_line(), 1..4).prop_map(Body::Quote),
        text_line().prop_map(Body::Paragraph),
        Just(Body::MetadataOnly),
        prop::collection::vec(text_line(), 1..3).prop_map(Body::MetadataAndQuote),
        "[a-z]{1,6}".prop_map(Body::QuotedCode),
        prop::collection::vec(text_line(), 1..4).prop_map(Body::QuotedList),
        Just(Body::Empty),
    ]
}

fn session() -> impl Strategy<Value = (bool, Vec<(String, Body)>)> {
    (any::<bool>(), prop::collection::vec(("[a-z]{1,8}", body()), 1..6))
}

/// Render a session; also returns the line of every speaker heading.
fn render(preamble: bool, messages: &[(String, Body)]) -> (String, Vec<usize>) {
    let mut lines: Vec<String> = Vec::new();
    if preamble {
        lines.push("# Notes".to_string());
        lines.push(String::new());
    }
    let mut speaker_lines = Vec::new();

    for (speaker, body) in messages {
        speaker_lines.push(lines.len());
        lines.push(format!("## {}", speaker));
        lines.push(String::new());
        match body {
            Body::Quote(quote) => lines.extend(quote.iter().map(|l| format!("> {}", l))),
            Body::Paragraph(text) => lines.push(text.clone()),
            Body::MetadataOnly => {
                lines.extend(["```json msg-metadata", "{}", "```"].map(String::from));
            }
            Body::MetadataAndQuote(quote) => {
                lines.extend(["```json msg-metadata", "{\"n\": 1}", "```", ""].map(String::from));
                lines.extend(quote.iter().map(|l| format!("> {}", l)));
            }
            Body::QuotedCode(code) => {
                lines.extend(["> ```sh".to_string(), format!("> {}", code), "> ```".to_string()]);
            }
            Body::QuotedList(items) => {
                lines.extend(["> intro".to_string(), ">".to_string()]);
                lines.extend(items.iter().map(|l| format!("> - {}", l)));
            }
            Body::Empty => {}
        }
        lines.push(String::new());
    }

    (lines.join("\n"), speaker_lines)
}

fn parse(source: &str) -> ChatDocument {
    Parser::new(source.to_string(), 0).parse()
}

proptest! {
    #[test]
    fn messages_partition_the_document((preamble, messages) in session()) {
        let (source, speaker_lines) = render(preamble, &messages);
        let doc = parse(&source);

        prop_assert_eq!(doc.messages.len(), messages.len());
        prop_assert_eq!(doc.messages[0].start_line, speaker_lines[0]);
        for pair in doc.messages.windows(2) {
            prop_assert_eq!(pair[0].end_line, pair[1].start_line);
            prop_assert!(pair[0].speaker_line < pair[1].speaker_line);
        }
        prop_assert_eq!(doc.messages.last().unwrap().end_line, doc.line_count);
        prop_assert_eq!(doc.line_count, split_lines(&source).len());
    }

    #[test]
    fn content_ranges_are_never_empty((preamble, messages) in session()) {
        let (source, _) = render(preamble, &messages);
        let doc = parse(&source);
        let lines = split_lines(&source);

        for (message, (_, body)) in doc.messages.iter().zip(&messages) {
            if let Some(range) = &message.content_range {
                prop_assert!(range.end > range.start);
                prop_assert!(range.start > message.start_line && range.end <= message.end_line);
            }
            if let Body::QuotedList(items) = body {
                let last = format!("> - {}", items[items.len() - 1]);
                prop_assert!(message.content_text(&lines).ends_with(last.trim_end()));
            }
            match body {
                Body::MetadataOnly | Body::Empty => prop_assert!(message.content_range.is_none()),
                _ => prop_assert!(message.content_range.is_some()),
            }
            for pair in message.code_blocks.windows(2) {
                prop_assert!(pair[0].lines.end <= pair[1].lines.start);
            }
        }
    }

    #[test]
    fn reparse_is_identical((preamble, messages) in session()) {
        let (source, _) = render(preamble, &messages);
        prop_assert_eq!(parse(&source).messages, parse(&source).messages);
    }

    #[test]
    fn extraction_keeps_a_prefix((preamble, messages) in session(), pick in any::<prop::sample::Index>()) {
        let (source, _) = render(preamble, &messages);
        let doc = parse(&source);
        let lines = split_lines(&source);
        let k = pick.index(doc.messages.len());

        let extracted = extract(&lines, &doc.messages, k, true).unwrap();
        prop_assert!(extracted.ends_with('\n'));
        let reparsed = parse(&extracted);

        prop_assert_eq!(reparsed.messages.len(), k + 1);
        prop_assert_eq!(&reparsed.messages[..k], &doc.messages[..k]);
        let (last, original) = (&reparsed.messages[k], &doc.messages[k]);
        prop_assert_eq!(last.speaker_line, original.speaker_line);
        prop_assert_eq!(&last.speaker_name, &original.speaker_name);
        prop_assert_eq!(&last.content_range, &original.content_range);
        prop_assert_eq!(&last.code_blocks, &original.code_blocks);
        prop_assert_eq!(&last.metadata, &original.metadata);
    }
}
