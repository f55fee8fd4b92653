use chatmd::Parser;
use chatmd::lines::split_lines;
use chatmd::render::{NewMessage, render_message};
use serde_json::json;

#[test]
fn rendered_message_layout() {
    let rendered = render_message("assistant", "hello\nworld", &json!({ "k": 1 }));

    assert_eq!(
        rendered,
        "\n\n## assistant\n\n```json msg-metadata\n{\n  \"k\": 1\n}\n```\n\n> hello\n> world\n"
    );
}

#[test]
fn appended_message_parses_back() {
    let mut source = String::from("## user\n\n> hi\n");
    let metadata = json!({ "source": "assistant", "type": "AssistantMessage" });
    source.push_str(&NewMessage::new("assistant", "hello\n\nworld", metadata.clone()).to_string());

    let doc = Parser::new(source.clone(), 0).parse();
    let lines = split_lines(&source);

    assert_eq!(doc.messages.len(), 2);
    let appended = &doc.messages[1];
    assert_eq!(appended.speaker_name, "assistant");
    assert_eq!(appended.metadata, Some(metadata));
    assert_eq!(appended.content_text(&lines), "> hello\n> \n> world");
    assert_eq!(doc.messages[0].content_text(&lines), "> hi");
}

#[test]
fn empty_content_renders_no_quote() {
    let rendered = render_message("user", "", &json!({}));
    assert!(rendered.ends_with("```\n\n\n"));

    let doc = Parser::new(format!("## a\n\n> x\n{}", rendered), 0).parse();
    assert_eq!(doc.messages[1].content_range, None);
}
