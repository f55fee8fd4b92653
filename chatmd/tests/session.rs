use chatmd::Parser;
use chatmd::parser::ParseIssue;

const SESSION: &str = r#"```json session-config
{"model": "gpt", "llm_context": {"messages": []}}
```

```python
client = make_client()
```

## system

> You are a helpful assistant.
"#;

#[test]
fn session_config_and_setup_code() {
    let doc = Parser::new(SESSION.to_string(), 0).parse();

    let session = doc.session.expect("session config");
    assert_eq!(session.config["model"], "gpt");
    assert_eq!(session.lines, 0..3);
    let setup = session.setup_code.expect("setup code");
    assert_eq!(setup.language.as_deref(), Some("python"));
    assert_eq!(setup.code, "client = make_client()");

    // The config sits before the first speaker and belongs to no message.
    assert_eq!(doc.messages.len(), 1);
    assert_eq!(doc.messages[0].speaker_line, 8);
    assert_eq!(doc.messages[0].content_range, Some(10..11));
    assert!(doc.diagnostics.is_empty());
}

#[test]
fn setup_code_is_optional() {
    let src = "```session-config\n{}\n```\n\nsome notes\n\n```python\nlater = 1\n```\n";
    let doc = Parser::new(src.to_string(), 0).parse();

    let session = doc.session.expect("session config");
    assert_eq!(session.setup_code, None);
}

#[test]
fn malformed_session_config_is_an_error() {
    let src = "```session-config\n{oops\n```\n\n## a\n\n> hi\n";
    let doc = Parser::new(src.to_string(), 7).parse();

    assert!(doc.session.is_none());
    assert!(doc.has_errors());
    let error = &doc.diagnostics[0];
    assert!(matches!(error.issue, ParseIssue::MalformedSessionConfig(_)));
    assert_eq!(error.file_id, 7);
    assert_eq!(error.to_diagnostic().labels.len(), 1);
    // Messages are still parsed.
    assert_eq!(doc.messages.len(), 1);
}

#[test]
fn only_the_first_session_config_counts() {
    let src = "```session-config\n{\"n\": 1}\n```\n\n```session-config\n{\"n\": 2}\n```\n\n## a\n\n> hi\n";
    let doc = Parser::new(src.to_string(), 0).parse();

    assert_eq!(doc.session.unwrap().config["n"], 1);
    assert!(
        doc.diagnostics
            .iter()
            .any(|d| d.issue == ParseIssue::DuplicateSessionConfig)
    );
}

#[test]
fn session_config_after_first_speaker_is_ignored() {
    let src = "## a\n\n> hi\n\n```session-config\n{}\n```\n";
    let doc = Parser::new(src.to_string(), 0).parse();

    assert!(doc.session.is_none());
}

#[test]
fn front_matter_is_decoded() {
    let src = "---\ntitle: Demo\ntags: [a, b]\n---\n\n## a\n\n> hi\n";
    let doc = Parser::new(src.to_string(), 0).parse();

    let front_matter = doc.front_matter.expect("front matter");
    assert_eq!(front_matter["title"].as_str(), Some("Demo"));
    assert_eq!(doc.messages[0].speaker_line, 5);
}

#[test]
fn malformed_front_matter_is_a_warning() {
    let src = "---\ntitle: [unclosed\n---\n\n## a\n\n> hi\n";
    let doc = Parser::new(src.to_string(), 0).parse();

    assert!(doc.front_matter.is_none());
    assert!(!doc.has_errors());
    assert!(
        doc.diagnostics
            .iter()
            .any(|d| matches!(d.issue, ParseIssue::MalformedFrontMatter(_)))
    );
}
