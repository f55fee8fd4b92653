use std::fmt;

use crate::parser::MESSAGE_METADATA_LANG;

/// A message to append to a chat document.
///
/// Its `Display` output is the Markdown that, appended to a document, parses
/// back into one more message with the same speaker, metadata and content.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub speaker: String,
    pub content: String,
    pub metadata: serde_json::Value,
}

impl NewMessage {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>, metadata: serde_json::Value) -> Self {
        NewMessage {
            speaker: speaker.into(),
            content: content.into(),
            metadata,
        }
    }
}

impl fmt::Display for NewMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "## {}", self.speaker)?;
        writeln!(f)?;
        writeln!(f, "```json {}", MESSAGE_METADATA_LANG)?;
        let metadata = serde_json::to_string_pretty(&self.metadata).map_err(|_| fmt::Error)?;
        writeln!(f, "{}", metadata)?;
        writeln!(f, "```")?;
        writeln!(f)?;
        let quoted: Vec<String> = self.content.lines().map(|line| format!("> {}", line)).collect();
        writeln!(f, "{}", quoted.join("\n"))
    }
}

/// Render a message in the document's append format.
pub fn render_message(speaker: &str, content: &str, metadata: &serde_json::Value) -> String {
    NewMessage::new(speaker, content, metadata.clone()).to_string()
}
