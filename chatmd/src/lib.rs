pub mod content;
pub mod extract;
pub mod lines;
pub mod message;
pub mod parser;
pub mod render;
pub mod session;
pub mod target;

pub use extract::{ExtractError, extract};
pub use message::{CodeBlockLocation, MessageBlock};
pub use parser::{ParseError, Parser, parse_message_blocks};

use crate::session::SessionConfig;

/// A parsed chat document.
#[derive(Debug, Clone)]
pub struct ChatDocument {
    /// Messages in document order, covering the document from the first
    /// speaker heading to the end without gaps.
    pub messages: Vec<MessageBlock>,
    pub session: Option<SessionConfig>,
    /// YAML front matter, when the document starts with one.
    pub front_matter: Option<serde_yaml::Value>,
    pub line_count: usize,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
    pub diagnostics: Vec<ParseError>,
}

impl ChatDocument {
    /// Look up a message and one of its code blocks.
    ///
    /// `None` when the message index is out of range; `Some((message, None))`
    /// when only the code block index is.
    pub fn message_and_code_block(
        &self,
        message_index: usize,
        code_block_index: usize,
    ) -> Option<(&MessageBlock, Option<&CodeBlockLocation>)> {
        let message = self.messages.get(message_index)?;
        Some((message, message.code_block(code_block_index)))
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(ParseError::is_error)
    }
}
