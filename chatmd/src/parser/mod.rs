pub mod error;
mod messages;
mod session;
pub mod tokens;

pub use error::{ParseError, ParseIssue};
pub use messages::{MESSAGE_METADATA_LANG, SPEAKER_HEADING_LEVEL, has_fence_tag};
pub use session::SESSION_CONFIG_LANG;

use tracing::debug;

use crate::ChatDocument;
use crate::lines::split_lines;
use crate::message::MessageBlock;
use crate::parser::tokens::{Token, tokenize};

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the source Markdown into a complete ChatDocument.
    /// Problems are reported as diagnostics; parsing itself never fails.
    pub fn parse(&self) -> ChatDocument {
        let tokens = tokenize(&self.source);
        let lines = split_lines(&self.source);

        let (front_matter, front_matter_error) = session::parse_front_matter(&tokens, self.file_id);
        let (session, mut diagnostics) = session::parse_session(&tokens, self.file_id);
        let (messages, message_diagnostics) = messages::scan_messages(&tokens, &lines, self.file_id);

        diagnostics.extend(front_matter_error);
        diagnostics.extend(message_diagnostics);
        diagnostics.sort_by_key(|d| d.span.start);

        debug!(
            messages = messages.len(),
            lines = lines.len(),
            diagnostics = diagnostics.len(),
            "parsed chat document"
        );

        ChatDocument {
            messages,
            session,
            front_matter,
            line_count: lines.len(),
            source_id: self.file_id,
            diagnostics,
        }
    }
}

/// Split a token stream into message blocks.
///
/// Pure and total: the same tokens and source always give the same blocks,
/// and malformed structure only degrades the result.
pub fn parse_message_blocks(tokens: &[Token], source: &str, file_id: usize) -> Vec<MessageBlock> {
    let lines = split_lines(source);
    messages::scan_messages(tokens, &lines, file_id).0
}
