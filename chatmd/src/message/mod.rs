pub mod code;

use std::ops::Range;

use serde::Serialize;

use crate::content::resolve_content;

pub use code::CodeBlockLocation;

/// Heading text used when a speaker heading is blank.
pub const UNKNOWN_SPEAKER: &str = "Unknown Speaker";

/// One message of a chat document: the span from a speaker heading to the
/// next one (or the end of the document).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageBlock {
    /// Line of the delimiting `##` heading.
    pub speaker_line: usize,
    /// Trimmed heading text, or [`UNKNOWN_SPEAKER`].
    pub speaker_name: String,
    /// The literal heading line when it is an ATX `## name` line,
    /// otherwise `"## " + speaker_name`.
    pub speaker_text: String,
    pub start_line: usize,
    /// Exclusive.
    pub end_line: usize,
    /// Line span of the reply body. Never empty when present.
    pub content_range: Option<Range<usize>>,
    /// Fenced code blocks inside the reply's block quotes, in document order.
    pub code_blocks: Vec<CodeBlockLocation>,
    /// Decoded body of the message's `msg-metadata` fence.
    pub metadata: Option<serde_json::Value>,
}

impl MessageBlock {
    pub fn lines(&self) -> Range<usize> {
        self.start_line..self.end_line
    }

    /// The reply body: the content lines joined with `\n`, trailing whitespace trimmed.
    pub fn content_text<S: AsRef<str>>(&self, lines: &[S]) -> String {
        resolve_content(lines, self.content_range.as_ref())
    }

    pub fn code_block(&self, index: usize) -> Option<&CodeBlockLocation> {
        self.code_blocks.get(index)
    }
}
