use std::ops::Range;

use chatmd::ChatDocument;
use chatmd::content::resolve_content;

use crate::error::ContextError;

/// What a command template is resolved against.
///
/// The shape decides which placeholders are recognized; see
/// [`resolve`](crate::resolve).
#[derive(Debug, Clone, PartialEq)]
pub enum CommandContext {
    Document {
        file_path: String,
    },
    CodeBlock {
        file_path: String,
        /// 1-based line of the opening fence.
        display_line: usize,
        language: Option<String>,
        message_index: usize,
        code_block_in_message_index: usize,
    },
    Message {
        file_path: String,
        message_index: usize,
        speaker_name: String,
        speaker_text: String,
        /// Resolved reply text; `None` is treated as empty.
        content_text: Option<String>,
        start_line: usize,
        end_line: usize,
        content_range: Option<Range<usize>>,
    },
}

impl CommandContext {
    pub fn document(file_path: impl Into<String>) -> Self {
        CommandContext::Document {
            file_path: file_path.into(),
        }
    }

    /// Context for code block `code_index` of message `message_index`.
    pub fn for_code_block(
        file_path: impl Into<String>,
        doc: &ChatDocument,
        message_index: usize,
        code_index: usize,
    ) -> Result<Self, ContextError> {
        let message = doc
            .messages
            .get(message_index)
            .ok_or(ContextError::MessageOutOfRange {
                index: message_index,
                len: doc.messages.len(),
            })?;
        let code_block = message
            .code_block(code_index)
            .ok_or(ContextError::CodeBlockOutOfRange {
                message_index,
                index: code_index,
                len: message.code_blocks.len(),
            })?;

        Ok(CommandContext::CodeBlock {
            file_path: file_path.into(),
            display_line: code_block.display_line,
            language: code_block.language.clone(),
            message_index,
            code_block_in_message_index: code_index,
        })
    }

    /// Context for message `message_index`, with its content resolved from `lines`.
    pub fn for_message<S: AsRef<str>>(
        file_path: impl Into<String>,
        doc: &ChatDocument,
        lines: &[S],
        message_index: usize,
    ) -> Result<Self, ContextError> {
        let message = doc
            .messages
            .get(message_index)
            .ok_or(ContextError::MessageOutOfRange {
                index: message_index,
                len: doc.messages.len(),
            })?;

        Ok(CommandContext::Message {
            file_path: file_path.into(),
            message_index,
            speaker_name: message.speaker_name.clone(),
            speaker_text: message.speaker_text.clone(),
            content_text: Some(resolve_content(lines, message.content_range.as_ref())),
            start_line: message.start_line,
            end_line: message.end_line,
            content_range: message.content_range.clone(),
        })
    }

    pub fn file_path(&self) -> &str {
        match self {
            CommandContext::Document { file_path }
            | CommandContext::CodeBlock { file_path, .. }
            | CommandContext::Message { file_path, .. } => file_path,
        }
    }
}
