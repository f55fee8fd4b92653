use thiserror::Error;

/// Failure to build a [`CommandContext`](crate::CommandContext) from a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("message index {index} out of range (document has {len} messages)")]
    MessageOutOfRange { index: usize, len: usize },

    #[error(
        "code block index {index} out of range (message {message_index} has {len} code blocks)"
    )]
    CodeBlockOutOfRange {
        message_index: usize,
        index: usize,
        len: usize,
    },
}
