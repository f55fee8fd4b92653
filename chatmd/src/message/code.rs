use std::ops::Range;

use serde::Serialize;

/// A fenced code block found inside a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlockLocation {
    /// The document the block belongs to (codespan file id).
    pub file_id: usize,
    /// 1-based line of the opening fence.
    pub display_line: usize,
    /// Trimmed fence info string; `None` when the fence is untagged.
    pub language: Option<String>,
    /// 0-based half-open line range of the whole fence.
    pub lines: Range<usize>,
    /// Fence body.
    pub code: String,
}

impl CodeBlockLocation {
    /// First word of the info string, e.g. `python` for ```` ```python title=x ````.
    pub fn language_name(&self) -> Option<&str> {
        self.language.as_deref().and_then(|l| l.split_whitespace().next())
    }
}
