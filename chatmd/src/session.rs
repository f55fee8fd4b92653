use std::ops::Range;

use serde::Serialize;

/// A plain code block (language and body).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
}

/// Session configuration declared before the first speaker heading.
///
/// The `session-config` fence holds a JSON object; a fence directly after it
/// carries the session's setup code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    pub config: serde_json::Value,
    /// Line range of the `session-config` fence.
    pub lines: Range<usize>,
    pub setup_code: Option<CodeBlock>,
}
