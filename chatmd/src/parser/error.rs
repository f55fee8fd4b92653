use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// Problems noticed while parsing. None of them stop the parse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseIssue {
    #[error("malformed msg-metadata JSON for speaker '{speaker}': {reason}")]
    MalformedMetadata { speaker: String, reason: String },
    #[error("malformed session-config JSON: {0}")]
    MalformedSessionConfig(String),
    #[error("malformed front matter: {0}")]
    MalformedFrontMatter(String),
    #[error("additional session-config block ignored")]
    DuplicateSessionConfig,
    #[error("no reply content found for speaker '{0}'")]
    MissingContent(String),
}

/// A parse issue with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub issue: ParseIssue,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn error(issue: ParseIssue, span: Range<usize>, file_id: usize) -> Self {
        Self::new(issue, span, file_id, Severity::Error)
    }

    pub fn warning(issue: ParseIssue, span: Range<usize>, file_id: usize) -> Self {
        Self::new(issue, span, file_id, Severity::Warning)
    }

    pub fn note(issue: ParseIssue, span: Range<usize>, file_id: usize) -> Self {
        Self::new(issue, span, file_id, Severity::Note)
    }

    fn new(issue: ParseIssue, span: Range<usize>, file_id: usize, severity: Severity) -> Self {
        ParseError {
            issue,
            span,
            file_id,
            severity,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Bug)
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(self.issue.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}
