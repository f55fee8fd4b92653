use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

use crate::lines::is_blank;
use crate::message::{CodeBlockLocation, MessageBlock, UNKNOWN_SPEAKER};
use crate::parser::error::{ParseError, ParseIssue};
use crate::parser::tokens::{Token, TokenKind};

/// Heading level that delimits messages.
pub const SPEAKER_HEADING_LEVEL: u8 = 2;

/// Fence tag marking per-message metadata.
pub const MESSAGE_METADATA_LANG: &str = "msg-metadata";

/// An ATX level-2 heading line with a non-blank title.
static SPEAKER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^##[ \t]+\S").unwrap());

/// True when any word of a fence info string equals `tag`, ignoring ASCII case.
pub fn has_fence_tag(info: &str, tag: &str) -> bool {
    info.split_whitespace().any(|word| word.eq_ignore_ascii_case(tag))
}

/// Scan the token stream into message blocks, collecting non-fatal issues.
pub(crate) fn scan_messages(
    tokens: &[Token],
    lines: &[&str],
    file_id: usize,
) -> (Vec<MessageBlock>, Vec<ParseError>) {
    let mut state = ScanState::new(lines, file_id);
    state.process_tokens(tokens);
    state.finalize()
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

struct ScanState<'a> {
    lines: &'a [&'a str],
    file_id: usize,
    /// The message being built; `None` before the first speaker heading.
    current: Option<MessageBuilder>,
    messages: Vec<MessageBlock>,
    diagnostics: Vec<ParseError>,
}

struct MessageBuilder {
    speaker_line: usize,
    speaker_name: String,
    speaker_text: String,
    heading_span: Range<usize>,
    quote_depth: usize,
    content_start: Option<usize>,
    content_end: Option<usize>,
    seen_paragraph: bool,
    code_blocks: Vec<CodeBlockLocation>,
    metadata: Option<serde_json::Value>,
    metadata_seen: bool,
}

impl MessageBuilder {
    fn new(speaker_line: usize, heading_text: &str, raw_line: &str, heading_span: Range<usize>) -> Self {
        let speaker_name = match heading_text.trim() {
            "" => UNKNOWN_SPEAKER.to_string(),
            name => name.to_string(),
        };
        let speaker_text = if SPEAKER_LINE.is_match(raw_line) {
            raw_line.to_string()
        } else {
            format!("## {}", speaker_name)
        };

        MessageBuilder {
            speaker_line,
            speaker_name,
            speaker_text,
            heading_span,
            quote_depth: 0,
            content_start: None,
            content_end: None,
            seen_paragraph: false,
            code_blocks: Vec::new(),
            metadata: None,
            metadata_seen: false,
        }
    }

    fn extend_content_end(&mut self, end: usize) {
        self.content_end = Some(self.content_end.map_or(end, |current| current.max(end)));
    }

    fn into_message(self, end_line: usize, lines: &[&str]) -> MessageBlock {
        let content_range = self
            .content_start
            .and_then(|start| {
                // An open range runs to the end of the message.
                let end = self.content_end.unwrap_or(end_line).min(end_line);
                normalize_content_range(start..end, lines)
            });

        MessageBlock {
            speaker_line: self.speaker_line,
            speaker_name: self.speaker_name,
            speaker_text: self.speaker_text,
            start_line: self.speaker_line,
            end_line,
            content_range,
            code_blocks: self.code_blocks,
            metadata: self.metadata,
        }
    }
}

impl<'a> ScanState<'a> {
    fn new(lines: &'a [&'a str], file_id: usize) -> Self {
        ScanState {
            lines,
            file_id,
            current: None,
            messages: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn process_tokens(&mut self, tokens: &[Token]) {
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];

            match &token.kind {
                TokenKind::HeadingOpen { level, .. }
                    if *level == SPEAKER_HEADING_LEVEL && token.level == 0 =>
                {
                    let Some(line) = token.start_line() else {
                        i += 1;
                        continue;
                    };
                    i += 1;

                    // Heading content: the inline text, then the close token.
                    let mut heading_text = "";
                    if let Some(Token {
                        kind: TokenKind::Inline(text),
                        ..
                    }) = tokens.get(i)
                    {
                        heading_text = text;
                        i += 1;
                    }
                    if matches!(tokens.get(i).map(|t| &t.kind), Some(TokenKind::HeadingClose)) {
                        i += 1;
                    }

                    self.start_message(line, heading_text, token.span.clone());
                    continue;
                }

                TokenKind::Fence { info, content } if has_fence_tag(info, MESSAGE_METADATA_LANG) => {
                    self.metadata_fence(token, content);
                }

                TokenKind::BlockquoteOpen => {
                    if let Some(builder) = self.current.as_mut() {
                        builder.quote_depth += 1;
                        if builder.quote_depth == 1 && builder.content_start.is_none() {
                            builder.content_start = token.start_line();
                        }
                    }
                }

                TokenKind::BlockquoteClose => {
                    if let Some(builder) = self.current.as_mut() {
                        builder.quote_depth = builder.quote_depth.saturating_sub(1);
                        if builder.quote_depth == 0
                            && builder.content_start.is_some()
                            && builder.content_end.is_none()
                        {
                            builder.content_end = token.start_line();
                        }
                    }
                }

                TokenKind::Fence { info, content } => {
                    self.quoted_fence(token, info, content);
                }

                TokenKind::ParagraphOpen => {
                    self.paragraph(token);
                }

                _ => {}
            }

            i += 1;
        }
    }

    fn start_message(&mut self, line: usize, heading_text: &str, heading_span: Range<usize>) {
        self.close_message(line);
        let raw_line = self.lines.get(line).copied().unwrap_or("");
        let builder = MessageBuilder::new(line, heading_text, raw_line, heading_span);
        trace!(line, speaker = %builder.speaker_name, "speaker heading");
        self.current = Some(builder);
    }

    fn metadata_fence(&mut self, token: &Token, content: &str) {
        let Some(builder) = self.current.as_mut() else {
            return;
        };

        // The metadata fence never belongs to the visible reply.
        if builder.content_start.is_none() {
            builder.content_start = token.end_line();
        }

        if builder.metadata_seen {
            return;
        }
        builder.metadata_seen = true;

        match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value) => builder.metadata = Some(value),
            Err(e) => {
                warn!(speaker = %builder.speaker_name, error = %e, "malformed message metadata");
                self.diagnostics.push(
                    ParseError::warning(
                        ParseIssue::MalformedMetadata {
                            speaker: builder.speaker_name.clone(),
                            reason: e.to_string(),
                        },
                        token.span.clone(),
                        self.file_id,
                    )
                    .with_note("the message is kept without metadata"),
                );
            }
        }
    }

    /// Fences count as code blocks only inside the reply's block quote.
    fn quoted_fence(&mut self, token: &Token, info: &str, content: &str) {
        let Some(builder) = self.current.as_mut() else {
            return;
        };
        if builder.quote_depth == 0 {
            return;
        }
        let Some(lines) = token.lines.clone() else {
            return;
        };

        let language = match info.trim() {
            "" => None,
            lang => Some(lang.to_string()),
        };
        builder.code_blocks.push(CodeBlockLocation {
            file_id: self.file_id,
            display_line: lines.start + 1,
            language,
            lines: lines.clone(),
            code: content.to_string(),
        });
        if builder.content_start.is_some() {
            builder.extend_content_end(lines.end);
        }
    }

    fn paragraph(&mut self, token: &Token) {
        let Some(builder) = self.current.as_mut() else {
            return;
        };
        let Some(lines) = token.lines.clone() else {
            return;
        };
        let first_paragraph = !builder.seen_paragraph;
        builder.seen_paragraph = true;

        if builder.quote_depth > 0 {
            if builder.content_start.is_none() {
                builder.content_start = Some(lines.start);
            }
            builder.extend_content_end(lines.end);
            return;
        }

        // A bare paragraph may stand in for the quoted reply.
        let first_line_blank = self.lines.get(lines.start).is_none_or(|l| is_blank(l));
        if builder.content_start.is_none()
            && first_paragraph
            && lines.start > builder.speaker_line
            && builder.code_blocks.is_empty()
            && !first_line_blank
        {
            builder.content_start = Some(lines.start);
            builder.content_end = Some(lines.end);
        }
    }

    fn close_message(&mut self, end_line: usize) {
        let Some(builder) = self.current.take() else {
            return;
        };
        let heading_span = builder.heading_span.clone();
        let message = builder.into_message(end_line, self.lines);

        if message.content_range.is_none() && message.code_blocks.is_empty() {
            self.diagnostics.push(
                ParseError::note(
                    ParseIssue::MissingContent(message.speaker_name.clone()),
                    heading_span,
                    self.file_id,
                )
                .with_note("expected a block quote or a paragraph after the heading"),
            );
        }

        self.messages.push(message);
    }

    fn finalize(mut self) -> (Vec<MessageBlock>, Vec<ParseError>) {
        let total = self.lines.len();
        self.close_message(total);
        (self.messages, self.diagnostics)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Shrink a content range past blank lines at either end; an empty result is absent.
///
/// This trims more than collapsing `end <= start` ranges would: the blank line
/// after a metadata fence is never the first content line, and a message whose
/// only body is that fence has no content at all.
fn normalize_content_range(range: Range<usize>, lines: &[&str]) -> Option<Range<usize>> {
    let mut start = range.start;
    let mut end = range.end.min(lines.len());
    while start < end && is_blank(lines[start]) {
        start += 1;
    }
    while end > start && is_blank(lines[end - 1]) {
        end -= 1;
    }
    (end > start).then_some(start..end)
}
