use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};
use serde::Serialize;

use crate::lines::LineIndex;

/// A flat structural token derived from the Markdown event stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Number of enclosing container blocks (block quotes, lists, list items).
    pub level: usize,
    /// 0-based half-open line range, when the token maps to source lines.
    pub lines: Option<Range<usize>>,
    /// Byte span in source, used for diagnostics.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    HeadingOpen {
        level: u8,
        /// `#` run for ATX headings, underline character for setext ones.
        marker: String,
    },
    HeadingClose,
    Inline(String),
    ParagraphOpen,
    ParagraphClose,
    BlockquoteOpen,
    /// Carries the empty line range at the quote's exclusive end line.
    BlockquoteClose,
    Fence {
        info: String,
        content: String,
    },
    FrontMatter(String),
}

impl Token {
    fn new(kind: TokenKind, level: usize, lines: Option<Range<usize>>, span: Range<usize>) -> Self {
        Token {
            kind,
            level,
            lines,
            span,
        }
    }

    pub fn start_line(&self) -> Option<usize> {
        self.lines.as_ref().map(|r| r.start)
    }

    pub fn end_line(&self) -> Option<usize> {
        self.lines.as_ref().map(|r| r.end)
    }
}

/// Tokenize Markdown source into the flat token sequence the message parser consumes.
pub fn tokenize(source: &str) -> Vec<Token> {
    let options = Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
    let events: Vec<(Event<'_>, Range<usize>)> =
        CmarkParser::new_ext(source, options).into_offset_iter().collect();
    let index = LineIndex::new(source);

    let mut tokens = Vec::new();
    let mut level = 0usize;
    let mut open_quotes: Vec<Range<usize>> = Vec::new();
    let mut i = 0;

    while i < events.len() {
        let (ref ev, ref range) = events[i];

        match ev {
            Event::Start(Tag::Heading { level: heading, .. }) => {
                let lines = index.lines_of(range);
                tokens.push(Token::new(
                    TokenKind::HeadingOpen {
                        level: heading_level_to_u8(heading),
                        marker: heading_marker(source, range),
                    },
                    level,
                    Some(lines.clone()),
                    range.clone(),
                ));
                i += 1;
                let text = collect_text_until(&events, &mut i, |e| matches!(e, TagEnd::Heading(_)));
                tokens.push(Token::new(
                    TokenKind::Inline(text),
                    level,
                    Some(lines),
                    range.clone(),
                ));
                tokens.push(Token::new(TokenKind::HeadingClose, level, None, range.end..range.end));
            }

            Event::Start(Tag::Paragraph) => {
                let lines = index.lines_of(range);
                tokens.push(Token::new(
                    TokenKind::ParagraphOpen,
                    level,
                    Some(lines.clone()),
                    range.clone(),
                ));
                i += 1;
                let text = collect_text_until(&events, &mut i, |e| matches!(e, TagEnd::Paragraph));
                tokens.push(Token::new(
                    TokenKind::Inline(text),
                    level,
                    Some(lines),
                    range.clone(),
                ));
                tokens.push(Token::new(TokenKind::ParagraphClose, level, None, range.end..range.end));
            }

            Event::Start(Tag::BlockQuote(_)) => {
                tokens.push(Token::new(
                    TokenKind::BlockquoteOpen,
                    level,
                    Some(index.lines_of(range)),
                    range.clone(),
                ));
                open_quotes.push(range.clone());
                level += 1;
                i += 1;
            }

            Event::End(TagEnd::BlockQuote(_)) => {
                level = level.saturating_sub(1);
                let quote = open_quotes.pop().unwrap_or_else(|| range.clone());
                let end = index.lines_of(&quote).end;
                tokens.push(Token::new(
                    TokenKind::BlockquoteClose,
                    level,
                    Some(end..end),
                    quote.end..quote.end,
                ));
                i += 1;
            }

            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let info = info.to_string();
                let lines = index.lines_of(range);
                let span = range.clone();
                i += 1;
                let content = collect_text_until(&events, &mut i, |e| matches!(e, TagEnd::CodeBlock));
                tokens.push(Token::new(
                    TokenKind::Fence { info, content },
                    level,
                    Some(lines),
                    span,
                ));
            }

            Event::Start(Tag::MetadataBlock(_)) => {
                let lines = index.lines_of(range);
                let span = range.clone();
                i += 1;
                let text = collect_text_until(&events, &mut i, |e| matches!(e, TagEnd::MetadataBlock(_)));
                tokens.push(Token::new(TokenKind::FrontMatter(text), level, Some(lines), span));
            }

            // Items of a tight list hold their text without a paragraph.
            Event::Start(Tag::Item) => {
                level += 1;
                i += 1;
                if let Some((text, span)) = collect_tight_item_text(&events, &mut i) {
                    let lines = index.lines_of(&span);
                    tokens.push(Token::new(
                        TokenKind::ParagraphOpen,
                        level,
                        Some(lines.clone()),
                        span.clone(),
                    ));
                    tokens.push(Token::new(TokenKind::Inline(text), level, Some(lines), span.clone()));
                    tokens.push(Token::new(TokenKind::ParagraphClose, level, None, span.end..span.end));
                }
            }

            // Containers only shift the nesting level.
            Event::Start(Tag::List(_) | Tag::FootnoteDefinition(_)) => {
                level += 1;
                i += 1;
            }
            Event::End(TagEnd::List(_) | TagEnd::Item | TagEnd::FootnoteDefinition) => {
                level = level.saturating_sub(1);
                i += 1;
            }

            _ => {
                i += 1;
            }
        }
    }

    tokens
}

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_marker(source: &str, span: &Range<usize>) -> String {
    let text = source.get(span.clone()).unwrap_or("").trim_start();
    if text.starts_with('#') {
        return text.chars().take_while(|c| *c == '#').collect();
    }
    // Setext: the marker is the underline character on the last line.
    text.trim_end()
        .lines()
        .last()
        .and_then(|line| line.trim().chars().next())
        .map(String::from)
        .unwrap_or_default()
}

/// Collect text content until a matching End tag, consuming it.
fn collect_text_until(
    events: &[(Event<'_>, Range<usize>)],
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> String {
    let mut text = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(s) | Event::Code(s) => {
                text.push_str(s);
                *i += 1;
            }
            Event::SoftBreak | Event::HardBreak => {
                text.push('\n');
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    text
}

fn is_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Text(_)
        | Event::Code(_)
        | Event::SoftBreak
        | Event::HardBreak
        | Event::InlineHtml(_)
        | Event::InlineMath(_)
        | Event::FootnoteReference(_)
        | Event::TaskListMarker(_) => true,
        Event::Start(tag) => matches!(
            tag,
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
        ),
        Event::End(tag) => matches!(
            tag,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
        ),
        _ => false,
    }
}

/// Collect the run of inline events that opens a list item, with its byte span.
/// `None` when the item starts with a block (a loose item's paragraph, a nested list).
fn collect_tight_item_text(
    events: &[(Event<'_>, Range<usize>)],
    i: &mut usize,
) -> Option<(String, Range<usize>)> {
    let mut text = String::new();
    let mut span: Option<Range<usize>> = None;
    while *i < events.len() {
        let (ref ev, ref range) = events[*i];
        if !is_inline(ev) {
            break;
        }
        match ev {
            Event::Text(s) | Event::Code(s) => text.push_str(s),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            _ => {}
        }
        span = Some(match span {
            Some(current) => current.start.min(range.start)..current.end.max(range.end),
            None => range.clone(),
        });
        *i += 1;
    }
    span.map(|span| (text, span))
}
