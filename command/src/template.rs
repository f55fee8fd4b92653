//! `${name}` placeholder substitution for command templates.
//!
//! Placeholders are replaced in one pass over the template, so values are
//! never expanded again. A placeholder the active context does not know is
//! left in the output untouched.

use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::context::CommandContext;

/// Marker shown by [`preview`] in place of message content.
pub const REDACTED: &str = "<redacted>";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Execute,
    Preview,
}

/// Resolve every recognized placeholder in `template`.
///
/// | Placeholder | Context | Value |
/// |---|---|---|
/// | `file` | all | the path in double quotes |
/// | `lineNumber` | code block | 1-based fence line |
/// | `language` | code block | fence info string, or empty |
/// | `messageIndex` | code block, message | |
/// | `codeBlockInMessageIndex` | code block | |
/// | `messageSpeaker`, `messageSpeakerText` | message | JSON string |
/// | `messageContent` | message | JSON string |
/// | `messageContentBase64` | message | standard base64 of the UTF-8 content |
/// | `messageStartLine`, `messageEndLine` | message | |
/// | `messageContentStartLine`, `messageContentEndLine` | message | empty without a content range |
pub fn resolve(template: &str, context: &CommandContext) -> String {
    substitute(template, context, Mode::Execute)
}

/// Like [`resolve`], but message content placeholders become [`REDACTED`].
pub fn preview(template: &str, context: &CommandContext) -> String {
    substitute(template, context, Mode::Preview)
}

fn substitute(template: &str, context: &CommandContext, mode: Mode) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match placeholder_value(name, context, mode) {
                Some(value) => value,
                None => {
                    debug!(placeholder = name, "unresolved placeholder left as is");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn placeholder_value(name: &str, context: &CommandContext, mode: Mode) -> Option<String> {
    if name == "file" {
        return Some(format!("\"{}\"", context.file_path()));
    }

    match context {
        CommandContext::Document { .. } => None,

        CommandContext::CodeBlock {
            display_line,
            language,
            message_index,
            code_block_in_message_index,
            ..
        } => match name {
            "lineNumber" => Some(display_line.to_string()),
            "language" => Some(language.clone().unwrap_or_default()),
            "messageIndex" => Some(message_index.to_string()),
            "codeBlockInMessageIndex" => Some(code_block_in_message_index.to_string()),
            _ => None,
        },

        CommandContext::Message {
            message_index,
            speaker_name,
            speaker_text,
            content_text,
            start_line,
            end_line,
            content_range,
            ..
        } => {
            let content: &str = match content_range {
                Some(_) => content_text.as_deref().unwrap_or(""),
                None => "",
            };
            match name {
                "messageIndex" => Some(message_index.to_string()),
                "messageSpeaker" => Some(json_string(speaker_name)),
                "messageSpeakerText" => Some(json_string(speaker_text)),
                "messageContent" => Some(match mode {
                    Mode::Execute => json_string(content),
                    Mode::Preview => REDACTED.to_string(),
                }),
                "messageContentBase64" => Some(match mode {
                    Mode::Execute => general_purpose::STANDARD.encode(content.as_bytes()),
                    Mode::Preview => REDACTED.to_string(),
                }),
                "messageStartLine" => Some(start_line.to_string()),
                "messageEndLine" => Some(end_line.to_string()),
                "messageContentStartLine" => Some(
                    content_range
                        .as_ref()
                        .map(|r| r.start.to_string())
                        .unwrap_or_default(),
                ),
                "messageContentEndLine" => Some(
                    content_range
                        .as_ref()
                        .map(|r| r.end.to_string())
                        .unwrap_or_default(),
                ),
                _ => None,
            }
        }
    }
}

/// A double-quoted JSON string literal with quotes and control characters escaped.
fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
