use crate::message::MessageBlock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("message index {index} out of range (document has {len} messages)")]
    InvalidIndex { index: usize, len: usize },
}

/// Cut a document at a message boundary.
///
/// Keeps every line before the target message, or through the end of the
/// target message when `include_target` is set. The result has trailing
/// whitespace trimmed and ends with exactly one newline; the inputs are left
/// untouched.
pub fn extract<S: AsRef<str>>(
    lines: &[S],
    messages: &[MessageBlock],
    target: usize,
    include_target: bool,
) -> Result<String, ExtractError> {
    let message = messages.get(target).ok_or(ExtractError::InvalidIndex {
        index: target,
        len: messages.len(),
    })?;

    let cut = if include_target {
        messages
            .get(target + 1)
            .map_or(lines.len(), |next| next.speaker_line)
    } else {
        message.speaker_line
    };
    let cut = cut.min(lines.len());

    let kept = lines[..cut]
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");

    let mut out = kept.trim_end().to_string();
    out.push('\n');
    Ok(out)
}
