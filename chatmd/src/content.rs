use std::ops::Range;

/// Text of a content range: the lines joined with `\n`, with only trailing
/// whitespace trimmed. An absent range resolves to the empty string.
pub fn resolve_content<S: AsRef<str>>(lines: &[S], range: Option<&Range<usize>>) -> String {
    let Some(range) = range else {
        return String::new();
    };
    let end = range.end.min(lines.len());
    let start = range.start.min(end);
    let joined = lines[start..end]
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");
    joined.trim_end().to_string()
}
