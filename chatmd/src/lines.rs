use std::ops::Range;

/// Split text into lines on `\n`, `\r\n` and `\r`.
///
/// A trailing terminator starts a final empty line, so `"a\nb\n"` yields
/// `["a", "b", ""]` and the result always holds at least one line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let starts = line_starts(text);
    let mut lines = Vec::with_capacity(starts.len());
    for (n, &start) in starts.iter().enumerate() {
        let end = match starts.get(n + 1) {
            Some(&next) => terminator_start(text, next),
            None => text.len(),
        };
        lines.push(&text[start..end]);
    }
    lines
}

/// Maps byte offsets of a source text to 0-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        LineIndex {
            starts: line_starts(text),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Line containing the byte at `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    /// Half-open line range touched by a byte span.
    /// An empty span maps to the empty range at its line.
    pub fn lines_of(&self, span: &Range<usize>) -> Range<usize> {
        let start = self.line_of(span.start);
        if span.end <= span.start {
            return start..start;
        }
        let end = self.line_of(span.end - 1) + 1;
        start..end.max(start)
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                i += 1;
                starts.push(i);
            }
            b'\r' => {
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                starts.push(i);
            }
            _ => i += 1,
        }
    }
    starts
}

/// Byte offset where the terminator ending the line before `next_start` begins.
fn terminator_start(text: &str, next_start: usize) -> usize {
    let bytes = text.as_bytes();
    if next_start >= 2 && &bytes[next_start - 2..next_start] == b"\r\n" {
        next_start - 2
    } else {
        next_start - 1
    }
}

/// True when the line holds only whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
