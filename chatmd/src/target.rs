//! Detect the file a code block declares on its first line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Path markers tried in order; the flag says whether the marker line is
/// itself part of the file.
static TARGET_PATTERNS: Lazy<Vec<(Regex, bool)>> = Lazy::new(|| {
    vec![
        // #!/usr/bin/env python3 tools/run.py
        (
            Regex::new(r"^\s*#!\s*(?:[\w/.-]+/env\s+\w+\s+)?([\w/.-]+\.[A-Za-z0-9]+)\s*").unwrap(),
            true,
        ),
        // # src/app.py
        (Regex::new(r"^\s*#\s*([\w/.-]+\.[A-Za-z0-9]+)\s*").unwrap(), false),
        // // src/main.rs
        (Regex::new(r"^\s*//\s*([\w/.-]+\.[A-Za-z0-9]+)\s*").unwrap(), false),
        // /* styles/app.css */
        (Regex::new(r"^\s*/\*\s*([\w/.-]+\.[A-Za-z0-9]+)\s*\*/").unwrap(), false),
        // ; alembic.ini
        (Regex::new(r"^\s*;+\s*([\w/.-]+\.ini)\s*").unwrap(), false),
    ]
});

/// Where a code block wants to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTarget {
    pub path: String,
    /// Shebang lines stay in the written file; path comments do not.
    pub keeps_first_line: bool,
}

impl CodeTarget {
    pub fn new(path: impl Into<String>, keeps_first_line: bool) -> Self {
        CodeTarget {
            path: path.into(),
            keeps_first_line,
        }
    }

    /// The code to write for this target.
    pub fn body(&self, code: &str) -> String {
        let lines: Vec<&str> = code.trim().split('\n').collect();
        if self.keeps_first_line {
            lines.join("\n")
        } else {
            lines[1..].join("\n")
        }
    }
}

/// Inspect the first line of `code` for a file path marker.
pub fn detect_target(code: &str) -> Option<CodeTarget> {
    let first_line = code.trim().split('\n').next()?.trim();
    TARGET_PATTERNS.iter().find_map(|(pattern, keeps_first_line)| {
        pattern
            .captures(first_line)
            .map(|caps| CodeTarget::new(caps[1].trim(), *keeps_first_line))
    })
}
