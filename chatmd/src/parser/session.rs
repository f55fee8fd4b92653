use tracing::warn;

use crate::parser::error::{ParseError, ParseIssue};
use crate::parser::messages::{SPEAKER_HEADING_LEVEL, has_fence_tag};
use crate::parser::tokens::{Token, TokenKind};
use crate::session::{CodeBlock, SessionConfig};

/// Fence tag marking the session configuration.
pub const SESSION_CONFIG_LANG: &str = "session-config";

/// Decode the YAML front matter block, if the document starts with one.
pub(crate) fn parse_front_matter(
    tokens: &[Token],
    file_id: usize,
) -> (Option<serde_yaml::Value>, Option<ParseError>) {
    let Some(token) = tokens.first() else {
        return (None, None);
    };
    let TokenKind::FrontMatter(text) = &token.kind else {
        return (None, None);
    };

    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(value) => (Some(value), None),
        Err(e) => {
            warn!(error = %e, "malformed front matter");
            let error = ParseError::warning(
                ParseIssue::MalformedFrontMatter(e.to_string()),
                token.span.clone(),
                file_id,
            );
            (None, Some(error))
        }
    }
}

/// Find the session configuration among the tokens before the first speaker heading.
pub(crate) fn parse_session(tokens: &[Token], file_id: usize) -> (Option<SessionConfig>, Vec<ParseError>) {
    let mut session = None;
    let mut found = false;
    let mut diagnostics = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        match &token.kind {
            TokenKind::HeadingOpen { level, .. } if *level == SPEAKER_HEADING_LEVEL && token.level == 0 => {
                break;
            }

            TokenKind::Fence { info, content } if has_fence_tag(info, SESSION_CONFIG_LANG) => {
                if found {
                    diagnostics.push(ParseError::warning(
                        ParseIssue::DuplicateSessionConfig,
                        token.span.clone(),
                        file_id,
                    ));
                    i += 1;
                    continue;
                }
                found = true;

                // A fence right after the config carries the setup code.
                let setup_code = match tokens.get(i + 1) {
                    Some(Token {
                        kind: TokenKind::Fence { info, content },
                        level: 0,
                        ..
                    }) if !has_fence_tag(info, SESSION_CONFIG_LANG) => {
                        i += 1;
                        Some(CodeBlock {
                            language: match info.trim() {
                                "" => None,
                                lang => Some(lang.to_string()),
                            },
                            code: content.trim_matches('\n').to_string(),
                        })
                    }
                    _ => None,
                };

                match serde_json::from_str::<serde_json::Value>(content) {
                    Ok(config) => {
                        session = Some(SessionConfig {
                            config,
                            lines: token.lines.clone().unwrap_or(0..0),
                            setup_code,
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed session config");
                        diagnostics.push(
                            ParseError::error(
                                ParseIssue::MalformedSessionConfig(e.to_string()),
                                token.span.clone(),
                                file_id,
                            )
                            .with_note("the document is parsed without a session configuration"),
                        );
                    }
                }
            }

            _ => {}
        }

        i += 1;
    }

    (session, diagnostics)
}
