mod grammar;

use std::fmt;
use std::ops::Range;

use regex::Regex;

/// What a token refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Address,
    BlockNumber,
    BlockHash,
}

impl TokenKind {
    /// Precedence when two grammars match overlapping spans. Higher wins.
    fn priority(self) -> u8 {
        match self {
            TokenKind::Address => 2,
            TokenKind::BlockHash => 1,
            TokenKind::BlockNumber => 0,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Address => write!(f, "address"),
            TokenKind::BlockNumber => write!(f, "block number"),
            TokenKind::BlockHash => write!(f, "block hash"),
        }
    }
}

/// A `[...@cb]` token found in a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Network code as written. For addresses this is the payload's own
    /// two-letter prefix; for blocks it is the optional `net:` prefix.
    pub network: Option<String>,
    /// The captured payload, case preserved.
    pub payload: String,
    /// The token carried the `!` marker.
    pub skip_validation: bool,
    /// Byte span of the whole token, brackets included.
    pub span: Range<usize>,
}

/// Find all tokens in `text`, ordered by start offset and non-overlapping.
///
/// Each grammar is matched independently. Where spans collide the
/// higher-priority kind is kept (address, then hash, then number).
pub fn extract(text: &str) -> Vec<Token> {
    let mut candidates = Vec::new();
    collect(&grammar::ADDRESS, text, TokenKind::Address, &mut candidates);
    collect(&grammar::BLOCK_HASH, text, TokenKind::BlockHash, &mut candidates);
    collect(&grammar::BLOCK_NUMBER, text, TokenKind::BlockNumber, &mut candidates);

    // Stable sort keeps start order within a kind.
    candidates.sort_by(|a, b| {
        b.kind
            .priority()
            .cmp(&a.kind.priority())
            .then(a.span.start.cmp(&b.span.start))
    });

    let mut accepted: Vec<Token> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let overlaps = accepted
            .iter()
            .any(|t| candidate.span.start < t.span.end && t.span.start < candidate.span.end);
        if !overlaps {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|t| t.span.start);
    accepted
}

fn collect(regex: &Regex, text: &str, kind: TokenKind, out: &mut Vec<Token>) {
    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let token = match kind {
            TokenKind::Address => {
                let Some(payload) = caps.get(2) else {
                    continue;
                };
                Token {
                    kind,
                    network: caps.get(3).map(|m| m.as_str().to_string()),
                    payload: payload.as_str().to_string(),
                    skip_validation: caps.get(1).is_some(),
                    span: whole.range(),
                }
            }
            TokenKind::BlockNumber | TokenKind::BlockHash => {
                let Some(payload) = caps.get(3) else {
                    continue;
                };
                Token {
                    kind,
                    network: caps.get(2).map(|m| m.as_str().to_string()),
                    payload: payload.as_str().to_string(),
                    skip_validation: false,
                    span: whole.range(),
                }
            }
        };
        out.push(token);
    }
}
