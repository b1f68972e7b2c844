use crate::token::TokenKind;

const ELLIPSIS: char = '…';

/// Block numbers up to this many digits are shown in full.
const MAX_FULL_BLOCK_DIGITS: usize = 9;

/// Payload in display case: addresses upper-cased, hashes with a lower-case
/// `0x` and upper-case digits, block numbers as written.
pub fn case_transform(kind: TokenKind, payload: &str) -> String {
    match kind {
        TokenKind::Address => payload.to_ascii_uppercase(),
        TokenKind::BlockHash if payload.len() > 2 => {
            let (prefix, digits) = payload.split_at(2);
            format!(
                "{}{}",
                prefix.to_ascii_lowercase(),
                digits.to_ascii_uppercase()
            )
        }
        TokenKind::BlockHash => payload.to_ascii_uppercase(),
        TokenKind::BlockNumber => payload.to_string(),
    }
}

/// Case-transformed and middle-truncated payload.
pub fn shorten(kind: TokenKind, payload: &str) -> String {
    let transformed = case_transform(kind, payload);
    match kind {
        TokenKind::Address => truncate_middle(&transformed, 4, 4),
        TokenKind::BlockNumber if transformed.len() > MAX_FULL_BLOCK_DIGITS => {
            truncate_middle(&transformed, 4, 4)
        }
        TokenKind::BlockNumber => transformed,
        TokenKind::BlockHash => truncate_middle(&transformed, 6, 4),
    }
}

/// Keep `head` leading and `tail` trailing characters around an ellipsis.
/// Strings too short to shorten are returned unchanged.
pub fn truncate_middle(value: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= head + tail {
        return value.to_string();
    }
    let mut out: String = chars[..head].iter().collect();
    out.push(ELLIPSIS);
    out.extend(&chars[chars.len() - tail..]);
    out
}
