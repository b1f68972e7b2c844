use crate::error::IcanError;
use crate::format::electronic_format;
use crate::{BBAN_LENGTH, KNOWN_NETWORKS};

/// Shortest structurally possible address: prefix, check digits, one body character.
const MIN_LENGTH: usize = 5;

/// Whether `address` is a well-formed ICAN with a correct checksum.
pub fn is_valid(address: &str, strict: bool) -> bool {
    validate(address, strict).is_ok()
}

/// Check structure and the ISO 7064 mod 97-10 checksum of `address`.
///
/// Whitespace is ignored and case does not matter. In strict mode the
/// network prefix must be a known Core network and the body must be
/// exactly 40 hex digits.
pub fn validate(address: &str, strict: bool) -> Result<(), IcanError> {
    let address = electronic_format(address);
    if address.is_empty() {
        return Err(IcanError::Empty);
    }
    if let Some((position, character)) = address
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
    {
        return Err(IcanError::InvalidCharacter {
            character,
            position,
        });
    }
    if address.len() < MIN_LENGTH {
        return Err(IcanError::TooShort(address.len()));
    }

    let (country, rest) = address.split_at(2);
    if !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(IcanError::InvalidCountry(country.to_string()));
    }
    let (digits, bban) = rest.split_at(2);
    if let Some((offset, character)) = digits.chars().enumerate().find(|(_, c)| !c.is_ascii_digit()) {
        return Err(IcanError::InvalidCharacter {
            character,
            position: 2 + offset,
        });
    }

    if strict {
        let network = country.to_ascii_lowercase();
        if !KNOWN_NETWORKS.contains(&network.as_str()) {
            return Err(IcanError::UnknownNetwork(network));
        }
        if bban.len() != BBAN_LENGTH || !bban.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IcanError::InvalidBban(format!(
                "expected {} hex digits, got '{}'",
                BBAN_LENGTH, bban
            )));
        }
    }

    let rotated = format!("{}{}{}", bban, country, digits);
    match mod97(&rotated) {
        1 => Ok(()),
        remainder => Err(IcanError::ChecksumMismatch(remainder)),
    }
}

/// Compute the two check digits for `network` and `bban`.
///
/// Non-alphanumeric characters are ignored.
pub fn check_digits(network: &str, bban: &str) -> String {
    let rotated = format!("{}{}00", electronic_format(bban), electronic_format(network));
    format!("{:02}", 98 - mod97(&rotated))
}

/// Remainder of the base-36 expansion of `value` modulo 97, where digits
/// stand for themselves and letters expand to 10..=35.
fn mod97(value: &str) -> u32 {
    value.chars().fold(0u32, |remainder, c| match c.to_digit(36) {
        Some(d) if d < 10 => (remainder * 10 + d) % 97,
        Some(d) => (remainder * 100 + d) % 97,
        None => remainder,
    })
}
