use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IcanError {
    #[error("empty address")]
    Empty,

    #[error("address too short: {0} characters")]
    TooShort(usize),

    #[error("invalid character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("network prefix must be two letters, got '{0}'")]
    InvalidCountry(String),

    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("invalid address body: {0}")]
    InvalidBban(String),

    #[error("checksum mismatch: remainder {0}")]
    ChecksumMismatch(u32),
}
