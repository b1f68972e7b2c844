pub mod checksum;
pub mod error;
pub mod format;

pub use checksum::{check_digits, is_valid, validate};
pub use error::IcanError;
pub use format::{electronic_format, print_format};

/// Network prefixes accepted in strict mode.
pub const KNOWN_NETWORKS: &[&str] = &["cb", "ab", "ce"];

/// Hex digits in a Core Blockchain address body.
pub const BBAN_LENGTH: usize = 40;
