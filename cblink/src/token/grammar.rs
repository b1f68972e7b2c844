use std::sync::LazyLock;

use regex::Regex;

/// `[` `!`? network, two check digits, 40 hex digits `@cb]`.
/// Group 1: skip marker. Group 2: full address payload. Group 3: network code.
pub(crate) static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(!)?((cb|ab|ce)[0-9]{2}[0-9a-f]{40})@cb\]").expect("address grammar")
});

/// `[` optional `net:` decimal digits `@cb]`.
/// Group 2: network code. Group 3: block number.
pub(crate) static BLOCK_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[((cb|ab|ce):)?([0-9]+)@cb\]").expect("block number grammar")
});

/// `[` optional `net:` `0x` and 64 hex digits `@cb]`.
/// Group 2: network code. Group 3: block hash including `0x`.
pub(crate) static BLOCK_HASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[((cb|ab|ce):)?(0x[0-9a-f]{64})@cb\]").expect("block hash grammar")
});
