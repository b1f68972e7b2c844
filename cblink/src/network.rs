use std::fmt;

/// The network a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Network {
    /// `cb`, the main chain. Also the default when no code is given.
    Primary,
    /// `ab`, the test chain.
    Test,
    /// `ce`, the enterprise chain. It has no public explorer.
    Enterprise,
    /// Any other code, lower-cased.
    Other(String),
}

impl Network {
    /// Map a raw network code to a network, case-insensitively.
    pub fn resolve(code: Option<&str>) -> Network {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Network::Primary;
        };
        match code.to_ascii_lowercase().as_str() {
            "cb" => Network::Primary,
            "ab" => Network::Test,
            "ce" => Network::Enterprise,
            other => Network::Other(other.to_string()),
        }
    }

    /// The lower-case network code.
    pub fn code(&self) -> &str {
        match self {
            Network::Primary => "cb",
            Network::Test => "ab",
            Network::Enterprise => "ce",
            Network::Other(code) => code,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Network::Primary)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
