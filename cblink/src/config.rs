use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::TokenKind;

/// Placeholder substituted with the token payload in URL path templates.
pub const PAYLOAD_PLACEHOLDER: &str = "{id}";

/// Annotation settings. Built once per run and shared by every stage.
///
/// Every field is optional in TOML; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Verify address checksums.
    pub enable_validation: bool,
    /// Honor the `!` marker that exempts an address from verification.
    pub enable_skip_marker: bool,
    /// Link primary and test network tokens straight to an explorer.
    /// When off, every token becomes a reference-style link.
    pub link_networks: bool,
    pub explorer_url: String,
    pub explorer_testnet_url: String,
    pub url_path_address: String,
    pub url_path_block_number: String,
    pub url_path_block_hash: String,
    pub check_address: bool,
    pub check_block_number: bool,
    pub check_block_hash: bool,
    /// Dump synthesized nodes through `tracing` at debug level.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enable_validation: true,
            enable_skip_marker: true,
            link_networks: true,
            explorer_url: "https://blockindex.net/".to_string(),
            explorer_testnet_url: "https://xab.blockindex.net/".to_string(),
            url_path_address: "address/{id}".to_string(),
            url_path_block_number: "block/{id}".to_string(),
            url_path_block_hash: "block/{id}".to_string(),
            check_address: true,
            check_block_number: true,
            check_block_hash: true,
            debug: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("'{field}' is not an absolute URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("'{field}' must contain the {{id}} placeholder: {value}")]
    MissingPlaceholder { field: &'static str, value: String },
}

impl Config {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Whether tokens of `kind` are turned into links at all.
    pub fn checks(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Address => self.check_address,
            TokenKind::BlockNumber => self.check_block_number,
            TokenKind::BlockHash => self.check_block_hash,
        }
    }

    /// URL path template for `kind`.
    pub fn url_path(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Address => &self.url_path_address,
            TokenKind::BlockNumber => &self.url_path_block_number,
            TokenKind::BlockHash => &self.url_path_block_hash,
        }
    }

    /// Check explorer URLs and path templates.
    ///
    /// Annotation never calls this: a hand-built config with a bad URL
    /// produces bad links, not errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("explorer_url", &self.explorer_url),
            ("explorer_testnet_url", &self.explorer_testnet_url),
        ] {
            let is_absolute = url::Url::parse(value)
                .map(|u| !u.cannot_be_a_base())
                .unwrap_or(false);
            if !is_absolute {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }
        for (field, value) in [
            ("url_path_address", &self.url_path_address),
            ("url_path_block_number", &self.url_path_block_number),
            ("url_path_block_hash", &self.url_path_block_hash),
        ] {
            if !value.contains(PAYLOAD_PLACEHOLDER) {
                return Err(ConfigError::MissingPlaceholder {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}
