pub mod display;
pub mod slug;

use crate::config::{Config, PAYLOAD_PLACEHOLDER};
use crate::network::Network;
use crate::token::{Token, TokenKind};
use crate::validator::Validator;

pub use slug::slug;

/// Suffix carried over from the token onto every visible label.
pub const TOKEN_SUFFIX: &str = "@cb";

/// Where a token should point once rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Hyperlink to a block explorer.
    Direct(String),
    /// Reference-style link; the identifier doubles as its URL.
    Deferred(String),
    NoLink,
}

/// The outcome of deciding how a single token is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDecision {
    /// Truncated display form without the `@cb` suffix. Prefixed with the
    /// upper-case network code unless it links into the primary explorer.
    pub display: String,
    /// Untruncated display form, used as the link title.
    pub title: String,
    /// False when the address failed checksum verification.
    pub validated: bool,
    pub target: LinkTarget,
}

impl LinkDecision {
    /// The user-visible text: display form plus `@cb`.
    pub fn label(&self) -> String {
        format!("{}{}", self.display, TOKEN_SUFFIX)
    }
}

/// Decide how `token` on `network` is rendered under `config`.
///
/// The validator is consulted for addresses only, and only when checking is
/// enabled and the token is not exempted by an honored `!` marker.
pub fn decide(
    token: &Token,
    network: &Network,
    config: &Config,
    validator: &dyn Validator,
) -> LinkDecision {
    let short = display::shorten(token.kind, &token.payload);
    let full = display::case_transform(token.kind, &token.payload);
    let mut decision = LinkDecision {
        display: short.clone(),
        title: full.clone(),
        validated: true,
        target: LinkTarget::NoLink,
    };

    if !config.checks(token.kind) {
        return decision;
    }

    let exempt = config.enable_skip_marker && token.skip_validation;
    if token.kind == TokenKind::Address
        && config.enable_validation
        && !exempt
        && !validator.validate(&token.payload, true)
    {
        // Invalid tokens keep the bare display form.
        decision.validated = false;
        return decision;
    }

    let deferred = || LinkTarget::Deferred(slug(&format!("{}-{}", network.code(), short)));
    decision.target = if !config.link_networks {
        deferred()
    } else {
        match network {
            Network::Primary => LinkTarget::Direct(explorer_url(
                &config.explorer_url,
                config.url_path(token.kind),
                &token.payload,
            )),
            Network::Test => LinkTarget::Direct(explorer_url(
                &config.explorer_testnet_url,
                config.url_path(token.kind),
                &token.payload,
            )),
            Network::Enterprise | Network::Other(_) => deferred(),
        }
    };

    // Only direct links into the primary explorer go unprefixed.
    let primary_link = network.is_primary() && matches!(decision.target, LinkTarget::Direct(_));
    if !primary_link {
        let prefix = network.code().to_ascii_uppercase();
        decision.display = format!("{}:{}", prefix, short);
        decision.title = format!("{}:{}", prefix, full);
    }
    decision
}

/// Join an explorer base URL and a path template, substituting the payload
/// as written.
///
/// Neither part is validated here; see `Config::validate`.
pub fn explorer_url(base: &str, template: &str, payload: &str) -> String {
    let path = template.replace(PAYLOAD_PLACEHOLDER, payload);
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
