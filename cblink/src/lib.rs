pub mod config;
pub mod diagnostic;
pub mod document;
pub mod link;
pub mod lint;
pub mod network;
pub mod parser;
pub mod rewrite;
pub mod synth;
pub mod token;
pub mod validator;

pub use config::{Config, ConfigError};
pub use diagnostic::TokenDiagnostic;
pub use document::{Definition, Document, DocumentNode, InlineNode};
pub use network::Network;
pub use rewrite::{annotate, rewrite_text};
pub use token::{Token, TokenKind};
pub use validator::{AcceptAll, Validator};

/// Parse `source`, annotate it, and render it back to Markdown.
pub fn annotate_markdown(source: &str, config: &Config, validator: &dyn Validator) -> String {
    let mut document = parser::structural::parse_document(source);
    annotate(&mut document, config, validator);
    document.to_string()
}
