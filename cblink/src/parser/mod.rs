pub(crate) mod structural;

use crate::config::Config;
use crate::diagnostic::TokenDiagnostic;
use crate::document::Document;
use crate::lint::lint;
use crate::validator::Validator;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the source Markdown into a document tree.
    pub fn parse(&self) -> Document {
        structural::parse_document(&self.source)
    }

    /// Find addresses that annotation would mark invalid, with source spans.
    pub fn lint(&self, config: &Config, validator: &dyn Validator) -> Vec<TokenDiagnostic> {
        lint(&self.source, self.file_id, config, validator)
    }
}
