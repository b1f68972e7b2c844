use crate::config::Config;
use crate::document::visit::visit_text;
use crate::document::{Document, InlineNode};
use crate::link;
use crate::network::Network;
use crate::synth::synthesize;
use crate::token;
use crate::validator::Validator;

/// Annotate every text node of `document` in place.
///
/// Text nodes without tokens are left as they are.
pub fn annotate(document: &mut Document, config: &Config, validator: &dyn Validator) {
    visit_text(document, &mut |index, parent: &mut Vec<InlineNode>| {
        let InlineNode::Text(value) = &parent[index] else {
            return 1;
        };
        match rewrite_text(value, config, validator) {
            Some(replacement) => {
                let count = replacement.len();
                parent.splice(index..=index, replacement);
                count
            }
            None => 1,
        }
    });
}

/// Rewrite one text value into plain text interleaved with synthesized nodes.
///
/// Returns `None` when the text holds no tokens.
pub fn rewrite_text(
    text: &str,
    config: &Config,
    validator: &dyn Validator,
) -> Option<Vec<InlineNode>> {
    let tokens = token::extract(text);
    tracing::trace!(matches = tokens.len(), len = text.len(), "scanned text node");
    if tokens.is_empty() {
        return None;
    }

    let mut nodes = Vec::with_capacity(tokens.len() * 2 + 1);
    let mut cursor = 0;
    for token in &tokens {
        if token.span.start > cursor {
            nodes.push(InlineNode::text(&text[cursor..token.span.start]));
        }

        let network = Network::resolve(token.network.as_deref());
        let decision = link::decide(token, &network, config, validator);
        let synthesized = synthesize(token, &decision);
        if config.debug {
            tracing::debug!(
                kind = %token.kind,
                network = %network,
                payload = %token.payload,
                nodes = ?synthesized,
                "synthesized token"
            );
        }
        nodes.extend(synthesized);
        cursor = token.span.end;
    }
    if cursor < text.len() {
        nodes.push(InlineNode::text(&text[cursor..]));
    }
    Some(nodes)
}
