use crate::document::{Definition, InlineNode};
use crate::link::{LinkDecision, LinkTarget};
use crate::token::Token;

/// Build the nodes that replace `token` in its text.
pub fn synthesize(token: &Token, decision: &LinkDecision) -> Vec<InlineNode> {
    if !decision.validated {
        return vec![InlineNode::Strikethrough(vec![InlineNode::text(
            decision.label(),
        )])];
    }

    match &decision.target {
        LinkTarget::Direct(url) => vec![InlineNode::Link {
            dest: url.clone(),
            title: decision.title.clone(),
            content: vec![InlineNode::text(decision.label())],
        }],
        LinkTarget::Deferred(identifier) => {
            let label = decision.label();
            vec![InlineNode::Reference {
                label: format!("[{}]", label),
                definition: Definition {
                    identifier: identifier.clone(),
                    label,
                    url: identifier.clone(),
                },
            }]
        }
        // Checking disabled for this kind: the payload goes back as written.
        LinkTarget::NoLink => vec![InlineNode::text(token.payload.clone())],
    }
}
