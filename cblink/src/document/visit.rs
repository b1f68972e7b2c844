use crate::document::{Document, DocumentNode, InlineNode};

/// Walk every `InlineNode::Text` in the document, depth-first in document order.
///
/// The visitor receives the index of the text node and the parent list that
/// holds it, and may replace that node with any number of nodes. It returns
/// how many nodes now occupy the slot; traversal resumes after them, so
/// replacement nodes are never revisited. Returning `1` leaves the walk
/// unchanged. Returning `0` removes the node.
///
/// Links, images, references, inline HTML and code are not descended into.
pub fn visit_text<F>(document: &mut Document, visitor: &mut F)
where
    F: FnMut(usize, &mut Vec<InlineNode>) -> usize,
{
    for node in &mut document.nodes {
        visit_block(node, visitor);
    }
}

fn visit_block<F>(node: &mut DocumentNode, visitor: &mut F)
where
    F: FnMut(usize, &mut Vec<InlineNode>) -> usize,
{
    match node {
        DocumentNode::Paragraph(inlines) | DocumentNode::Heading { content: inlines, .. } => {
            visit_inlines(inlines, visitor);
        }
        DocumentNode::Blockquote(inner) => visit_text(inner, visitor),
        DocumentNode::Table { headers, rows, .. } => {
            for cell in headers.iter_mut() {
                visit_inlines(cell, visitor);
            }
            for row in rows.iter_mut() {
                for cell in row.iter_mut() {
                    visit_inlines(cell, visitor);
                }
            }
        }
        DocumentNode::OrderedList { items, .. } | DocumentNode::UnorderedList { items, .. } => {
            for item in items.iter_mut() {
                visit_text(item, visitor);
            }
        }
        DocumentNode::CodeBlock { .. } | DocumentNode::Html(_) | DocumentNode::HorizontalRule => {}
    }
}

fn visit_inlines<F>(inlines: &mut Vec<InlineNode>, visitor: &mut F)
where
    F: FnMut(usize, &mut Vec<InlineNode>) -> usize,
{
    let mut i = 0;
    while i < inlines.len() {
        if matches!(inlines[i], InlineNode::Text(_)) {
            i += visitor(i, inlines);
            continue;
        }
        if let InlineNode::Strong(children)
        | InlineNode::Emphasis(children)
        | InlineNode::Strikethrough(children) = &mut inlines[i]
        {
            visit_inlines(children, visitor);
        }
        i += 1;
    }
}
