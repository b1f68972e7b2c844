use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::document::{ColumnAlignment, Document, DocumentNode, InlineNode};

type Events<'a> = [(Event<'a>, Range<usize>)];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Markdown extensions understood by the parser and the linter.
pub(crate) fn options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES
}

/// Parse Markdown source text into a document tree.
pub fn parse_document(source: &str) -> Document {
    let parser = CmarkParser::new_ext(source, options());
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut i = 0;
    let nodes = collect_blocks(&events, &mut i, &|_| false);
    Document { nodes }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Collect block nodes until a matching End tag (consumed) or end of input.
fn collect_blocks(
    events: &Events<'_>,
    i: &mut usize,
    is_end: &dyn Fn(&TagEnd) -> bool,
) -> Vec<DocumentNode> {
    let mut nodes = Vec::new();

    while *i < events.len() {
        match &events[*i].0 {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            _ => {
                if let Some(node) = collect_block(events, i) {
                    nodes.push(node);
                }
            }
        }
    }

    nodes
}

/// Whether `event` opens a block-level construct.
fn starts_block(event: &Event<'_>) -> bool {
    matches!(
        event,
        Event::Start(
            Tag::Paragraph
                | Tag::Heading { .. }
                | Tag::BlockQuote(_)
                | Tag::CodeBlock(_)
                | Tag::List(_)
                | Tag::Table(_)
                | Tag::HtmlBlock
        ) | Event::Rule
    )
}

/// Consume one block starting at `events[*i]`.
/// Anything that is not a block is skipped and yields `None`.
fn collect_block(events: &Events<'_>, i: &mut usize) -> Option<DocumentNode> {
    let (ev, _) = &events[*i];
    *i += 1;

    match ev {
        Event::Start(Tag::Paragraph) => {
            let inlines = collect_inlines(events, i, &|e| matches!(e, TagEnd::Paragraph));
            Some(DocumentNode::Paragraph(inlines))
        }

        Event::Start(Tag::Heading { level, .. }) => {
            let level = heading_level_to_u8(level);
            let content = collect_inlines(events, i, &|e| matches!(e, TagEnd::Heading(_)));
            Some(DocumentNode::Heading { level, content })
        }

        Event::Start(Tag::CodeBlock(kind)) => {
            let language = match kind {
                pulldown_cmark::CodeBlockKind::Fenced(lang) => {
                    let lang = lang.to_string();
                    if lang.is_empty() { None } else { Some(lang) }
                }
                pulldown_cmark::CodeBlockKind::Indented => None,
            };
            let content = collect_text_until(events, i, |e| matches!(e, TagEnd::CodeBlock));
            Some(DocumentNode::CodeBlock { language, content })
        }

        Event::Start(Tag::HtmlBlock) => {
            let content = collect_text_until(events, i, |e| matches!(e, TagEnd::HtmlBlock));
            Some(DocumentNode::Html(content))
        }

        Event::Start(Tag::BlockQuote(_)) => {
            let nodes = collect_blocks(events, i, &|e| matches!(e, TagEnd::BlockQuote(_)));
            Some(DocumentNode::Blockquote(Document { nodes }))
        }

        Event::Start(Tag::List(start)) => {
            let (items, tight) = collect_list_items(events, i);
            Some(match start {
                Some(start) => DocumentNode::OrderedList {
                    start: *start,
                    tight,
                    items,
                },
                None => DocumentNode::UnorderedList { tight, items },
            })
        }

        Event::Start(Tag::Table(alignments)) => {
            let alignments: Vec<ColumnAlignment> = alignments
                .iter()
                .map(|a| match a {
                    pulldown_cmark::Alignment::None => ColumnAlignment::None,
                    pulldown_cmark::Alignment::Left => ColumnAlignment::Left,
                    pulldown_cmark::Alignment::Center => ColumnAlignment::Center,
                    pulldown_cmark::Alignment::Right => ColumnAlignment::Right,
                })
                .collect();
            let (headers, rows) = collect_table(events, i);
            Some(DocumentNode::Table {
                alignments,
                headers,
                rows,
            })
        }

        Event::Rule => Some(DocumentNode::HorizontalRule),

        _ => None,
    }
}

/// Collect list items until the list's End tag, and whether the list is tight.
///
/// Tight list items carry their inline content without a surrounding
/// paragraph; that content is wrapped in one here. A list is tight when
/// no item opens a paragraph of its own.
fn collect_list_items(events: &Events<'_>, i: &mut usize) -> (Vec<Document>, bool) {
    let mut items = Vec::new();
    let mut tight = true;

    while *i < events.len() {
        match &events[*i].0 {
            Event::End(TagEnd::List(_)) => {
                *i += 1;
                break;
            }
            Event::Start(Tag::Item) => {
                *i += 1;
                let (item, has_paragraph) = collect_item(events, i);
                tight &= !has_paragraph;
                items.push(item);
            }
            _ => {
                *i += 1;
            }
        }
    }

    (items, tight)
}

fn collect_item(events: &Events<'_>, i: &mut usize) -> (Document, bool) {
    let mut nodes = Vec::new();
    let mut loose: Vec<InlineNode> = Vec::new();
    let mut has_paragraph = false;

    while *i < events.len() {
        let ev = &events[*i].0;
        if matches!(ev, Event::End(TagEnd::Item)) {
            *i += 1;
            break;
        }
        if starts_block(ev) {
            has_paragraph |= matches!(ev, Event::Start(Tag::Paragraph));
            if !loose.is_empty() {
                nodes.push(DocumentNode::Paragraph(std::mem::take(&mut loose)));
            }
            if let Some(node) = collect_block(events, i) {
                nodes.push(node);
            }
        } else {
            collect_inline(events, i, &mut loose);
        }
    }

    if !loose.is_empty() {
        nodes.push(DocumentNode::Paragraph(loose));
    }
    (Document { nodes }, has_paragraph)
}

/// Collect table headers and rows.
fn collect_table(
    events: &Events<'_>,
    i: &mut usize,
) -> (Vec<Vec<InlineNode>>, Vec<Vec<Vec<InlineNode>>>) {
    let mut headers: Vec<Vec<InlineNode>> = Vec::new();
    let mut rows: Vec<Vec<Vec<InlineNode>>> = Vec::new();
    let mut in_head = false;
    let mut current_row: Vec<Vec<InlineNode>> = Vec::new();

    while *i < events.len() {
        match &events[*i].0 {
            Event::End(TagEnd::Table) => {
                *i += 1;
                break;
            }
            Event::Start(Tag::TableHead) => {
                in_head = true;
                *i += 1;
            }
            Event::End(TagEnd::TableHead) => {
                in_head = false;
                headers = std::mem::take(&mut current_row);
                *i += 1;
            }
            Event::Start(Tag::TableRow) => {
                current_row = Vec::new();
                *i += 1;
            }
            Event::End(TagEnd::TableRow) => {
                if !in_head {
                    rows.push(std::mem::take(&mut current_row));
                }
                *i += 1;
            }
            Event::Start(Tag::TableCell) => {
                *i += 1;
                let cell = collect_inlines(events, i, &|e| matches!(e, TagEnd::TableCell));
                current_row.push(cell);
            }
            _ => {
                *i += 1;
            }
        }
    }

    (headers, rows)
}

// ---------------------------------------------------------------------------
// Inlines
// ---------------------------------------------------------------------------

/// Collect inline nodes until a matching End tag.
fn collect_inlines(
    events: &Events<'_>,
    i: &mut usize,
    is_end: &dyn Fn(&TagEnd) -> bool,
) -> Vec<InlineNode> {
    let mut inlines = Vec::new();

    while *i < events.len() {
        match &events[*i].0 {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            _ => collect_inline(events, i, &mut inlines),
        }
    }

    inlines
}

/// Consume one inline construct starting at `events[*i]` into `out`.
fn collect_inline(events: &Events<'_>, i: &mut usize, out: &mut Vec<InlineNode>) {
    let (ev, _) = &events[*i];
    *i += 1;

    match ev {
        // pulldown-cmark splits text around brackets; tokens need it whole.
        Event::Text(s) => push_text(out, s),
        Event::InlineHtml(s) => out.push(InlineNode::Html(s.to_string())),
        Event::Code(s) => out.push(InlineNode::CodeSpan(s.to_string())),
        Event::SoftBreak => out.push(InlineNode::SoftBreak),
        Event::HardBreak => out.push(InlineNode::HardBreak),
        Event::Start(Tag::Strong) => {
            let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Strong));
            out.push(InlineNode::Strong(children));
        }
        Event::Start(Tag::Emphasis) => {
            let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Emphasis));
            out.push(InlineNode::Emphasis(children));
        }
        Event::Start(Tag::Strikethrough) => {
            let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Strikethrough));
            out.push(InlineNode::Strikethrough(children));
        }
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => {
            let dest = dest_url.to_string();
            let title = title.to_string();
            let content = collect_inlines(events, i, &|e| matches!(e, TagEnd::Link));
            out.push(InlineNode::Link {
                dest,
                title,
                content,
            });
        }
        Event::Start(Tag::Image {
            dest_url, title, ..
        }) => {
            let dest = dest_url.to_string();
            let title = title.to_string();
            let alt = collect_inlines(events, i, &|e| matches!(e, TagEnd::Image));
            out.push(InlineNode::Image { dest, title, alt });
        }
        _ => {}
    }
}

fn push_text(out: &mut Vec<InlineNode>, s: &str) {
    if let Some(InlineNode::Text(prev)) = out.last_mut() {
        prev.push_str(s);
    } else {
        out.push(InlineNode::Text(s.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Collect all text content until a matching End tag.
fn collect_text_until(
    events: &Events<'_>,
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> String {
    let mut text = String::new();
    while *i < events.len() {
        match &events[*i].0 {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(s) | Event::Html(s) => {
                text.push_str(s);
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    text
}
