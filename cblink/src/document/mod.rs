pub mod visit;

use std::fmt;

/// A Document is a sequence of block nodes parsed from Markdown source.
/// Annotation rewrites its inline text in place; rendering goes back to Markdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<DocumentNode>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All reference definitions in the document, first occurrence of each
    /// identifier only, in document order.
    pub fn definitions(&self) -> Vec<&Definition> {
        let mut found = Vec::new();
        collect_document_definitions(self, &mut found);
        let mut unique: Vec<&Definition> = Vec::with_capacity(found.len());
        for def in found {
            if !unique.iter().any(|d| d.identifier == def.identifier) {
                unique.push(def);
            }
        }
        unique
    }
}

/// A single block-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    // Block-level
    Paragraph(Vec<InlineNode>),
    Heading {
        level: u8,
        content: Vec<InlineNode>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    /// Raw HTML block, rendered verbatim.
    Html(String),
    Blockquote(Document),
    Table {
        alignments: Vec<ColumnAlignment>,
        headers: Vec<Vec<InlineNode>>,
        rows: Vec<Vec<Vec<InlineNode>>>,
    },
    /// `tight` lists keep their items' blocks together without blank lines.
    OrderedList {
        start: u64,
        tight: bool,
        items: Vec<Document>,
    },
    UnorderedList {
        tight: bool,
        items: Vec<Document>,
    },

    // Separator
    HorizontalRule,
}

/// Inline elements that appear within a line of text.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    Text(String),
    Strong(Vec<InlineNode>),
    Emphasis(Vec<InlineNode>),
    Strikethrough(Vec<InlineNode>),
    CodeSpan(String),
    /// Inline HTML, rendered verbatim and never annotated.
    Html(String),
    Link {
        dest: String,
        title: String,
        content: Vec<InlineNode>,
    },
    Image {
        dest: String,
        title: String,
        alt: Vec<InlineNode>,
    },
    /// A reference-style link: the visible `[label]` text plus the
    /// definition that resolves it, emitted after the document body.
    Reference {
        label: String,
        definition: Definition,
    },
    SoftBreak,
    HardBreak,
}

impl InlineNode {
    pub fn text(value: impl Into<String>) -> Self {
        InlineNode::Text(value.into())
    }
}

/// An out-of-band link reference definition (`[label]: url`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub identifier: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnAlignment {
    None,
    Left,
    Center,
    Right,
}

fn collect_document_definitions<'a>(doc: &'a Document, out: &mut Vec<&'a Definition>) {
    for node in &doc.nodes {
        match node {
            DocumentNode::Paragraph(inlines) | DocumentNode::Heading { content: inlines, .. } => {
                collect_inline_definitions(inlines, out);
            }
            DocumentNode::Blockquote(inner) => collect_document_definitions(inner, out),
            DocumentNode::Table { headers, rows, .. } => {
                for cell in headers.iter().chain(rows.iter().flatten()) {
                    collect_inline_definitions(cell, out);
                }
            }
            DocumentNode::OrderedList { items, .. } | DocumentNode::UnorderedList { items, .. } => {
                for item in items {
                    collect_document_definitions(item, out);
                }
            }
            DocumentNode::CodeBlock { .. }
            | DocumentNode::Html(_)
            | DocumentNode::HorizontalRule => {}
        }
    }
}

fn collect_inline_definitions<'a>(inlines: &'a [InlineNode], out: &mut Vec<&'a Definition>) {
    for inline in inlines {
        match inline {
            InlineNode::Reference { definition, .. } => out.push(definition),
            InlineNode::Strong(children)
            | InlineNode::Emphasis(children)
            | InlineNode::Strikethrough(children) => collect_inline_definitions(children, out),
            InlineNode::Link { content, .. } => collect_inline_definitions(content, out),
            _ => {}
        }
    }
}

/// Renders block nodes only, without the trailing definitions section.
/// Nested documents (blockquotes, list items) are rendered through this.
/// Blocks are separated by a blank line unless `tight`.
struct Body<'a> {
    doc: &'a Document,
    tight: bool,
}

impl<'a> Body<'a> {
    fn loose(doc: &'a Document) -> Self {
        Body { doc, tight: false }
    }
}

impl fmt::Display for Body<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.doc.nodes.iter().enumerate() {
            if i > 0 && !self.tight {
                writeln!(f)?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// Write one list item: the marker on the first line, continuation lines
/// indented to the marker's width.
fn write_item(
    f: &mut fmt::Formatter<'_>,
    marker: &str,
    item: &Document,
    tight: bool,
) -> fmt::Result {
    let text = Body { doc: item, tight }.to_string();
    let mut lines = text.lines();
    match lines.next() {
        Some(first) => writeln!(f, "{}{}", marker, first)?,
        None => writeln!(f, "{}", marker.trim_end())?,
    }
    let indent = " ".repeat(marker.len());
    for line in lines {
        if line.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, "{}{}", indent, line)?;
        }
    }
    Ok(())
}

/// Write text with Markdown metacharacters escaped so it reads back as text.
fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for (i, c) in text.char_indices() {
        match c {
            '\\' | '*' | '_' | '`' | '~' => write!(f, "\\{}", c)?,
            '[' if !has_closing_bracket(&text[i + 1..]) => write!(f, "\\[")?,
            _ => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

/// Whether `rest` closes a `[` that was just opened.
fn has_closing_bracket(rest: &str) -> bool {
    let mut depth = 0usize;
    for c in rest.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth == 0 => return true,
            ']' => depth -= 1,
            _ => {}
        }
    }
    false
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Body::loose(self))?;
        let definitions = self.definitions();
        if !definitions.is_empty() {
            if !self.is_empty() {
                writeln!(f)?;
            }
            for def in definitions {
                writeln!(f, "{}", def)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.label, self.url)
    }
}

fn write_inlines(f: &mut fmt::Formatter<'_>, inlines: &[InlineNode]) -> fmt::Result {
    for inline in inlines {
        write!(f, "{}", inline)?;
    }
    Ok(())
}

impl fmt::Display for DocumentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentNode::Paragraph(inlines) => {
                write_inlines(f, inlines)?;
                writeln!(f)
            }
            DocumentNode::Heading { level, content } => {
                for _ in 0..*level {
                    write!(f, "#")?;
                }
                write!(f, " ")?;
                write_inlines(f, content)?;
                writeln!(f)
            }
            DocumentNode::CodeBlock { language, content } => {
                write!(f, "```")?;
                if let Some(lang) = language {
                    write!(f, "{}", lang)?;
                }
                writeln!(f)?;
                write!(f, "{}", content)?;
                writeln!(f, "```")
            }
            DocumentNode::Html(content) => write!(f, "{}", content),
            DocumentNode::Blockquote(doc) => {
                let text = Body::loose(doc).to_string();
                for line in text.lines() {
                    if line.is_empty() {
                        writeln!(f, ">")?;
                    } else {
                        writeln!(f, "> {}", line)?;
                    }
                }
                Ok(())
            }
            DocumentNode::Table {
                alignments,
                headers,
                rows,
            } => {
                write!(f, "|")?;
                for header in headers {
                    write!(f, " ")?;
                    write_inlines(f, header)?;
                    write!(f, " |")?;
                }
                writeln!(f)?;
                write!(f, "|")?;
                for (i, _) in headers.iter().enumerate() {
                    let rule = match alignments.get(i) {
                        Some(ColumnAlignment::Left) => ":---",
                        Some(ColumnAlignment::Center) => ":---:",
                        Some(ColumnAlignment::Right) => "---:",
                        _ => "---",
                    };
                    write!(f, "{}|", rule)?;
                }
                writeln!(f)?;
                for row in rows {
                    write!(f, "|")?;
                    for cell in row {
                        write!(f, " ")?;
                        write_inlines(f, cell)?;
                        write!(f, " |")?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            DocumentNode::OrderedList {
                start,
                tight,
                items,
            } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 && !tight {
                        writeln!(f)?;
                    }
                    let marker = format!("{}. ", *start as usize + i);
                    write_item(f, &marker, item, *tight)?;
                }
                Ok(())
            }
            DocumentNode::UnorderedList { tight, items } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 && !tight {
                        writeln!(f)?;
                    }
                    write_item(f, "- ", item, *tight)?;
                }
                Ok(())
            }
            DocumentNode::HorizontalRule => writeln!(f, "---"),
        }
    }
}

impl fmt::Display for InlineNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InlineNode::Text(s) => write_escaped(f, s),
            InlineNode::Strong(children) => {
                write!(f, "**")?;
                write_inlines(f, children)?;
                write!(f, "**")
            }
            InlineNode::Emphasis(children) => {
                write!(f, "*")?;
                write_inlines(f, children)?;
                write!(f, "*")
            }
            InlineNode::Strikethrough(children) => {
                write!(f, "~~")?;
                write_inlines(f, children)?;
                write!(f, "~~")
            }
            InlineNode::CodeSpan(code) => write!(f, "`{}`", code),
            InlineNode::Html(html) => write!(f, "{}", html),
            InlineNode::Link {
                dest,
                title,
                content,
            } => {
                write!(f, "[")?;
                write_inlines(f, content)?;
                if title.is_empty() {
                    write!(f, "]({})", dest)
                } else {
                    write!(f, "]({} \"{}\")", dest, title)
                }
            }
            InlineNode::Image { dest, alt, .. } => {
                write!(f, "![")?;
                write_inlines(f, alt)?;
                write!(f, "]({})", dest)
            }
            InlineNode::Reference { label, .. } => write!(f, "{}", label),
            InlineNode::SoftBreak => writeln!(f),
            InlineNode::HardBreak => writeln!(f, "\\"),
        }
    }
}
