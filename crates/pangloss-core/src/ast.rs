// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pandoc document AST as exchanged over JSON
//!
//! Mirrors pandoc's API 1.23 exchange format closely enough to round-trip any
//! document. Every node is adjacently tagged as `{"t": ..., "c": ...}`.
//! Tables are carried opaquely: their contents survive the round trip but are
//! never visited by a [`Rewriter`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier, classes and key/value attributes
pub type Attr = (String, Vec<String>, Vec<(String, String)>);

/// Link or image target: URL and title
pub type Target = (String, String);

/// Optional short caption and caption body
pub type Caption = (Option<Vec<Inline>>, Vec<Block>);

/// Start number, numbering style and delimiter of an ordered list
pub type ListAttributes = (i64, ListNumberStyle, ListNumberDelim);

/// The root document node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pandoc {
    #[serde(rename = "pandoc-api-version")]
    pub api_version: Vec<u32>,
    pub meta: BTreeMap<String, MetaValue>,
    pub blocks: Vec<Block>,
}

impl Pandoc {
    /// Create a document with the given blocks and no metadata
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            api_version: vec![1, 23, 1],
            meta: BTreeMap::new(),
            blocks,
        }
    }

    /// Run a rewriter over every block and inline of the document body
    pub fn walk<R: Rewriter + ?Sized>(&mut self, rewriter: &mut R) {
        walk_blocks(&mut self.blocks, rewriter);
    }
}

/// Metadata value (recursive for nested structures)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum MetaValue {
    #[serde(rename = "MetaMap")]
    Map(BTreeMap<String, MetaValue>),
    #[serde(rename = "MetaList")]
    List(Vec<MetaValue>),
    #[serde(rename = "MetaBool")]
    Bool(bool),
    #[serde(rename = "MetaString")]
    String(String),
    #[serde(rename = "MetaInlines")]
    Inlines(Vec<Inline>),
    #[serde(rename = "MetaBlocks")]
    Blocks(Vec<Block>),
}

/// Block-level elements (structural)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Block {
    /// Text without paragraph semantics (tight list items)
    Plain(Vec<Inline>),

    /// Paragraph
    Para(Vec<Inline>),

    /// Lines with preserved breaks
    LineBlock(Vec<Vec<Inline>>),

    CodeBlock(Attr, String),

    /// Raw markup for a named output format
    RawBlock(String, String),

    BlockQuote(Vec<Block>),

    /// Ordered list; each item is a list of blocks
    OrderedList(ListAttributes, Vec<Vec<Block>>),

    BulletList(Vec<Vec<Block>>),

    /// Terms paired with one or more definitions
    DefinitionList(Vec<(Vec<Inline>, Vec<Vec<Block>>)>),

    /// Heading with level, attributes and text
    Header(i64, Attr, Vec<Inline>),

    HorizontalRule,

    /// Table contents are kept verbatim
    Table(serde_json::Value),

    Figure(Attr, Caption, Vec<Block>),

    /// Generic container with attributes
    Div(Attr, Vec<Block>),
}

impl Block {
    /// Inline content of a paragraph-like block
    pub fn paragraph_inlines(&self) -> Option<&[Inline]> {
        match self {
            Block::Plain(inlines) | Block::Para(inlines) => Some(inlines),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum ListNumberStyle {
    DefaultStyle,
    /// Pandoc's `(@)` example lists
    Example,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum ListNumberDelim {
    DefaultDelim,
    Period,
    OneParen,
    TwoParens,
}

/// Inline elements (character-level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Inline {
    /// Plain text
    Str(String),
    Emph(Vec<Inline>),
    Underline(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    SmallCaps(Vec<Inline>),
    Quoted(QuoteType, Vec<Inline>),

    /// Citation group and its rendered text
    Cite(Vec<Citation>, Vec<Inline>),

    Code(Attr, String),
    Space,

    /// Source line break that renders as a space
    SoftBreak,

    LineBreak,
    Math(MathType, String),

    /// Raw markup for a named output format
    RawInline(String, String),

    Link(Attr, Vec<Inline>, Target),
    Image(Attr, Vec<Inline>, Target),

    /// Footnote
    Note(Vec<Block>),

    Span(Attr, Vec<Inline>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum QuoteType {
    SingleQuote,
    DoubleQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum MathType {
    DisplayMath,
    InlineMath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum CitationMode {
    AuthorInText,
    SuppressAuthor,
    NormalCitation,
}

/// One key inside a citation group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub citation_id: String,
    pub citation_prefix: Vec<Inline>,
    pub citation_suffix: Vec<Inline>,
    pub citation_mode: CitationMode,
    pub citation_note_num: i64,
    pub citation_hash: i64,
}

impl Citation {
    /// A bare `@key` citation
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            citation_id: id.into(),
            citation_prefix: Vec::new(),
            citation_suffix: Vec::new(),
            citation_mode: CitationMode::NormalCitation,
            citation_note_num: 0,
            citation_hash: 0,
        }
    }
}

/// Top-down node replacement.
///
/// A returned replacement is spliced in place of the node and the old node's
/// children are not visited. Returning `None` descends into the children.
pub trait Rewriter {
    fn rewrite_block(&mut self, _block: &Block) -> Option<Block> {
        None
    }

    fn rewrite_inline(&mut self, _inline: &Inline) -> Option<Inline> {
        None
    }
}

pub fn walk_blocks<R: Rewriter + ?Sized>(blocks: &mut [Block], rewriter: &mut R) {
    for block in blocks.iter_mut() {
        if let Some(replacement) = rewriter.rewrite_block(block) {
            *block = replacement;
            continue;
        }

        match block {
            Block::Plain(inlines) | Block::Para(inlines) | Block::Header(_, _, inlines) => {
                walk_inlines(inlines, rewriter)
            }
            Block::LineBlock(lines) => {
                for line in lines {
                    walk_inlines(line, rewriter);
                }
            }
            Block::BlockQuote(children) | Block::Div(_, children) => {
                walk_blocks(children, rewriter)
            }
            Block::OrderedList(_, items) | Block::BulletList(items) => {
                for item in items {
                    walk_blocks(item, rewriter);
                }
            }
            Block::DefinitionList(entries) => {
                for (term, definitions) in entries {
                    walk_inlines(term, rewriter);
                    for definition in definitions {
                        walk_blocks(definition, rewriter);
                    }
                }
            }
            Block::Figure(_, (short, caption), children) => {
                if let Some(short) = short {
                    walk_inlines(short, rewriter);
                }
                walk_blocks(caption, rewriter);
                walk_blocks(children, rewriter);
            }
            Block::CodeBlock(..) | Block::RawBlock(..) | Block::HorizontalRule | Block::Table(_) => {}
        }
    }
}

pub fn walk_inlines<R: Rewriter + ?Sized>(inlines: &mut [Inline], rewriter: &mut R) {
    for inline in inlines.iter_mut() {
        if let Some(replacement) = rewriter.rewrite_inline(inline) {
            *inline = replacement;
            continue;
        }

        match inline {
            Inline::Emph(children)
            | Inline::Underline(children)
            | Inline::Strong(children)
            | Inline::Strikeout(children)
            | Inline::Superscript(children)
            | Inline::Subscript(children)
            | Inline::SmallCaps(children)
            | Inline::Quoted(_, children)
            | Inline::Cite(_, children)
            | Inline::Link(_, children, _)
            | Inline::Image(_, children, _)
            | Inline::Span(_, children) => walk_inlines(children, rewriter),
            Inline::Note(blocks) => walk_blocks(blocks, rewriter),
            Inline::Str(_)
            | Inline::Code(..)
            | Inline::Space
            | Inline::SoftBreak
            | Inline::LineBreak
            | Inline::Math(..)
            | Inline::RawInline(..) => {}
        }
    }
}

/// Receives the text of inline content in document order
pub trait TextSink {
    fn text(&mut self, text: &str);

    /// Raw markup tagged with a format name
    fn raw(&mut self, format: &str, markup: &str);
}

impl TextSink for String {
    fn text(&mut self, text: &str) {
        self.push_str(text);
    }

    fn raw(&mut self, _format: &str, markup: &str) {
        self.push_str(markup);
    }
}

/// Plain-text rendering of inline content.
///
/// Spaces and breaks become a single space and raw markup is kept verbatim;
/// footnotes are dropped.
pub fn stringify(inlines: &[Inline]) -> String {
    let mut output = String::new();
    write_text(&mut output, inlines);
    output
}

/// Plain-text rendering of the paragraph-like blocks in `blocks`
pub fn stringify_blocks(blocks: &[Block]) -> String {
    let mut parts = Vec::new();
    for block in blocks {
        match block {
            Block::Plain(inlines) | Block::Para(inlines) | Block::Header(_, _, inlines) => {
                parts.push(stringify(inlines))
            }
            Block::LineBlock(lines) => parts.extend(lines.iter().map(|l| stringify(l))),
            Block::CodeBlock(_, text) => parts.push(text.clone()),
            Block::BlockQuote(children) | Block::Div(_, children) => {
                parts.push(stringify_blocks(children))
            }
            _ => {}
        }
    }
    parts.join("\n\n")
}

/// Feed the text of inline content to a sink
pub fn write_text<S: TextSink + ?Sized>(sink: &mut S, inlines: &[Inline]) {
    for inline in inlines {
        write_inline(sink, inline);
    }
}

fn write_inline<S: TextSink + ?Sized>(sink: &mut S, inline: &Inline) {
    match inline {
        Inline::Str(text) => sink.text(text),
        Inline::Space | Inline::SoftBreak | Inline::LineBreak => sink.text(" "),
        Inline::Code(_, text) | Inline::Math(_, text) => sink.text(text),
        Inline::Quoted(QuoteType::SingleQuote, children) => {
            sink.text("\u{2018}");
            write_text(sink, children);
            sink.text("\u{2019}");
        }
        Inline::Quoted(QuoteType::DoubleQuote, children) => {
            sink.text("\u{201C}");
            write_text(sink, children);
            sink.text("\u{201D}");
        }
        Inline::Emph(children)
        | Inline::Underline(children)
        | Inline::Strong(children)
        | Inline::Strikeout(children)
        | Inline::Superscript(children)
        | Inline::Subscript(children)
        | Inline::SmallCaps(children)
        | Inline::Cite(_, children)
        | Inline::Link(_, children, _)
        | Inline::Image(_, children, _)
        | Inline::Span(_, children) => write_text(sink, children),
        Inline::RawInline(format, markup) => sink.raw(format, markup),
        Inline::Note(_) => {}
    }
}
