//! Tree walking over parsed HTML
//!
//! Nodes are reduced to a closed set of kinds and elements are sorted into
//! categories by tag name, so a visitor only has to handle a fixed set of
//! cases.

use crate::convert::config::ConverterConfig;
use scraper::{ElementRef, Node};

/// The kinds of node a visitor sees
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    /// An element with its subtree
    Element(ElementRef<'a>),
    /// A run of character data
    Text(&'a str),
    /// A comment
    Comment(&'a str),
    /// Doctypes, processing instructions and document roots
    Other,
}

impl<'a> NodeKind<'a> {
    /// Child nodes of an element, in document order
    pub fn children_of(element: ElementRef<'a>) -> impl Iterator<Item = NodeKind<'a>> + 'a {
        element.children().map(|child| match child.value() {
            Node::Element(_) => ElementRef::wrap(child)
                .map(NodeKind::Element)
                .unwrap_or(NodeKind::Other),
            Node::Text(text) => NodeKind::Text(&**text),
            Node::Comment(comment) => NodeKind::Comment(&**comment),
            _ => NodeKind::Other,
        })
    }
}

/// Markdown role of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `h1`..`h6`, carrying the level
    Heading(u8),
    /// `p`
    Paragraph,
    /// `em`, `i`
    Emphasis,
    /// `strong`, `b`
    Strong,
    /// Inline code
    Code,
    /// `pre`
    Preformatted,
    /// `blockquote`
    Blockquote,
    /// `ul` or `ol`
    List {
        /// Whether items are numbered
        ordered: bool,
    },
    /// `li`
    ListItem,
    /// `a`
    Link,
    /// `img`
    Image,
    /// `br`
    LineBreak,
    /// `hr`
    Rule,
    /// Table cells, separated by a space
    Cell,
    /// Block-level containers that start a new paragraph
    Block,
    /// Anything else; only its children matter
    Inline,
    /// Dropped together with its subtree
    Opaque,
}

impl Category {
    /// Categorize an element, honoring the exclusion rules of `config`
    pub fn of(element: ElementRef<'_>, config: &ConverterConfig) -> Self {
        let value = element.value();
        if config.is_excluded(value) {
            return Category::Opaque;
        }

        match value.name() {
            "h1" => Category::Heading(1),
            "h2" => Category::Heading(2),
            "h3" => Category::Heading(3),
            "h4" => Category::Heading(4),
            "h5" => Category::Heading(5),
            "h6" => Category::Heading(6),
            "p" => Category::Paragraph,
            "em" | "i" => Category::Emphasis,
            "strong" | "b" => Category::Strong,
            "code" | "kbd" | "samp" | "tt" => Category::Code,
            "pre" => Category::Preformatted,
            "blockquote" => Category::Blockquote,
            "ul" => Category::List { ordered: false },
            "ol" => Category::List { ordered: true },
            "li" => Category::ListItem,
            "a" => Category::Link,
            "img" => Category::Image,
            "br" => Category::LineBreak,
            "hr" => Category::Rule,
            "td" | "th" => Category::Cell,
            "html" | "body" | "main" | "article" | "section" | "div" | "figure"
            | "figcaption" | "table" | "tr" | "dl" | "dt" | "dd" | "address" | "details"
            | "summary" => Category::Block,
            "title" | "meta" | "link" | "base" | "object" | "embed" | "canvas" | "video"
            | "audio" | "select" | "input" | "textarea" => Category::Opaque,
            _ => Category::Inline,
        }
    }
}

/// A visitor over the node kinds of a parsed document
pub trait NodeVisitor<'a> {
    /// What visiting a node produces
    type Output: Default;

    /// Rules used to categorize elements
    fn config(&self) -> &ConverterConfig;

    /// Visit character data
    fn visit_text(&mut self, text: &'a str) -> Self::Output;

    /// Visit an element of a known category
    fn visit_element(&mut self, element: ElementRef<'a>, category: Category) -> Self::Output;

    /// Visit a comment; ignored unless overridden
    fn visit_comment(&mut self, _comment: &'a str) -> Self::Output {
        Self::Output::default()
    }

    /// Dispatch a node to the matching `visit_*` method
    fn visit(&mut self, node: NodeKind<'a>) -> Self::Output {
        match node {
            NodeKind::Element(element) => {
                let category = Category::of(element, self.config());
                self.visit_element(element, category)
            }
            NodeKind::Text(text) => self.visit_text(text),
            NodeKind::Comment(comment) => self.visit_comment(comment),
            NodeKind::Other => Self::Output::default(),
        }
    }
}
