//! # HTML to Markdown Conversion
//!
//! Walks a parsed page and renders its content as Markdown.
//!
//! ## Key Components
//!
//! - `MarkdownConverter`: renders a document, delegating image paths to an
//!   [`ImageResolver`](crate::images::ImageResolver)
//! - `ConverterConfig`: which tags, classes and ids count as page chrome
//! - `NodeVisitor`: the visitor the converter is built on
//!
//! Headings, paragraphs, emphasis, lists, links, images, code, quotes and
//! rules are mapped to their Markdown form. Scripts, styles, navigation,
//! headers and footers are dropped. Links are rendered, never followed.

mod config;
mod markdown;
pub mod text;
mod visitor;

pub use config::{ConverterConfig, ConverterConfigBuilder};
pub use markdown::{MarkdownConverter, html_to_markdown};
pub use visitor::{Category, NodeKind, NodeVisitor};
