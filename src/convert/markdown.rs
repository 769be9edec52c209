//! Markdown rendering of a parsed page

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::convert::config::ConverterConfig;
use crate::convert::text::{
    collapse_whitespace, escape_block_marker, normalize, single_line, split_block_prefix,
    tidy_block,
};
use crate::convert::visitor::{Category, NodeKind, NodeVisitor};
use crate::images::ImageResolver;

/// Converts parsed HTML documents to Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    config: ConverterConfig,
}

impl MarkdownConverter {
    /// Create a converter with custom configuration
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Convert a document, asking `images` for the local path of every image
    ///
    /// Returns an empty string when the page has no convertible content.
    pub fn convert<R: ImageResolver + ?Sized>(&self, document: &Html, images: &mut R) -> String {
        let mut renderer = Renderer {
            config: &self.config,
            images,
        };

        let mut raw = String::new();
        for root in self.content_roots(document) {
            raw.push_str(&renderer.visit(NodeKind::Element(root)));
        }
        normalize(&raw)
    }

    /// Elements whose subtrees make up the page content
    fn content_roots<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let mut roots = Vec::new();
        for selector_str in &self.config.content_selectors {
            match Selector::parse(selector_str) {
                Ok(selector) => roots.extend(document.select(&selector)),
                Err(e) => {
                    warn!("Failed to parse selector '{}': {}", selector_str, e);
                }
            }
        }

        if roots.is_empty() {
            if !self.config.content_selectors.is_empty() {
                debug!("No element matched the content selectors, using <body>");
            }
            roots.extend(body_selector().and_then(|body| document.select(&body).next()));
        }
        if roots.is_empty() {
            roots.push(document.root_element());
        }
        roots
    }
}

fn body_selector() -> Option<Selector> {
    Selector::parse("body").ok()
}

/// Convert an HTML string with no image downloads
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    MarkdownConverter::default().convert(&document, &mut crate::images::KeepRemote)
}

/// Tree walk state for a single conversion
struct Renderer<'c, R: ?Sized> {
    config: &'c ConverterConfig,
    images: &'c mut R,
}

impl<'a, R: ImageResolver + ?Sized> NodeVisitor<'a> for Renderer<'_, R> {
    type Output = String;

    fn config(&self) -> &ConverterConfig {
        self.config
    }

    fn visit_text(&mut self, text: &'a str) -> String {
        escape_block_marker(&collapse_whitespace(text))
    }

    fn visit_element(&mut self, element: ElementRef<'a>, category: Category) -> String {
        match category {
            Category::Heading(level) => {
                let text = single_line(&self.children(element));
                let marker = "#".repeat(usize::from(level));
                format!("\n\n{} {}", marker, text).trim_end().to_string() + "\n\n"
            }
            Category::Paragraph => {
                let text = tidy_block(&self.children(element));
                if text.is_empty() {
                    String::new()
                } else {
                    format!("\n\n{}\n\n", text)
                }
            }
            Category::Emphasis => wrap_inline(&self.children(element), "*"),
            Category::Strong => wrap_inline(&self.children(element), "**"),
            Category::Code => inline_code(&element.text().collect::<String>()),
            Category::Preformatted => fenced_code(&element.text().collect::<String>()),
            Category::Blockquote => {
                let inner = normalize(&self.children(element));
                if inner.is_empty() {
                    return String::new();
                }
                let quoted: Vec<String> = inner
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", line)
                        }
                    })
                    .collect();
                format!("\n\n{}\n\n", quoted.join("\n"))
            }
            Category::List { ordered } => {
                let lines = self.list(element, ordered, "");
                if lines.is_empty() {
                    String::new()
                } else {
                    format!("\n\n{}\n\n", lines.join("\n"))
                }
            }
            Category::ListItem => {
                let text = single_line(&self.children(element));
                if text.is_empty() {
                    String::new()
                } else {
                    format!("\n\n* {}\n\n", text)
                }
            }
            Category::Link => self.link(element),
            Category::Image => self.image(element),
            Category::LineBreak => "\n".to_string(),
            Category::Rule => "\n\n---\n\n".to_string(),
            Category::Cell => self.children(element) + " ",
            Category::Block => format!("\n\n{}\n\n", self.children(element)),
            Category::Inline => self.children(element),
            Category::Opaque => String::new(),
        }
    }
}

impl<R: ImageResolver + ?Sized> Renderer<'_, R> {
    fn children<'a>(&mut self, element: ElementRef<'a>) -> String {
        NodeKind::children_of(element)
            .map(|child| self.visit(child))
            .collect()
    }

    /// Render list items, one line each, with nested lists indented under
    /// their parent item
    fn list<'a>(&mut self, list: ElementRef<'a>, ordered: bool, indent: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut number = list
            .value()
            .attr("start")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);

        for child in list.children().filter_map(ElementRef::wrap) {
            match Category::of(child, self.config) {
                Category::ListItem => {}
                Category::List { ordered: nested } => {
                    let nested_indent = format!("{}  ", indent);
                    lines.extend(self.list(child, nested, &nested_indent));
                    continue;
                }
                _ => continue,
            }

            let mut inline = String::new();
            let mut nested_lists = Vec::new();
            self.item_content(child, &mut inline, &mut nested_lists);

            let text = single_line(&inline);
            if text.is_empty() && nested_lists.is_empty() {
                continue;
            }

            let marker = if ordered {
                format!("{}.", number)
            } else {
                "*".to_string()
            };
            number = number.saturating_add(1);

            lines.push(format!("{}{} {}", indent, marker, text).trim_end().to_string());

            let nested_indent = format!("{}{}", indent, " ".repeat(marker.len() + 1));
            for (nested, nested_ordered) in nested_lists {
                lines.extend(self.list(nested, nested_ordered, &nested_indent));
            }
        }
        lines
    }

    /// Render the inline part of a list item, setting aside sub-lists that
    /// sit directly in it or inside wrapper elements
    fn item_content<'a>(
        &mut self,
        element: ElementRef<'a>,
        inline: &mut String,
        nested: &mut Vec<(ElementRef<'a>, bool)>,
    ) {
        for node in NodeKind::children_of(element) {
            if let NodeKind::Element(el) = node {
                match Category::of(el, self.config) {
                    Category::List { ordered } => {
                        nested.push((el, ordered));
                        continue;
                    }
                    Category::Block | Category::Inline if self.contains_list(el) => {
                        inline.push(' ');
                        self.item_content(el, inline, nested);
                        inline.push(' ');
                        continue;
                    }
                    _ => {}
                }
            }
            inline.push_str(&self.visit(node));
        }
    }

    fn contains_list(&self, element: ElementRef<'_>) -> bool {
        element
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|el| matches!(Category::of(el, self.config), Category::List { .. }))
    }

    fn link(&mut self, element: ElementRef<'_>) -> String {
        let href = element.value().attr("href").unwrap_or_default().trim();
        if href.contains("javascript:") || href.contains("void(0)") {
            return String::new();
        }
        let dest = destination(href);

        let linked_image = element
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| Category::of(*el, self.config) == Category::Image);

        if let Some(img) = linked_image {
            let image = self.image(img);
            if !image.is_empty() {
                return if href.is_empty() {
                    image
                } else {
                    format!("[{}]({})", image, dest)
                };
            }
        }

        let content = self.children(element);
        if href.is_empty() {
            return content;
        }
        if has_blocks(&content) {
            return wrap_blocks(&content, |text| format!("[{}]({})", text, dest));
        }

        let text = single_line(&content);
        if text.is_empty() {
            return String::new();
        }

        // keep surrounding spaces so adjacent words stay separated
        let lead = if content.starts_with(' ') { " " } else { "" };
        let trail = if content.ends_with(' ') { " " } else { "" };
        format!("{}[{}]({}){}", lead, text, dest, trail)
    }

    fn image(&mut self, element: ElementRef<'_>) -> String {
        let value = element.value();
        let src = value
            .attr("src")
            .or_else(|| value.attr("data-src"))
            .unwrap_or_default()
            .trim();
        if src.is_empty() {
            return String::new();
        }

        let alt = single_line(value.attr("alt").unwrap_or_default())
            .replace('[', "\\[")
            .replace(']', "\\]");
        let path = self.images.resolve(src).unwrap_or_else(|| src.to_string());
        format!("![{}]({})", alt, destination(&path))
    }
}

/// Link or image destination, bracketed when it would end `(...)` early
fn destination(url: &str) -> String {
    if url.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>')) {
        let url = url
            .replace('<', "%3C")
            .replace('>', "%3E")
            .replace(['\r', '\n'], "");
        format!("<{}>", url)
    } else {
        url.to_string()
    }
}

/// Whether rendered content holds block output rather than inline text
fn has_blocks(content: &str) -> bool {
    content.contains("\n\n")
}

/// Apply an inline wrapper inside every line of block content, after any
/// heading, quote or list marker. Fenced code and rules are left as is.
fn wrap_blocks(content: &str, wrap: impl Fn(&str) -> String) -> String {
    let body = normalize(content);
    if body.is_empty() {
        return String::new();
    }

    let mut lines = Vec::new();
    let mut fence: Option<String> = None;
    for line in body.lines() {
        if let Some(open) = &fence {
            if line.trim() == open.as_str() {
                fence = None;
            }
            lines.push(line.to_string());
            continue;
        }
        if line.starts_with("```") {
            fence = Some(line.chars().take_while(|c| *c == '`').collect());
            lines.push(line.to_string());
            continue;
        }

        let (prefix, rest) = split_block_prefix(line);
        if rest.trim().is_empty() || line == "---" {
            lines.push(line.to_string());
        } else {
            lines.push(format!("{}{}", prefix, wrap(rest.trim())));
        }
    }
    format!("\n\n{}\n\n", lines.join("\n"))
}

/// Wrap inline content in emphasis markers, keeping outer spaces outside
fn wrap_inline(content: &str, marker: &str) -> String {
    if has_blocks(content) {
        return wrap_blocks(content, |text| format!("{}{}{}", marker, text, marker));
    }

    let inner = content.trim();
    if inner.is_empty() {
        return if content.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }

    let lead = if content.starts_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    let trail = if content.ends_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    format!("{}{}{}{}{}", lead, marker, inner, marker, trail)
}

fn inline_code(raw: &str) -> String {
    let code = collapse_whitespace(raw);
    let code = code.trim();
    if code.is_empty() {
        String::new()
    } else if code.contains('`') {
        format!("`` {} ``", code)
    } else {
        format!("`{}`", code)
    }
}

fn fenced_code(raw: &str) -> String {
    let code = raw.trim_matches('\n').trim_end();
    if code.trim().is_empty() {
        return String::new();
    }

    let longest_run = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    format!("\n\n{}\n{}\n{}\n\n", fence, code, fence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::KeepRemote;
    use std::collections::HashMap;

    struct FixedPaths(HashMap<String, String>);

    impl ImageResolver for FixedPaths {
        fn resolve(&mut self, src: &str) -> Option<String> {
            self.0.get(src).cloned()
        }
    }

    fn convert(html: &str) -> String {
        html_to_markdown(html)
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            convert("<h1>Title</h1><p>Hello <b>world</b></p>"),
            "# Title\n\nHello **world**"
        );
    }

    #[test]
    fn test_heading_levels() {
        let md = convert("<h2>Two</h2><h4>Four</h4><h6>Six</h6>");
        assert_eq!(md, "## Two\n\n#### Four\n\n###### Six");
    }

    #[test]
    fn test_emphasis_spacing() {
        assert_eq!(
            convert("<p>a<em> b </em>c <strong>d</strong></p>"),
            "a *b* c **d**"
        );
        assert_eq!(convert("<p>x<i></i>y</p>"), "xy");
    }

    #[test]
    fn test_unordered_nested_list() {
        let html = "<ul><li>One</li><li>Two<ul><li>Inner</li></ul></li></ul>";
        assert_eq!(convert(html), "* One\n* Two\n  * Inner");
    }

    #[test]
    fn test_ordered_list_numbering_and_nesting() {
        let html = r#"<ol start="3"><li>Three</li><li></li><li>Four<ol><li>Sub</li></ol></li></ol>"#;
        assert_eq!(convert(html), "3. Three\n4. Four\n   1. Sub");
    }

    #[test]
    fn test_heading_inside_link_or_emphasis() {
        assert_eq!(
            convert(r#"<a href="/post"><h2>Card title</h2><p>Summary</p></a>"#),
            "## [Card title](/post)\n\n[Summary](/post)"
        );
        assert_eq!(convert("<b><h2>Bold title</h2></b>"), "## **Bold title**");
        assert_eq!(convert("<em><h3>Quiet</h3></em>"), "### *Quiet*");
    }

    #[test]
    fn test_large_list_start() {
        let html = r#"<ol start="18446744073709551615"><li>a</li><li>b</li></ol>"#;
        assert_eq!(
            convert(html),
            "18446744073709551615. a\n18446744073709551615. b"
        );
    }

    #[test]
    fn test_list_nested_in_wrapper() {
        let html = "<ul><li>Outer<div><ul><li>Inner</li></ul></div></li></ul>";
        assert_eq!(convert(html), "* Outer\n  * Inner");

        let html = "<ol><li>One<span> <ol><li>Deep</li></ol></span></li></ol>";
        assert_eq!(convert(html), "1. One\n   1. Deep");
    }

    #[test]
    fn test_text_markers_escaped() {
        let html = "<h1>T</h1><p># 1 rated show</p><p>1. foo</p><p>* foo</p><p>> not a quote</p>";
        assert_eq!(
            convert(html),
            "# T\n\n\\# 1 rated show\n\n1\\. foo\n\n\\* foo\n\n\\> not a quote"
        );
    }

    #[test]
    fn test_destinations_with_spaces() {
        let html = r#"<p><a href="/a b(1)">x</a> <img src="/my pic.png" alt="p"></p>"#;
        assert_eq!(convert(html), "[x](</a b(1)>) ![p](</my pic.png>)");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert(r#"<p>See <a href="/docs">the docs</a> now</p>"#),
            "See [the docs](/docs) now"
        );
        assert_eq!(
            convert(r#"<p><a href="javascript:void(0)">Click</a>Text</p>"#),
            "Text"
        );
        assert_eq!(convert("<p><a>plain</a></p>"), "plain");
    }

    #[test]
    fn test_linked_image() {
        let html = r#"<a href="https://x.org"><img src="/a.png" alt="A"></a>"#;
        assert_eq!(convert(html), "[![A](/a.png)](https://x.org)");
    }

    #[test]
    fn test_image_fallback_keeps_remote_url() {
        let html = r#"<img src="http://x/a.png" alt="A">"#;
        assert_eq!(convert(html), "![A](http://x/a.png)");
    }

    #[test]
    fn test_image_uses_resolved_path() {
        let document = Html::parse_document(r#"<p><img src="http://x/a.png" alt="A"></p>"#);
        let mut paths = FixedPaths(HashMap::from([(
            "http://x/a.png".to_string(),
            "a.png".to_string(),
        )]));
        let md = MarkdownConverter::default().convert(&document, &mut paths);
        assert_eq!(md, "![A](a.png)");
    }

    #[test]
    fn test_drops_chrome() {
        let html = r#"
            <html><head><title>T</title><style>p{}</style></head>
            <body>
              <header><h1>Site</h1></header>
              <nav><a href="/">Home</a></nav>
              <script>var x = 1;</script>
              <script type="application/ld+json">{"@type":"Article"}</script>
              <main><p>Body text</p></main>
              <div class="social-links">Share</div>
              <footer>Copyright</footer>
            </body></html>"#;
        assert_eq!(convert(html), "Body text");
    }

    #[test]
    fn test_blank_lines_collapse() {
        let html = "<div><p>One</p>\n\n\n<div>\n\n</div><p>Two</p></div>";
        assert_eq!(convert(html), "One\n\nTwo");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("<html><body><nav>only nav</nav></body></html>"), "");
    }

    #[test]
    fn test_code_quote_rule_break() {
        let html = "<p>Run <code>cargo  test</code></p><pre>fn a() {\n    b();\n}</pre>\
                    <blockquote><p>Quoted</p><p>Twice</p></blockquote><hr><p>a<br>b</p>";
        assert_eq!(
            convert(html),
            "Run `cargo test`\n\n```\nfn a() {\n    b();\n}\n```\n\n> Quoted\n>\n> Twice\n\n---\n\na\nb"
        );
    }

    #[test]
    fn test_content_selectors() {
        let config = ConverterConfig::builder()
            .content_selectors(vec!["article".to_string()])
            .build();
        let document =
            Html::parse_document("<body><p>Outside</p><article><p>Inside</p></article></body>");
        let md = MarkdownConverter::new(config).convert(&document, &mut KeepRemote);
        assert_eq!(md, "Inside");
    }

    #[test]
    fn test_boilerplate_text_removed() {
        let html = "<p>Copy linkFacebookEmail</p><p>Story</p>";
        assert_eq!(convert(html), "Story");
    }
}
