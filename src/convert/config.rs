//! # Converter Configuration
//!
//! Controls which parts of a page are treated as content. Elements are
//! dropped when their tag, class or id marks them as page chrome, and
//! conversion can optionally be narrowed to elements matching CSS
//! selectors.

use scraper::node::Element;

/// Configuration for the HTML to Markdown converter
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Tag names dropped together with their subtree
    pub exclude_tags: Vec<String>,

    /// Class names that mark an element as boilerplate
    pub exclude_classes: Vec<String>,

    /// Ids that mark an element as boilerplate
    pub exclude_ids: Vec<String>,

    /// CSS selectors for content to include; empty means the whole body
    pub content_selectors: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            exclude_tags: owned(&[
                "script", "style", "noscript", "template", "nav", "header", "footer", "iframe",
                "svg", "form", "button", "head",
            ]),
            exclude_classes: owned(&[
                "share-button",
                "social-links",
                "player-controls",
                "navigation",
                "menu",
                "sidebar",
                "ads",
                "comments",
            ]),
            exclude_ids: owned(&["nav", "header", "footer", "sidebar", "comments"]),
            content_selectors: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Create a new builder
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::new()
    }

    /// Whether an element and its subtree should be dropped
    pub fn is_excluded(&self, element: &Element) -> bool {
        if self.exclude_tags.iter().any(|t| t == element.name()) {
            return true;
        }

        if element
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("application/ld+json"))
        {
            return true;
        }

        if element
            .classes()
            .any(|class| self.exclude_classes.iter().any(|c| c == class))
        {
            return true;
        }

        element
            .id()
            .is_some_and(|id| self.exclude_ids.iter().any(|i| i == id))
    }
}

/// Builder for ConverterConfig
#[derive(Debug, Default)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ConverterConfig::default(),
        }
    }

    /// Set the tag names to exclude
    pub fn exclude_tags(mut self, exclude_tags: Vec<String>) -> Self {
        self.config.exclude_tags = exclude_tags;
        self
    }

    /// Set the class names to exclude
    pub fn exclude_classes(mut self, exclude_classes: Vec<String>) -> Self {
        self.config.exclude_classes = exclude_classes;
        self
    }

    /// Set the ids to exclude
    pub fn exclude_ids(mut self, exclude_ids: Vec<String>) -> Self {
        self.config.exclude_ids = exclude_ids;
        self
    }

    /// Set the CSS selectors for content to include
    pub fn content_selectors(mut self, content_selectors: Vec<String>) -> Self {
        self.config.content_selectors = content_selectors;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConverterConfig {
        self.config
    }
}
