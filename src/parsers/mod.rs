pub mod components;
pub mod enhanced;
pub mod layout;
pub mod text;

#[cfg(test)]
mod tests;

use crate::results::ScrapeResult;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use components::{ComponentRule, Pick, RULES};
pub use enhanced::{EnhancedParseResult, parse_enhanced};
pub use layout::Layout;
pub use text::PlaceholderNamer;

/// Structural role of an extracted component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Header,
    Nav,
    Hero,
    Section,
    Card,
    Footer,
    Other,
}

/// A piece of text found inside a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    /// Structural path from the component root (`section > div:nth-child(2) > p:nth-child(1)`)
    pub path: String,
    /// Key unique within one parse
    pub placeholder: String,
}

/// A classified DOM subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub kind: ComponentKind,
    pub html: String,
    /// `#id`, else `.firstClass`, else the tag name
    pub selector: String,
    pub text_nodes: Vec<TextNode>,
    pub classes: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Result of structural parsing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub components: Vec<Component>,
    /// Placeholder key to original text
    pub text_map: BTreeMap<String, String>,
    pub layout: Layout,
}

impl ParseResult {
    /// Components of one kind, in extraction order
    pub fn components_of(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.kind == kind)
    }
}

/// Structural parser over rendered pages
pub struct Parser;

impl Parser {
    /// Parse a scraped page
    pub fn parse(scrape: &ScrapeResult) -> ParseResult {
        Self::parse_html(&scrape.html)
    }

    /// Parse raw HTML into components, a placeholder map and layout facts
    pub fn parse_html(html: &str) -> ParseResult {
        let doc = Html::parse_document(html);
        let mut namer = PlaceholderNamer::default();

        let elements = components::extract(&doc);
        let mut result = ParseResult {
            components: Vec::with_capacity(elements.len()),
            text_map: BTreeMap::new(),
            layout: layout::analyze(&doc),
        };

        for (kind, element) in elements {
            let text_nodes = text::extract_text_nodes(element, &mut namer);
            for node in &text_nodes {
                result
                    .text_map
                    .insert(node.placeholder.clone(), node.text.clone());
            }
            result.components.push(Component {
                kind,
                html: element.html(),
                selector: components::selector_for(element),
                text_nodes,
                classes: element.value().classes().map(str::to_string).collect(),
                id: element.value().id().map(str::to_string),
            });
        }

        ::log::debug!(
            "Parser found {} components and {} text nodes",
            result.components.len(),
            result.text_map.len()
        );

        result
    }
}
